//! Crowdfund Simulation Harness
//!
//! Seeded, reproducible load for the crowdfunding ledger. Bots open
//! campaigns, pledge, cancel, withdraw and claim refunds while the harness
//! checks the ledger's bookkeeping after every step.
//!
//! # Modules
//! - `config`: JSON-loadable run parameters
//! - `bots`: Creator and contributor bots
//! - `engine`: Step scheduler and invariant checks
//! - `metrics`: Operation and error counters
//! - `export`: JSON report
//! - `errors`: Config, setup and invariant errors

pub mod bots;
pub mod config;
pub mod engine;
pub mod errors;
pub mod export;
pub mod metrics;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
