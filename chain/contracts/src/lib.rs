//! Crowdfunding ledger contracts
//!
//! Campaign creators register a goal and a deadline; contributors pledge
//! fungible tokens; after the deadline the creator withdraws everything if
//! the goal was met, otherwise each contributor reclaims their pledge.
//!
//! # Modules
//! - `registry`: Campaign storage with sequential ids and a sentinel slot
//! - `ledger`: Per-(campaign, contributor) pledges with per-token breakdown
//! - `settlement`: State-transition rules, transfer plans and rollback
//! - `crowdfund`: Public operation surface shared by both variants
//! - `single`: Single-token variant
//! - `multi`: Multi-token allow-list variant
//! - `gateway`: Token transfer seam and in-memory token
//! - `clock`: Time source seam
//! - `security`: Reentrancy guard
//! - `events`: Ledger events
//! - `config`: Ledger configuration

pub mod clock;
pub mod config;
pub mod crowdfund;
pub mod events;
pub mod gateway;
pub mod ledger;
pub mod multi;
pub mod registry;
pub mod security;
pub mod settlement;
pub mod single;

pub use types::errors::{CrowdfundError, GatewayError};

/// Ledger ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
