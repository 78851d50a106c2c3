//! Types library for the crowdfunding ledger
//!
//! Shared type definitions used by the ledger contracts and the simulation
//! tooling, so that every component agrees on identities, amounts and the
//! error taxonomy.
//!
//! # Modules
//! - `ids`: Identities (AccountId, TokenId, CampaignId)
//! - `numeric`: Integer amount and time aliases
//! - `campaign`: Campaign record, read view and lifecycle state
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod campaign;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::campaign::*;
    pub use crate::errors::*;
}
