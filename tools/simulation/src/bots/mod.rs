//! Seeded actors driving the ledger
//!
//! - `creator` opens campaigns and collects successful ones
//! - `contributor` pledges, cancels and claims refunds

pub mod contributor;
pub mod creator;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use types::ids::{AccountId, TokenId};
use uuid::Uuid;

/// Draw a non-null account identity from `rng`.
pub fn derive_account(rng: &mut ChaCha8Rng) -> AccountId {
    AccountId::from_uuid(Uuid::from_u128(rng.gen::<u128>() | 1))
}

/// Draw a non-null token identity from `rng`.
pub fn derive_token(rng: &mut ChaCha8Rng) -> TokenId {
    TokenId::from_uuid(Uuid::from_u128(rng.gen::<u128>() | 1))
}
