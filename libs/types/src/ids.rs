//! Identifier types for ledger entities
//!
//! Account and token identities use UUID v7 so freshly minted ids sort by
//! creation time. The nil UUID is reserved as the "null identity": it never
//! belongs to a real account or token and is rejected wherever an identity
//! argument is validated.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of an account (campaign creator, contributor, or custody holder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// The null identity.
    pub const ZERO: AccountId = AccountId(Uuid::nil());

    /// Create a new AccountId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// True for the null identity.
    pub fn is_zero(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a fungible token
///
/// Plays the role of a token contract address: the multi-token ledger keys
/// its allow-list and per-token bookkeeping by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Uuid);

impl TokenId {
    pub const ZERO: TokenId = TokenId(Uuid::nil());

    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential campaign identifier
///
/// Real campaigns are numbered from 1; slot 0 is the permanent sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(u64);

impl CampaignId {
    /// The "does not exist" slot.
    pub const SENTINEL: CampaignId = CampaignId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == 0
    }

    /// Slot index in the registry's campaign table.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u64> for CampaignId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
