//! Integer quantities used by the ledger
//!
//! Token amounts are whole base units of a fungible token, never fractional.
//! Timestamps and durations are whole seconds read from the external clock.

/// Amount of token base units.
pub type Amount = u128;

/// Absolute time in seconds.
pub type Timestamp = u64;

/// Length of a time span in seconds.
pub type Duration = u64;

/// Sum amounts, returning `None` on overflow.
pub fn checked_sum<I>(amounts: I) -> Option<Amount>
where
    I: IntoIterator<Item = Amount>,
{
    amounts
        .into_iter()
        .try_fold(0 as Amount, |acc, amount| acc.checked_add(amount))
}
