//! Simulation metrics
//!
//! Counts attempts, successes and moved volume per operation, and failures
//! by error kind. Maps are ordered so serialized reports are reproducible.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::errors::CrowdfundError;
use types::numeric::{Amount, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    CreateCampaign,
    Contribute,
    CancelContribution,
    WithdrawFunds,
    Refund,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCampaign => "create_campaign",
            Self::Contribute => "contribute",
            Self::CancelContribution => "cancel_contribution",
            Self::WithdrawFunds => "withdraw_funds",
            Self::Refund => "refund",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpCounters {
    pub attempted: u64,
    pub succeeded: u64,
    /// Token amount moved by successful calls
    pub volume: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimMetrics {
    pub steps: u64,
    /// Seconds the manual clock moved forward
    pub clock_advanced: Duration,
    pub operations: BTreeMap<String, OpCounters>,
    /// Failures keyed by error kind
    pub errors: BTreeMap<String, u64>,
}

impl SimMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one ledger call and the amount it moved on success.
    pub fn record(&mut self, op: Operation, result: &Result<Amount, CrowdfundError>) {
        let counters = self.operations.entry(op.as_str().to_string()).or_default();
        counters.attempted += 1;
        match result {
            Ok(amount) => {
                counters.succeeded += 1;
                counters.volume = counters.volume.saturating_add(*amount);
            }
            Err(err) => {
                *self.errors.entry(err.kind().to_string()).or_default() += 1;
            }
        }
    }

    pub fn record_clock(&mut self, seconds: Duration) {
        self.clock_advanced = self.clock_advanced.saturating_add(seconds);
    }

    pub fn counters(&self, op: Operation) -> OpCounters {
        self.operations.get(op.as_str()).cloned().unwrap_or_default()
    }

    pub fn total_errors(&self) -> u64 {
        self.errors.values().sum()
    }

    pub fn errors_of(&self, kind: &str) -> u64 {
        self.errors.get(kind).copied().unwrap_or(0)
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        let contribute = self.counters(Operation::Contribute);
        let withdraw = self.counters(Operation::WithdrawFunds);
        let refund = self.counters(Operation::Refund);
        format!(
            "Steps: {} | Contributions: {}/{} ({}) | Withdrawals: {} ({}) | Refunds: {} ({}) | Errors: {}",
            self.steps,
            contribute.succeeded,
            contribute.attempted,
            contribute.volume,
            withdraw.succeeded,
            withdraw.volume,
            refund.succeeded,
            refund.volume,
            self.total_errors(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::errors::GatewayError;
    use types::ids::AccountId;

    #[test]
    fn test_record_success_and_failure() {
        let mut metrics = SimMetrics::new();
        metrics.record(Operation::Contribute, &Ok(40));
        metrics.record(Operation::Contribute, &Ok(2));
        metrics.record(Operation::Contribute, &Err(CrowdfundError::ZeroContribution));

        let counters = metrics.counters(Operation::Contribute);
        assert_eq!(counters.attempted, 3);
        assert_eq!(counters.succeeded, 2);
        assert_eq!(counters.volume, 42);
        assert_eq!(metrics.errors_of("ZeroContribution"), 1);
        assert_eq!(metrics.total_errors(), 1);
    }

    #[test]
    fn test_gateway_errors_keyed_by_inner_kind() {
        let mut metrics = SimMetrics::new();
        let err = CrowdfundError::Gateway(GatewayError::InsufficientAllowance {
            spender: AccountId::new(),
            allowance: 0,
            requested: 1,
        });
        metrics.record(Operation::Contribute, &Err(err));
        assert_eq!(metrics.errors_of("InsufficientAllowance"), 1);
    }

    #[test]
    fn test_untouched_operation_is_zero() {
        let metrics = SimMetrics::new();
        assert_eq!(metrics.counters(Operation::Refund), OpCounters::default());
        assert!(metrics.summary().starts_with("Steps: 0"));
    }
}
