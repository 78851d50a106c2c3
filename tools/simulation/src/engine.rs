//! Deterministic simulation harness
//!
//! Drives one ledger (single-token or allow-list) with seeded creator and
//! contributor bots over a manual clock. After every step the ledger is
//! checked against its bookkeeping invariants:
//! - each campaign's total raised equals the sum of its contribution entries
//! - no campaign is both withdrawn and refunded
//! - custody holds, per token, exactly what un-withdrawn campaigns account for
//!
//! Every identity and bot seed derives from the configured master seed, so
//! equal configs yield equal runs.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use types::errors::CrowdfundError;
use types::ids::{AccountId, CampaignId, TokenId};
use types::numeric::{Amount, Timestamp};

use contracts::clock::{Clock, ManualClock};
use contracts::crowdfund::Crowdfund;
use contracts::gateway::{CustodyGateway, InMemoryToken};
use contracts::multi::MultiTokenCrowdfund;
use contracts::settlement::SettlementEngine;
use contracts::single::SingleTokenCrowdfund;

use crate::bots::contributor::{ContributorAction, ContributorBot, TokenPick};
use crate::bots::creator::CreatorBot;
use crate::bots::{derive_account, derive_token};
use crate::config::SimulationConfig;
use crate::errors::{InvariantViolation, SimError};
use crate::export::{build_report, SimulationReport};
use crate::metrics::{Operation, SimMetrics};

/// Clock reading at the start of every run.
pub const GENESIS: Timestamp = 1_700_000_000;

/// The ledger variant a run exercises.
pub enum LedgerUnderTest {
    Single(SingleTokenCrowdfund<CustodyGateway, ManualClock>),
    Multi(MultiTokenCrowdfund<CustodyGateway, ManualClock>),
}

impl LedgerUnderTest {
    pub fn crowdfund(&mut self) -> &mut dyn Crowdfund {
        match self {
            Self::Single(ledger) => ledger,
            Self::Multi(ledger) => ledger,
        }
    }

    pub fn view(&self) -> &dyn Crowdfund {
        match self {
            Self::Single(ledger) => ledger,
            Self::Multi(ledger) => ledger,
        }
    }

    pub fn settlement(&self) -> &SettlementEngine {
        match self {
            Self::Single(ledger) => ledger.engine(),
            Self::Multi(ledger) => ledger.engine(),
        }
    }

    pub fn variant(&self) -> &'static str {
        match self {
            Self::Single(_) => "single_token",
            Self::Multi(_) => "multi_token",
        }
    }
}

pub struct SimEngine {
    config: SimulationConfig,
    clock: ManualClock,
    ledger: LedgerUnderTest,
    tokens: Vec<InMemoryToken>,
    /// A token no ledger accepts
    unlisted: TokenId,
    custody: AccountId,
    creators: Vec<CreatorBot>,
    contributors: Vec<ContributorBot>,
    scheduler: ChaCha8Rng,
    withdrawn: BTreeSet<CampaignId>,
    refunded: BTreeSet<CampaignId>,
    metrics: SimMetrics,
}

impl SimEngine {
    /// Deploy tokens and ledger, fund the contributors and open the initial campaigns.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut scheduler = ChaCha8Rng::seed_from_u64(config.seed);
        let clock = ManualClock::new(GENESIS);
        let custody = derive_account(&mut scheduler);

        let tokens: Vec<InMemoryToken> = (0..config.deployed_tokens())
            .map(|i| InMemoryToken::with_id(derive_token(&mut scheduler), format!("TK{}", i)))
            .collect();
        let unlisted = derive_token(&mut scheduler);

        let ledger = if config.multi_token {
            let gateways = tokens.iter().map(|t| t.gateway(custody)).collect();
            LedgerUnderTest::Multi(MultiTokenCrowdfund::new(gateways, clock.clone())?)
        } else {
            let token = tokens.first().ok_or(CrowdfundError::EmptyTokensArray)?;
            LedgerUnderTest::Single(SingleTokenCrowdfund::new(
                token.gateway(custody),
                clock.clone(),
            )?)
        };

        let mut contributors = Vec::with_capacity(config.contributors);
        for _ in 0..config.contributors {
            let account = derive_account(&mut scheduler);
            for token in &tokens {
                token.mint(account, config.allowance)?;
                token.approve(account, custody, config.allowance);
            }
            contributors.push(ContributorBot::new(account, config.amount, scheduler.gen()));
        }

        let creators = (0..config.campaigns)
            .map(|_| {
                let account = derive_account(&mut scheduler);
                CreatorBot::new(account, config.goal, config.duration, scheduler.gen())
            })
            .collect();

        let mut engine = Self {
            config,
            clock,
            ledger,
            tokens,
            unlisted,
            custody,
            creators,
            contributors,
            scheduler,
            withdrawn: BTreeSet::new(),
            refunded: BTreeSet::new(),
            metrics: SimMetrics::new(),
        };
        for creator in 0..engine.creators.len() {
            engine.open_campaign(creator);
        }
        Ok(engine)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn ledger(&self) -> &LedgerUnderTest {
        &self.ledger
    }

    pub fn tokens(&self) -> &[InMemoryToken] {
        &self.tokens
    }

    pub fn custody(&self) -> AccountId {
        self.custody
    }

    pub fn metrics(&self) -> &SimMetrics {
        &self.metrics
    }

    /// Run the configured steps, settle every campaign, and report.
    pub fn run(mut self) -> Result<SimulationReport, SimError> {
        info!(
            seed = self.config.seed,
            variant = self.ledger.variant(),
            steps = self.config.steps,
            "Simulation started"
        );
        for _ in 0..self.config.steps {
            self.step()?;
        }
        self.settle_all()?;
        info!(summary = %self.metrics.summary(), "Simulation finished");
        Ok(build_report(&self))
    }

    /// One scheduled action followed by an invariant check.
    pub fn step(&mut self) -> Result<(), SimError> {
        let roll: u32 = self.scheduler.gen_range(0..100);
        match roll {
            0..=9 => self.advance_clock(),
            10..=14 => {
                let creator = self.scheduler.gen_range(0..self.creators.len());
                self.open_campaign(creator);
            }
            15..=24 => {
                let creator = self.scheduler.gen_range(0..self.creators.len());
                self.try_withdraw(creator);
            }
            _ => {
                let contributor = self.scheduler.gen_range(0..self.contributors.len());
                self.contributor_turn(contributor);
            }
        }
        self.metrics.steps += 1;
        self.verify()
    }

    /// Jump past every deadline, let creators collect and contributors reclaim.
    pub fn settle_all(&mut self) -> Result<(), SimError> {
        let last_deadline = self
            .ledger
            .view()
            .get_campaigns()
            .iter()
            .map(|c| c.deadline)
            .max()
            .unwrap_or(GENESIS);
        let now = self.clock.now();
        if last_deadline > now {
            self.clock.set(last_deadline);
            self.metrics.record_clock(last_deadline - now);
        }

        for creator in 0..self.creators.len() {
            let account = self.creators[creator].account;
            let campaigns = self.creators[creator].campaigns.clone();
            for id in campaigns {
                self.withdraw(account, id);
            }
        }
        self.verify()?;

        let ids: Vec<CampaignId> = self.ledger.settlement().registry().ids().collect();
        for contributor in 0..self.contributors.len() {
            let account = self.contributors[contributor].account;
            for &id in &ids {
                let pledged = self.ledger.view().get_contribution(id, account).unwrap_or(0);
                if pledged > 0 && !self.withdrawn.contains(&id) {
                    self.refund(account, id);
                }
            }
        }
        self.verify()
    }

    fn advance_clock(&mut self) {
        let seconds = self.scheduler.gen_range(1..=self.config.max_clock_step);
        self.clock.advance(seconds);
        self.metrics.record_clock(seconds);
        debug!(seconds, now = self.clock.now(), "Clock advanced");
    }

    fn open_campaign(&mut self, creator: usize) {
        let bot = &mut self.creators[creator];
        let (goal, duration) = bot.propose();
        let result = self.ledger.crowdfund().create_campaign(bot.account, goal, duration);
        if let Ok(id) = result {
            bot.adopt(id);
        }
        self.metrics
            .record(Operation::CreateCampaign, &result.map(|_| 0));
    }

    fn try_withdraw(&mut self, creator: usize) {
        let account = self.creators[creator].account;
        if let Some(id) = self.creators[creator].pick_withdrawal() {
            self.withdraw(account, id);
        }
    }

    fn withdraw(&mut self, creator: AccountId, id: CampaignId) {
        let result = self.ledger.crowdfund().withdraw_funds(creator, id);
        if result.is_ok() {
            self.withdrawn.insert(id);
        }
        self.metrics.record(Operation::WithdrawFunds, &result);
    }

    fn refund(&mut self, contributor: AccountId, id: CampaignId) {
        let result = self.ledger.crowdfund().refund(contributor, id);
        if result.is_ok() {
            self.refunded.insert(id);
        }
        self.metrics.record(Operation::Refund, &result);
    }

    fn contributor_turn(&mut self, contributor: usize) {
        let last = self.ledger.settlement().registry().last_id();
        let bot = &mut self.contributors[contributor];
        let account = bot.account;

        match bot.next_action(last, self.tokens.len()) {
            ContributorAction::Contribute {
                campaign,
                token,
                amount,
            } => {
                let token = match token {
                    TokenPick::Listed(i) => self.tokens.get(i).map(|t| t.id()),
                    TokenPick::Unlisted => None,
                }
                .unwrap_or(self.unlisted);
                let result = self
                    .ledger
                    .crowdfund()
                    .contribute_token(account, campaign, token, amount)
                    .map(|()| amount);
                self.metrics.record(Operation::Contribute, &result);
            }
            ContributorAction::Cancel { campaign } => {
                let result = self.ledger.crowdfund().cancel_contribution(account, campaign);
                self.metrics.record(Operation::CancelContribution, &result);
            }
            ContributorAction::Refund { campaign } => self.refund(account, campaign),
        }
    }

    fn verify(&self) -> Result<(), SimError> {
        self.check_invariants().map_err(|violation| {
            warn!(step = self.metrics.steps, %violation, "Invariant violated");
            SimError::Invariant {
                step: self.metrics.steps as usize,
                violation,
            }
        })
    }

    /// Check the ledger's bookkeeping against custody balances.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let settlement = self.ledger.settlement();
        let ledger = settlement.ledger();
        let campaigns = settlement.registry().all();

        for id in settlement.registry().ids() {
            let total_raised = campaigns[id.index()].total_raised;
            let entries = ledger.sum_for(id);
            if total_raised != entries {
                return Err(InvariantViolation::TotalMismatch {
                    campaign: id,
                    total_raised,
                    entries,
                });
            }
        }

        if let Some(&campaign) = self.withdrawn.intersection(&self.refunded).next() {
            return Err(InvariantViolation::DoubleSettlement { campaign });
        }

        for token in &self.tokens {
            let expected: Amount = settlement
                .registry()
                .ids()
                .filter(|id| !campaigns[id.index()].withdrawn)
                .map(|id| ledger.token_totals(id).get(&token.id()).copied().unwrap_or(0))
                .sum();
            let held = token.balance_of(self.custody);
            if held != expected {
                return Err(InvariantViolation::CustodyMismatch {
                    token: token.id(),
                    held,
                    expected,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(multi_token: bool) -> SimulationConfig {
        SimulationConfig {
            seed: 11,
            campaigns: 3,
            contributors: 4,
            steps: 200,
            multi_token,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_setup_opens_initial_campaigns() {
        let engine = SimEngine::new(small(false)).unwrap();
        assert_eq!(engine.ledger().view().get_campaigns().len(), 4);
        assert_eq!(engine.tokens().len(), 1);
        assert_eq!(engine.ledger().variant(), "single_token");
        assert!(engine.check_invariants().is_ok());
    }

    #[test]
    fn test_contributors_funded_per_token() {
        let engine = SimEngine::new(small(true)).unwrap();
        assert_eq!(engine.tokens().len(), 3);
        let supply: Amount = engine.tokens().iter().map(|t| t.total_supply()).sum();
        assert_eq!(supply, 3 * 4 * engine.config().allowance);
    }

    #[test]
    fn test_steps_keep_invariants() {
        let mut engine = SimEngine::new(small(true)).unwrap();
        for _ in 0..200 {
            engine.step().unwrap();
        }
        assert_eq!(engine.metrics().steps, 200);
    }

    #[test]
    fn test_settle_all_empties_custody() {
        let mut engine = SimEngine::new(small(false)).unwrap();
        for _ in 0..200 {
            engine.step().unwrap();
        }
        engine.settle_all().unwrap();
        for token in engine.tokens() {
            assert_eq!(token.balance_of(engine.custody()), 0);
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimulationConfig {
            contributors: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(SimEngine::new(config), Err(SimError::Config(_))));
    }
}
