//! Token Gateway: the ledger's only path for moving value
//!
//! The ledger never keeps token balances itself. It asks a gateway to pull
//! a pledge from a contributor (which requires a prior allowance) and to push
//! funds out of custody to a creator or contributor.
//!
//! `InMemoryToken` is an allowance-style fungible token book used to back
//! gateways in tests and simulations:
//! - Balance tracking by account
//! - Allowances by (owner, spender)
//! - Checked credit/debit with overflow protection
//! - `transfer_from` checks allowance before balance

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use types::errors::GatewayError;
use types::ids::{AccountId, TokenId};
use types::numeric::Amount;

/// Value transfer interface for a single token.
///
/// `custody` is the account under which the ledger holds pledged tokens;
/// it is also the spender contributors approve.
pub trait TokenGateway {
    /// Token moved by this gateway.
    fn token(&self) -> TokenId;

    /// Account holding the ledger's tokens.
    fn custody(&self) -> AccountId;

    /// Move `amount` from `from` into custody, spending `from`'s allowance.
    fn pull(&self, from: AccountId, amount: Amount) -> Result<(), GatewayError>;

    /// Move `amount` from custody to `to`.
    fn push(&self, to: AccountId, amount: Amount) -> Result<(), GatewayError>;

    /// Current token balance of `account`.
    fn balance_of(&self, account: AccountId) -> Amount;
}

#[derive(Debug, Default)]
struct TokenBook {
    balances: HashMap<AccountId, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
}

impl TokenBook {
    fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Debit `from` and credit `to`, validating both sides before writing.
    fn move_balance(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), GatewayError> {
        let from_balance = self.balance(&from);
        if from_balance < amount {
            return Err(GatewayError::InsufficientBalance {
                account: from,
                balance: from_balance,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let to_balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(GatewayError::Overflow)?;

        self.balances.insert(from, from_balance - amount);
        self.balances.insert(to, to_balance);
        Ok(())
    }
}

/// Shared handle to an in-memory fungible token.
///
/// Clones refer to the same book, so a test can keep minting, approving and
/// inspecting balances after handing a gateway to a ledger.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    id: TokenId,
    symbol: String,
    book: Arc<Mutex<TokenBook>>,
}

impl InMemoryToken {
    /// Create an empty token with a fresh id.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_id(TokenId::new(), symbol)
    }

    /// Create an empty token with a fixed id.
    pub fn with_id(id: TokenId, symbol: impl Into<String>) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            book: Arc::new(Mutex::new(TokenBook::default())),
        }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Create `amount` new tokens owned by `to`.
    pub fn mint(&self, to: AccountId, amount: Amount) -> Result<(), GatewayError> {
        let mut book = self.book.lock();
        let supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(GatewayError::Overflow)?;
        let balance = book
            .balance(&to)
            .checked_add(amount)
            .ok_or(GatewayError::Overflow)?;

        book.total_supply = supply;
        book.balances.insert(to, balance);
        Ok(())
    }

    /// Set the allowance `spender` may pull from `owner`.
    pub fn approve(&self, owner: AccountId, spender: AccountId, amount: Amount) {
        self.book.lock().allowances.insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount {
        self.book.lock().allowance(&owner, &spender)
    }

    pub fn balance_of(&self, account: AccountId) -> Amount {
        self.book.lock().balance(&account)
    }

    pub fn total_supply(&self) -> Amount {
        self.book.lock().total_supply
    }

    /// Move tokens from `from` to `to` on `from`'s own authority.
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), GatewayError> {
        self.book.lock().move_balance(from, to, amount)
    }

    /// Move tokens from `from` to `to` on `spender`'s allowance.
    ///
    /// Fails without touching any balance or allowance if the allowance or
    /// the balance is short.
    pub fn transfer_from(
        &self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), GatewayError> {
        let mut book = self.book.lock();
        let allowance = book.allowance(&from, &spender);
        if allowance < amount {
            return Err(GatewayError::InsufficientAllowance {
                spender,
                allowance,
                requested: amount,
            });
        }

        book.move_balance(from, to, amount)?;
        book.allowances.insert((from, spender), allowance - amount);
        Ok(())
    }

    /// Gateway for a ledger holding this token under `custody`.
    pub fn gateway(&self, custody: AccountId) -> CustodyGateway {
        CustodyGateway {
            token: self.clone(),
            custody,
        }
    }
}

/// `TokenGateway` over an `InMemoryToken`, holding funds under one custody account.
#[derive(Debug, Clone)]
pub struct CustodyGateway {
    token: InMemoryToken,
    custody: AccountId,
}

impl CustodyGateway {
    /// Underlying token book.
    pub fn token_book(&self) -> &InMemoryToken {
        &self.token
    }
}

impl TokenGateway for CustodyGateway {
    fn token(&self) -> TokenId {
        self.token.id()
    }

    fn custody(&self) -> AccountId {
        self.custody
    }

    fn pull(&self, from: AccountId, amount: Amount) -> Result<(), GatewayError> {
        self.token
            .transfer_from(self.custody, from, self.custody, amount)
    }

    fn push(&self, to: AccountId, amount: Amount) -> Result<(), GatewayError> {
        self.token.transfer(self.custody, to, amount)
    }

    fn balance_of(&self, account: AccountId) -> Amount {
        self.token.balance_of(account)
    }
}
