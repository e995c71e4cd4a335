//! # In-Memory Collaborators
//!
//! Reference implementations of [`AssetCustodian`], [`YieldStrategy`], and
//! [`Clock`] that keep everything in process memory. The integration tests
//! and the `tessera-sim` binary run on these.
//!
//! [`InMemoryCustodian`] and [`ManualClock`] are cheap-to-clone handles over
//! shared state: the vault owns one clone, the test or simulation keeps
//! another to fund wallets, donate, advance time, or inject failures.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::account::AccountId;
use crate::config::BPS_DENOMINATOR;
use crate::external::{AssetCustodian, Clock, CustodyError, StrategyError, YieldStrategy};
use crate::math::{mul_div, Rounding};

// ---------------------------------------------------------------------------
// InMemoryCustodian
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CustodyBook {
    wallets: BTreeMap<AccountId, u64>,
    allowances: BTreeMap<AccountId, u64>,
    vault: u64,
    fail_next_pull: Option<String>,
    fail_next_push: Option<String>,
}

impl CustodyBook {
    fn credit_wallet(&mut self, account: &AccountId, amount: u64) -> Result<(), CustodyError> {
        let entry = self.wallets.entry(account.clone()).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Rejected(format!("balance of {account} overflows")))?;
        Ok(())
    }

    /// Moves `amount` from `account`'s wallet into custody. Both sides are
    /// checked before either is written.
    fn move_to_vault(&mut self, account: &AccountId, amount: u64) -> Result<(), CustodyError> {
        let balance = self.wallets.get(account).copied().unwrap_or(0);
        if balance < amount {
            return Err(CustodyError::InsufficientBalance {
                owner: account.clone(),
                balance,
                requested: amount,
            });
        }
        let vault = self
            .vault
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Rejected("vault custody overflows".to_string()))?;

        self.wallets.insert(account.clone(), balance - amount);
        self.vault = vault;
        Ok(())
    }

    fn credit_vault(&mut self, amount: u64) -> Result<(), CustodyError> {
        self.vault = self
            .vault
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Rejected("vault custody overflows".to_string()))?;
        Ok(())
    }
}

/// A single-asset token ledger with an allowance model, shared between
/// clones.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustodian {
    book: Arc<RwLock<CustodyBook>>,
}

impl InMemoryCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints `amount` of the asset into `account`'s wallet.
    pub fn fund(&self, account: &AccountId, amount: u64) -> Result<(), CustodyError> {
        self.book.write().credit_wallet(account, amount)
    }

    /// Sets the amount the vault may pull from `owner`.
    pub fn approve(&self, owner: &AccountId, amount: u64) {
        self.book.write().allowances.insert(owner.clone(), amount);
    }

    /// Wallet balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.book.read().wallets.get(account).copied().unwrap_or(0)
    }

    /// Remaining allowance of `owner`.
    pub fn allowance(&self, owner: &AccountId) -> u64 {
        self.book.read().allowances.get(owner).copied().unwrap_or(0)
    }

    /// Transfers `amount` from `from`'s wallet straight into vault custody,
    /// bypassing the vault. The ledger does not see it until a sync.
    pub fn donate(&self, from: &AccountId, amount: u64) -> Result<(), CustodyError> {
        self.book.write().move_to_vault(from, amount)?;
        debug!(%from, amount, "donation into vault custody");
        Ok(())
    }

    /// Adds `amount` to vault custody out of thin air, the way a strategy's
    /// profit shows up.
    pub fn accrue(&self, amount: u64) -> Result<(), CustodyError> {
        self.book.write().credit_vault(amount)
    }

    /// Makes the next [`AssetCustodian::pull_from`] fail with `reason`.
    pub fn fail_next_pull(&self, reason: impl Into<String>) {
        self.book.write().fail_next_pull = Some(reason.into());
    }

    /// Makes the next [`AssetCustodian::push_to`] fail with `reason`.
    pub fn fail_next_push(&self, reason: impl Into<String>) {
        self.book.write().fail_next_push = Some(reason.into());
    }

    /// Sum of every wallet plus vault custody.
    pub fn total_supply(&self) -> u128 {
        let book = self.book.read();
        book.wallets.values().map(|&v| v as u128).sum::<u128>() + book.vault as u128
    }
}

impl AssetCustodian for InMemoryCustodian {
    fn pull_from(&mut self, from: &AccountId, amount: u64) -> Result<(), CustodyError> {
        let mut book = self.book.write();
        if let Some(reason) = book.fail_next_pull.take() {
            return Err(CustodyError::Rejected(reason));
        }

        let allowance = book.allowances.get(from).copied().unwrap_or(0);
        if allowance < amount {
            return Err(CustodyError::InsufficientAllowance {
                owner: from.clone(),
                allowance,
                requested: amount,
            });
        }

        book.move_to_vault(from, amount)?;
        book.allowances.insert(from.clone(), allowance - amount);
        Ok(())
    }

    fn push_to(&mut self, to: &AccountId, amount: u64) -> Result<(), CustodyError> {
        let mut book = self.book.write();
        if let Some(reason) = book.fail_next_push.take() {
            return Err(CustodyError::Rejected(reason));
        }
        if book.vault < amount {
            return Err(CustodyError::InsufficientVaultBalance {
                balance: book.vault,
                requested: amount,
            });
        }

        book.credit_wallet(to, amount)?;
        book.vault -= amount;
        Ok(())
    }

    fn vault_balance(&self) -> u64 {
        self.book.read().vault
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    /// Starts the clock at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Jumps to `instant`, forwards or backwards.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write() = instant;
    }

    /// Moves the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write();
        *now = *now + delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Replays a queue of yield reports. Every positive report is first
/// accrued into the custodian, so the reported yield is really there.
/// Reports zero once the queue is empty.
#[derive(Debug, Clone)]
pub struct ScriptedStrategy {
    custodian: InMemoryCustodian,
    script: VecDeque<Result<u64, StrategyError>>,
}

impl ScriptedStrategy {
    pub fn new(custodian: InMemoryCustodian) -> Self {
        Self {
            custodian,
            script: VecDeque::new(),
        }
    }

    /// Queues a successful report of `amount`.
    pub fn push_yield(&mut self, amount: u64) -> &mut Self {
        self.script.push_back(Ok(amount));
        self
    }

    /// Queues a failed report.
    pub fn push_failure(&mut self, error: StrategyError) -> &mut Self {
        self.script.push_back(Err(error));
        self
    }

    /// Reports still queued.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl YieldStrategy for ScriptedStrategy {
    fn report_yield(&mut self) -> Result<u64, StrategyError> {
        let amount = self.script.pop_front().unwrap_or(Ok(0))?;
        if amount > 0 {
            self.custodian
                .accrue(amount)
                .map_err(|e| StrategyError::InvalidReport(e.to_string()))?;
        }
        Ok(amount)
    }
}

/// Earns a fixed basis-point rate on the vault's custodial balance per
/// report, rounded down.
#[derive(Debug, Clone)]
pub struct RateStrategy {
    custodian: InMemoryCustodian,
    rate_bps: u16,
}

impl RateStrategy {
    pub fn new(custodian: InMemoryCustodian, rate_bps: u16) -> Self {
        Self { custodian, rate_bps }
    }

    pub fn rate_bps(&self) -> u16 {
        self.rate_bps
    }
}

impl YieldStrategy for RateStrategy {
    fn report_yield(&mut self) -> Result<u64, StrategyError> {
        let balance = self.custodian.vault_balance();
        let earned = mul_div(balance, self.rate_bps as u64, BPS_DENOMINATOR, Rounding::Floor)
            .map_err(|e| StrategyError::InvalidReport(e.to_string()))?;
        if earned > 0 {
            self.custodian
                .accrue(earned)
                .map_err(|e| StrategyError::InvalidReport(e.to_string()))?;
        }
        Ok(earned)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn alice() -> AccountId {
        AccountId::new("tessera:alice")
    }

    #[test]
    fn pull_requires_allowance_and_balance() {
        let mut custodian = InMemoryCustodian::new();
        custodian.fund(&alice(), 100).unwrap();

        assert!(matches!(
            custodian.pull_from(&alice(), 50),
            Err(CustodyError::InsufficientAllowance { allowance: 0, .. })
        ));

        custodian.approve(&alice(), 500);
        assert!(matches!(
            custodian.pull_from(&alice(), 200),
            Err(CustodyError::InsufficientBalance { balance: 100, .. })
        ));

        custodian.pull_from(&alice(), 60).unwrap();
        assert_eq!(custodian.balance_of(&alice()), 40);
        assert_eq!(custodian.allowance(&alice()), 440);
        assert_eq!(custodian.vault_balance(), 60);
    }

    #[test]
    fn pull_into_full_custody_moves_nothing() {
        let mut custodian = InMemoryCustodian::new();
        custodian.accrue(u64::MAX).unwrap();
        custodian.fund(&alice(), 10).unwrap();
        custodian.approve(&alice(), 10);

        assert!(matches!(
            custodian.pull_from(&alice(), 5),
            Err(CustodyError::Rejected(_))
        ));
        assert_eq!(custodian.balance_of(&alice()), 10);
        assert_eq!(custodian.allowance(&alice()), 10);
        assert_eq!(custodian.vault_balance(), u64::MAX);

        assert!(custodian.donate(&alice(), 5).is_err());
        assert_eq!(custodian.balance_of(&alice()), 10);
    }

    #[test]
    fn push_bounded_by_custody() {
        let mut custodian = InMemoryCustodian::new();
        custodian.accrue(10).unwrap();
        assert!(matches!(
            custodian.push_to(&alice(), 11),
            Err(CustodyError::InsufficientVaultBalance { balance: 10, .. })
        ));
        custodian.push_to(&alice(), 10).unwrap();
        assert_eq!(custodian.balance_of(&alice()), 10);
        assert_eq!(custodian.vault_balance(), 0);
    }

    #[test]
    fn injected_failures_fire_once() {
        let mut custodian = InMemoryCustodian::new();
        custodian.accrue(10).unwrap();
        custodian.fail_next_push("frozen");
        assert!(matches!(
            custodian.push_to(&alice(), 1),
            Err(CustodyError::Rejected(ref r)) if r == "frozen"
        ));
        assert!(custodian.push_to(&alice(), 1).is_ok());
    }

    #[test]
    fn clones_share_state() {
        let a = InMemoryCustodian::new();
        let b = a.clone();
        a.fund(&alice(), 7).unwrap();
        a.donate(&alice(), 7).unwrap();
        assert_eq!(b.vault_balance(), 7);
        assert_eq!(b.total_supply(), 7);
    }

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();
        handle.advance(Duration::hours(13));
        assert_eq!(clock.now(), start + Duration::hours(13));
        handle.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn scripted_strategy_accrues_reports() {
        let custodian = InMemoryCustodian::new();
        let mut strategy = ScriptedStrategy::new(custodian.clone());
        strategy
            .push_yield(25)
            .push_failure(StrategyError::Unavailable("rpc down".into()));

        assert_eq!(strategy.report_yield().unwrap(), 25);
        assert_eq!(custodian.vault_balance(), 25);
        assert!(strategy.report_yield().is_err());
        assert_eq!(strategy.report_yield().unwrap(), 0);
        assert_eq!(strategy.remaining(), 0);
    }

    #[test]
    fn rate_strategy_compounds_on_custody() {
        let custodian = InMemoryCustodian::new();
        custodian.accrue(10_000).unwrap();
        let mut strategy = RateStrategy::new(custodian.clone(), 100);
        assert_eq!(strategy.report_yield().unwrap(), 100);
        assert_eq!(strategy.report_yield().unwrap(), 101);
        assert_eq!(custodian.vault_balance(), 10_201);
    }
}
