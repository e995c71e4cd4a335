//! # External Collaborators
//!
//! The accounting core never moves tokens and never reads the time on its
//! own. Three narrow traits describe what it needs from the host:
//!
//! ```text
//! AssetCustodian   pull assets in, push assets out, report the vault balance
//! YieldStrategy    report yield earned since the last harvest
//! Clock            current wall-clock time
//! ```
//!
//! Each is called from exactly one place in [`Vault`](crate::vault::Vault),
//! always between a ledger plan and the matching commit or rollback, so an
//! implementation that calls back into the vault finds nothing half-applied.
//! In-memory implementations for tests and simulation live in
//! [`memory`](crate::memory).

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::account::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures reported by an [`AssetCustodian`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    /// The payer has not approved the vault for enough assets.
    #[error("allowance of {owner} is {allowance}, {requested} requested")]
    InsufficientAllowance {
        /// The payer.
        owner: AccountId,
        /// Amount the vault is approved to pull.
        allowance: u64,
        /// Amount the vault tried to pull.
        requested: u64,
    },

    /// The payer does not hold enough assets.
    #[error("balance of {owner} is {balance}, {requested} requested")]
    InsufficientBalance {
        /// The payer.
        owner: AccountId,
        /// The payer's asset balance.
        balance: u64,
        /// Amount the vault tried to pull.
        requested: u64,
    },

    /// The vault's custodial account cannot cover a push.
    #[error("vault custody holds {balance}, {requested} requested")]
    InsufficientVaultBalance {
        /// Custodial balance.
        balance: u64,
        /// Amount the vault tried to push.
        requested: u64,
    },

    /// Any other refusal (frozen account, blocked recipient, ...).
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Failures reported by a [`YieldStrategy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// The strategy could not be reached or did not answer.
    #[error("strategy unavailable: {0}")]
    Unavailable(String),

    /// The strategy answered with something that is not a usable yield
    /// figure.
    #[error("strategy report rejected: {0}")]
    InvalidReport(String),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Token custody for the vault's underlying asset.
pub trait AssetCustodian {
    /// Moves `amount` from `from` into the vault's custody.
    fn pull_from(&mut self, from: &AccountId, amount: u64) -> Result<(), CustodyError>;

    /// Moves `amount` from the vault's custody to `to`.
    fn push_to(&mut self, to: &AccountId, amount: u64) -> Result<(), CustodyError>;

    /// The asset balance currently held in the vault's custody, including
    /// anything transferred in directly.
    fn vault_balance(&self) -> u64;
}

/// Source of harvestable yield.
pub trait YieldStrategy {
    /// Yield earned since the previous report, in asset units. Zero means
    /// nothing to harvest. The strategy is expected to have moved the yield
    /// into the vault's custody before reporting it.
    fn report_yield(&mut self) -> Result<u64, StrategyError>;
}

/// Wall-clock time source.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
