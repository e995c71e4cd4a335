//! # Settlements
//!
//! A [`Settlement`] is a fully validated, fully computed ledger mutation
//! that has not been applied yet. The ledger produces one in its `plan_*`
//! methods (the "checks" phase) and applies it in
//! [`ShareLedger::commit`](super::ShareLedger::commit) (the "effects"
//! phase). Anything that talks to the outside world (pulling assets in,
//! pushing them out) happens in between, in the vault, never inside the
//! ledger.
//!
//! Each settlement records the epoch and totals it was computed against and
//! the totals it will produce. Commit refuses a settlement whose epoch no
//! longer matches, and rollback refuses one that is not the most recent
//! commit, so a settlement can never be applied to a ledger it was not
//! priced for.

use serde::{Deserialize, Serialize};

use super::state::Totals;
use crate::account::AccountId;

/// What a settlement does to the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementKind {
    /// Assets in, shares credited (assets fixed, shares rounded down).
    Deposit,
    /// Assets in, shares credited (shares fixed, assets rounded up).
    Mint,
    /// Shares debited, assets out (assets fixed, shares rounded up).
    Withdraw,
    /// Shares debited, assets out (shares fixed, assets rounded down).
    Redeem,
    /// Reinvested yield added to `total_assets`; supply untouched.
    Yield,
    /// `total_assets` reset to the custodian's balance; supply untouched.
    Sync,
}

impl SettlementKind {
    /// Returns `true` if assets flow into the vault.
    pub fn is_inflow(&self) -> bool {
        matches!(self, SettlementKind::Deposit | SettlementKind::Mint)
    }

    /// Returns `true` if assets flow out of the vault.
    pub fn is_outflow(&self) -> bool {
        matches!(self, SettlementKind::Withdraw | SettlementKind::Redeem)
    }
}

/// A planned ledger mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub(crate) kind: SettlementKind,
    /// Account whose share balance changes (none for yield and sync).
    pub(crate) holder: Option<AccountId>,
    /// Account that receives assets on withdraw/redeem.
    pub(crate) receiver: Option<AccountId>,
    pub(crate) assets: u64,
    pub(crate) shares: u64,
    pub(crate) epoch: u64,
    pub(crate) before: Totals,
    pub(crate) after: Totals,
}

impl Settlement {
    /// The kind of mutation.
    pub fn kind(&self) -> SettlementKind {
        self.kind
    }

    /// The account whose shares are credited or debited.
    pub fn holder(&self) -> Option<&AccountId> {
        self.holder.as_ref()
    }

    /// The account that receives assets on an outflow.
    pub fn receiver(&self) -> Option<&AccountId> {
        self.receiver.as_ref()
    }

    /// Asset amount moved (for sync: absolute change of `total_assets`).
    pub fn assets(&self) -> u64 {
        self.assets
    }

    /// Share amount credited or debited.
    pub fn shares(&self) -> u64 {
        self.shares
    }

    /// Ledger epoch the settlement was priced at.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Totals before the mutation.
    pub fn before(&self) -> Totals {
        self.before
    }

    /// Totals after the mutation.
    pub fn after(&self) -> Totals {
        self.after
    }
}
