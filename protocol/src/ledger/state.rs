//! The vault's scalar state.

use serde::{Deserialize, Serialize};

/// The two totals every conversion is priced from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Underlying asset units attributed to the vault.
    pub total_assets: u64,
    /// Outstanding shares, including any held by the dead-share sink.
    pub total_supply: u64,
}

/// Scalar vault state owned by a [`ShareLedger`](super::ShareLedger).
///
/// `total_assets` may lag the custodian's real balance between harvests:
/// donations and strategy profits only count once they are realized through
/// a harvest or a sync. It never lags by accident: every deposit, mint,
/// withdraw, and redeem moves it by exactly the asset amount settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    /// Asset and share totals.
    pub(crate) totals: Totals,

    /// Scaling exponent fixed at construction.
    pub(crate) decimals_offset: u8,

    /// Mutation counter. Every committed settlement advances it by one and
    /// every rollback restores it, so a settlement planned at epoch `n` can
    /// only be committed while the ledger is still at `n`.
    pub(crate) epoch: u64,
}

impl VaultState {
    /// Fresh state: zero assets, zero supply, epoch 0.
    pub fn new(decimals_offset: u8) -> Self {
        Self {
            totals: Totals::default(),
            decimals_offset,
            epoch: 0,
        }
    }

    /// Asset units attributed to the vault.
    pub fn total_assets(&self) -> u64 {
        self.totals.total_assets
    }

    /// Outstanding shares.
    pub fn total_supply(&self) -> u64 {
        self.totals.total_supply
    }

    /// Both totals.
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// The decimals offset chosen at construction.
    pub fn decimals_offset(&self) -> u8 {
        self.decimals_offset
    }

    /// Current mutation epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
