//! # Inflation Guard
//!
//! The first-depositor attack: an attacker deposits one unit into an empty
//! vault, then transfers a large amount directly to the vault's custody so
//! that one share is worth a fortune. The next honest deposit converts to
//! `floor(deposit / price)` shares, which rounds to zero or close to it, and
//! the attacker's single share now owns the victim's assets.
//!
//! Two mitigations are supported. Exactly one is active per vault, chosen at
//! construction:
//!
//! - [`InflationGuard::VirtualOffset`] (default): every conversion pretends
//!   the vault holds one extra asset unit and `10^decimals_offset` extra
//!   shares, with the offset at least [`MIN_DECIMALS_OFFSET`]. Those virtual
//!   shares absorb almost all of any donation, so the attacker loses far
//!   more than the rounding they can extract.
//! - [`InflationGuard::DeadShares`]: a fixed amount of shares is minted to a
//!   sink at construction and can never be redeemed. Conversions use the raw
//!   totals. A vault holding only the sink's shares converts at the
//!   bootstrap rate of `10^decimals_offset` shares per asset unit; a vault
//!   whose holders still own shares after its assets fell to zero is
//!   insolvent and takes no new money.
//!
//! Both variants go through the same [`to_shares`](InflationGuard::to_shares)
//! / [`to_assets`](InflationGuard::to_assets) pair, which every ledger path
//! uses. There is no way to apply one policy to deposits and another to
//! redemptions.

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_DEAD_SHARES, DEFAULT_DECIMALS_OFFSET, MAX_DECIMALS_OFFSET, MIN_DECIMALS_OFFSET,
};
use crate::error::VaultError;
use crate::math::{mul_div_wide, pow10, Rounding};

/// Inflation-attack mitigation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum InflationGuard {
    /// Conversions use `total_assets + 1` and `total_supply + 10^decimals_offset`.
    VirtualOffset {
        /// Exponent of the virtual share supply.
        decimals_offset: u8,
    },
    /// `dead_shares` are minted to the sink at construction.
    DeadShares {
        /// Exponent of the bootstrap share rate.
        decimals_offset: u8,
        /// Permanently locked shares held by the sink.
        dead_shares: u64,
    },
}

impl Default for InflationGuard {
    fn default() -> Self {
        InflationGuard::VirtualOffset {
            decimals_offset: DEFAULT_DECIMALS_OFFSET,
        }
    }
}

impl InflationGuard {
    /// Virtual-offset policy with the given exponent.
    pub fn virtual_offset(decimals_offset: u8) -> Self {
        InflationGuard::VirtualOffset { decimals_offset }
    }

    /// Dead-share policy with the default sink amount.
    pub fn dead_shares(decimals_offset: u8) -> Self {
        InflationGuard::DeadShares {
            decimals_offset,
            dead_shares: DEFAULT_DEAD_SHARES,
        }
    }

    /// Checks the policy parameters.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidDecimalsOffset`] if the offset exceeds
    ///   [`MAX_DECIMALS_OFFSET`], or a virtual offset is below
    ///   [`MIN_DECIMALS_OFFSET`].
    /// - [`VaultError::InvalidDeadShares`] for a dead-share policy with zero
    ///   shares.
    pub fn validate(&self) -> Result<(), VaultError> {
        let offset = self.decimals_offset();
        let min = match self {
            InflationGuard::VirtualOffset { .. } => MIN_DECIMALS_OFFSET,
            InflationGuard::DeadShares { .. } => 0,
        };
        if offset < min || offset > MAX_DECIMALS_OFFSET {
            return Err(VaultError::InvalidDecimalsOffset {
                offset,
                min,
                max: MAX_DECIMALS_OFFSET,
            });
        }
        if let InflationGuard::DeadShares { dead_shares: 0, .. } = self {
            return Err(VaultError::InvalidDeadShares);
        }
        Ok(())
    }

    /// The scaling exponent recorded in the vault state.
    pub fn decimals_offset(&self) -> u8 {
        match *self {
            InflationGuard::VirtualOffset { decimals_offset }
            | InflationGuard::DeadShares { decimals_offset, .. } => decimals_offset,
        }
    }

    /// Shares minted to the sink when the ledger is created.
    pub fn genesis_shares(&self) -> u64 {
        match *self {
            InflationGuard::VirtualOffset { .. } => 0,
            InflationGuard::DeadShares { dead_shares, .. } => dead_shares,
        }
    }

    /// The `(assets, shares)` pair conversions actually divide by.
    ///
    /// The asset side is zero only for an insolvent dead-share vault:
    /// shares beyond the sink's are outstanding and nothing backs them.
    pub fn effective_totals(
        &self,
        total_assets: u64,
        total_supply: u64,
    ) -> Result<(u128, u128), VaultError> {
        let scale = pow10(self.decimals_offset())? as u128;
        match self {
            InflationGuard::VirtualOffset { .. } => {
                Ok((total_assets as u128 + 1, total_supply as u128 + scale))
            }
            InflationGuard::DeadShares { dead_shares, .. }
                if total_assets == 0 && total_supply <= *dead_shares =>
            {
                Ok((1, scale))
            }
            InflationGuard::DeadShares { .. } => Ok((total_assets as u128, total_supply as u128)),
        }
    }

    /// Converts an asset amount to shares at the current totals.
    pub fn to_shares(
        &self,
        assets: u64,
        total_assets: u64,
        total_supply: u64,
        rounding: Rounding,
    ) -> Result<u64, VaultError> {
        let (eff_assets, eff_shares) = self.effective_totals(total_assets, total_supply)?;
        if eff_assets == 0 {
            return Err(VaultError::Insolvent { total_supply });
        }
        mul_div_wide(assets as u128, eff_shares, eff_assets, rounding)
    }

    /// Converts a share amount to assets at the current totals.
    pub fn to_assets(
        &self,
        shares: u64,
        total_assets: u64,
        total_supply: u64,
        rounding: Rounding,
    ) -> Result<u64, VaultError> {
        let (eff_assets, eff_shares) = self.effective_totals(total_assets, total_supply)?;
        mul_div_wide(shares as u128, eff_assets, eff_shares, rounding)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
