//! Performance-fee configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::config::{MAX_HARVEST_COOLDOWN, MAX_PERFORMANCE_FEE_BPS, MIN_HARVEST_COOLDOWN};
use crate::error::VaultError;
use crate::math::{bps_of, checked_sub};

/// Fee rate, recipient, and harvest spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Share of every harvest skimmed as a fee, in basis points.
    pub performance_fee_bps: u16,
    /// Account the fee is pushed to.
    pub fee_recipient: AccountId,
    /// Minimum time between two harvests.
    pub cooldown: Duration,
}

impl FeeConfig {
    /// Builds and validates a fee configuration.
    ///
    /// # Errors
    ///
    /// See [`FeeConfig::validate`].
    pub fn new(
        performance_fee_bps: u16,
        fee_recipient: AccountId,
        cooldown: Duration,
    ) -> Result<Self, VaultError> {
        let config = Self {
            performance_fee_bps,
            fee_recipient,
            cooldown,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// - [`VaultError::FeeTooHigh`] above [`MAX_PERFORMANCE_FEE_BPS`].
    /// - [`VaultError::InvalidRecipient`] for an empty recipient or the
    ///   dead-share sink (fees sent there could never be recovered).
    /// - [`VaultError::CooldownOutOfRange`] outside
    ///   [`MIN_HARVEST_COOLDOWN`]..=[`MAX_HARVEST_COOLDOWN`].
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.performance_fee_bps > MAX_PERFORMANCE_FEE_BPS {
            return Err(VaultError::FeeTooHigh {
                fee_bps: self.performance_fee_bps,
                max_bps: MAX_PERFORMANCE_FEE_BPS,
            });
        }
        if self.fee_recipient.is_null() || self.fee_recipient.is_dead_sink() {
            return Err(VaultError::InvalidRecipient(
                self.fee_recipient.as_str().to_string(),
            ));
        }
        if self.cooldown < MIN_HARVEST_COOLDOWN || self.cooldown > MAX_HARVEST_COOLDOWN {
            return Err(VaultError::CooldownOutOfRange {
                secs: self.cooldown.as_secs(),
                min_secs: MIN_HARVEST_COOLDOWN.as_secs(),
                max_secs: MAX_HARVEST_COOLDOWN.as_secs(),
            });
        }
        Ok(())
    }

    /// Splits a harvested amount into `(fee, reinvested)`. The fee rounds
    /// down, so the remainder always goes back to the holders.
    pub fn split(&self, yield_amount: u64) -> Result<(u64, u64), VaultError> {
        let fee = bps_of(yield_amount, self.performance_fee_bps)?;
        let reinvested = checked_sub(yield_amount, fee)?;
        Ok((fee, reinvested))
    }
}
