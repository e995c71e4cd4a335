//! # Harvest Accountant
//!
//! Turns a reported yield figure into ledger bookkeeping. A harvest:
//!
//! 1. is refused while `now < last_harvest + cooldown`;
//! 2. is refused when the strategy reports zero;
//! 3. splits the yield into a performance fee (rounded down) and the
//!    reinvested remainder;
//! 4. adds only the remainder to `total_assets`. Supply is never touched, so
//!    every existing share gains value in the same proportion.
//!
//! The fee itself never enters `total_assets`; the vault pushes it from
//! custody to the fee recipient right after the ledger commit.
//!
//! The accountant is split like the ledger: [`HarvestAccountant::plan`]
//! validates and prices, [`HarvestAccountant::finish`] records the harvest
//! once the ledger commit and the fee payout have both succeeded. A harvest
//! that fails in between leaves the accountant exactly as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::fees::FeeConfig;
use crate::error::VaultError;
use crate::ledger::{Settlement, ShareLedger};
use crate::math::checked_add;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Outcome of one successful harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestRecord {
    /// 1-based harvest number.
    pub sequence: u64,
    /// Yield reported by the strategy.
    pub yield_amount: u64,
    /// Performance fee paid out.
    pub fee_amount: u64,
    /// Yield added to `total_assets`.
    pub reinvested_amount: u64,
    /// `total_assets` after the harvest.
    pub total_assets_after: u64,
    /// `total_supply` at the harvest (unchanged by it).
    pub total_supply: u64,
    /// Clock reading the harvest was accepted at.
    pub timestamp: DateTime<Utc>,
}

/// A priced harvest waiting for its ledger commit and fee payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestPlan {
    yield_amount: u64,
    fee_amount: u64,
    reinvested_amount: u64,
    timestamp: DateTime<Utc>,
    settlement: Settlement,
}

impl HarvestPlan {
    /// Yield reported by the strategy.
    pub fn yield_amount(&self) -> u64 {
        self.yield_amount
    }

    /// Fee to push to the recipient.
    pub fn fee_amount(&self) -> u64 {
        self.fee_amount
    }

    /// Yield that stays in the vault.
    pub fn reinvested_amount(&self) -> u64 {
        self.reinvested_amount
    }

    /// The ledger mutation crediting the reinvested yield.
    pub fn settlement(&self) -> &Settlement {
        &self.settlement
    }
}

// ---------------------------------------------------------------------------
// HarvestAccountant
// ---------------------------------------------------------------------------

/// Harvest timing and running totals for one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestAccountant {
    fees: FeeConfig,
    /// `None` until the first harvest; the first harvest is never cooling
    /// down.
    last_harvest: Option<DateTime<Utc>>,
    harvest_count: u64,
    cumulative_fees: u64,
    cumulative_reinvested: u64,
}

impl HarvestAccountant {
    /// Creates an accountant that has never harvested.
    ///
    /// # Errors
    ///
    /// Propagates [`FeeConfig::validate`] failures.
    pub fn new(fees: FeeConfig) -> Result<Self, VaultError> {
        fees.validate()?;
        Ok(Self {
            fees,
            last_harvest: None,
            harvest_count: 0,
            cumulative_fees: 0,
            cumulative_reinvested: 0,
        })
    }

    /// Current fee configuration.
    pub fn fees(&self) -> &FeeConfig {
        &self.fees
    }

    /// Replaces the fee configuration. The cooldown timer keeps running from
    /// the last harvest.
    pub fn set_fees(&mut self, fees: FeeConfig) -> Result<(), VaultError> {
        fees.validate()?;
        self.fees = fees;
        Ok(())
    }

    /// Instant of the last successful harvest.
    pub fn last_harvest(&self) -> Option<DateTime<Utc>> {
        self.last_harvest
    }

    /// Number of successful harvests.
    pub fn harvest_count(&self) -> u64 {
        self.harvest_count
    }

    /// Sum of all fees paid out.
    pub fn cumulative_fees(&self) -> u64 {
        self.cumulative_fees
    }

    /// Sum of all yield reinvested.
    pub fn cumulative_reinvested(&self) -> u64 {
        self.cumulative_reinvested
    }

    /// Earliest instant the next harvest is accepted, or `None` if one is
    /// accepted right away.
    pub fn ready_at(&self) -> Result<Option<DateTime<Utc>>, VaultError> {
        let Some(last) = self.last_harvest else {
            return Ok(None);
        };
        let cooldown = chrono::Duration::from_std(self.fees.cooldown)
            .map_err(|_| VaultError::Overflow)?;
        last.checked_add_signed(cooldown)
            .map(Some)
            .ok_or(VaultError::Overflow)
    }

    /// Fails [`VaultError::CooldownActive`] if `now` is inside the cooldown
    /// window. A clock reading earlier than the last harvest is inside the
    /// window too.
    pub fn ensure_ready(&self, now: DateTime<Utc>) -> Result<(), VaultError> {
        match self.ready_at()? {
            Some(ready_at) if now < ready_at => Err(VaultError::CooldownActive { ready_at }),
            _ => Ok(()),
        }
    }

    /// Validates and prices a harvest of `reported` yield at `now`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::CooldownActive`] inside the cooldown window.
    /// - [`VaultError::NoYield`] if `reported == 0`.
    /// - [`VaultError::Overflow`] if `total_assets` cannot absorb the yield.
    pub fn plan(
        &self,
        reported: u64,
        now: DateTime<Utc>,
        ledger: &ShareLedger,
    ) -> Result<HarvestPlan, VaultError> {
        self.ensure_ready(now)?;
        if reported == 0 {
            return Err(VaultError::NoYield);
        }

        let (fee_amount, reinvested_amount) = self.fees.split(reported)?;
        let settlement = ledger.plan_yield(reinvested_amount)?;

        debug!(
            yield_amount = reported,
            fee_amount,
            reinvested_amount,
            "harvest planned"
        );

        Ok(HarvestPlan {
            yield_amount: reported,
            fee_amount,
            reinvested_amount,
            timestamp: now,
            settlement,
        })
    }

    /// Records a harvest whose settlement has been committed and whose fee
    /// has been paid.
    pub fn finish(&mut self, plan: &HarvestPlan) -> Result<HarvestRecord, VaultError> {
        let sequence = self.harvest_count.checked_add(1).ok_or(VaultError::Overflow)?;
        let cumulative_fees = checked_add(self.cumulative_fees, plan.fee_amount)?;
        let cumulative_reinvested = checked_add(self.cumulative_reinvested, plan.reinvested_amount)?;

        self.harvest_count = sequence;
        self.cumulative_fees = cumulative_fees;
        self.cumulative_reinvested = cumulative_reinvested;
        self.last_harvest = Some(plan.timestamp);

        let after = plan.settlement.after();
        let record = HarvestRecord {
            sequence,
            yield_amount: plan.yield_amount,
            fee_amount: plan.fee_amount,
            reinvested_amount: plan.reinvested_amount,
            total_assets_after: after.total_assets,
            total_supply: after.total_supply,
            timestamp: plan.timestamp,
        };

        info!(
            sequence,
            yield_amount = record.yield_amount,
            fee_amount = record.fee_amount,
            reinvested_amount = record.reinvested_amount,
            total_assets = record.total_assets_after,
            "harvest recorded"
        );
        Ok(record)
    }

    /// Plans, commits, and records a harvest directly against `ledger`,
    /// without any fee payout. For hosts that settle fees themselves.
    pub fn harvest(
        &mut self,
        reported: u64,
        now: DateTime<Utc>,
        ledger: &mut ShareLedger,
    ) -> Result<HarvestRecord, VaultError> {
        let plan = self.plan(reported, now, ledger)?;
        ledger.commit(&plan.settlement)?;
        self.finish(&plan)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
