//! # Share Ledger
//!
//! The [`ShareLedger`] owns the vault's totals and every holder position
//! and is the only thing allowed to change them. It knows nothing about
//! custody: it prices operations, validates them, and applies them. The
//! [`Vault`](crate::vault::Vault) wraps it with the asset movements.
//!
//! ## Rounding
//!
//! Rounding is always resolved against the caller:
//!
//! ```text
//! deposit   assets -> shares   floor   caller receives <= fair value
//! mint      shares -> assets   ceil    caller pays     >= fair value
//! withdraw  assets -> shares   ceil    caller burns    >= fair value
//! redeem    shares -> assets   floor   caller receives <= fair value
//! ```
//!
//! Each operation has a `preview_*` twin that calls the same pricing
//! function with the same rounding, so a preview and the operation that
//! follows it (at the same state) always agree.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::positions::HolderPositions;
use super::settlement::{Settlement, SettlementKind};
use super::state::{Totals, VaultState};
use crate::account::AccountId;
use crate::config::PRICE_SCALE;
use crate::error::VaultError;
use crate::guard::InflationGuard;
use crate::math::{checked_add, checked_sub, Rounding};

/// Totals, positions, and the pricing policy of one vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    state: VaultState,
    positions: HolderPositions,
    guard: InflationGuard,
}

impl ShareLedger {
    /// Creates an empty ledger priced by `guard`.
    ///
    /// Under the dead-share policy the sink is credited its shares here, so
    /// `total_supply` starts above zero.
    ///
    /// # Errors
    ///
    /// Propagates [`InflationGuard::validate`] failures.
    pub fn new(guard: InflationGuard) -> Result<Self, VaultError> {
        guard.validate()?;

        let mut state = VaultState::new(guard.decimals_offset());
        let mut positions = HolderPositions::new();

        let genesis = guard.genesis_shares();
        if genesis > 0 {
            positions.credit(&AccountId::dead_sink(), genesis)?;
            state.totals.total_supply = genesis;
        }

        Ok(Self {
            state,
            positions,
            guard,
        })
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Asset units attributed to the vault.
    pub fn total_assets(&self) -> u64 {
        self.state.total_assets()
    }

    /// Outstanding shares.
    pub fn total_supply(&self) -> u64 {
        self.state.total_supply()
    }

    /// Share balance of `owner`.
    pub fn balance_of(&self, owner: &AccountId) -> u64 {
        self.positions.balance_of(owner)
    }

    /// The scalar state.
    pub fn state(&self) -> &VaultState {
        &self.state
    }

    /// All holder positions.
    pub fn positions(&self) -> &HolderPositions {
        &self.positions
    }

    /// The pricing policy.
    pub fn guard(&self) -> &InflationGuard {
        &self.guard
    }

    /// Current mutation epoch.
    pub fn epoch(&self) -> u64 {
        self.state.epoch()
    }

    /// Assets → shares at the current price, rounded down.
    pub fn convert_to_shares(&self, assets: u64) -> Result<u64, VaultError> {
        self.to_shares(assets, Rounding::Floor)
    }

    /// Shares → assets at the current price, rounded down.
    pub fn convert_to_assets(&self, shares: u64) -> Result<u64, VaultError> {
        self.to_assets(shares, Rounding::Floor)
    }

    /// Assets per base share unit, scaled by [`PRICE_SCALE`] and rounded
    /// down. This is the quantity the price invariants are stated over.
    pub fn price_per_share(&self) -> Result<u128, VaultError> {
        let (assets, shares) = self
            .guard
            .effective_totals(self.total_assets(), self.total_supply())?;
        assets
            .checked_mul(PRICE_SCALE)
            .ok_or(VaultError::Overflow)?
            .checked_div(shares)
            .ok_or(VaultError::DivisionByZero)
    }

    // -----------------------------------------------------------------------
    // Previews
    // -----------------------------------------------------------------------

    /// Shares a deposit of `assets` would issue.
    pub fn preview_deposit(&self, assets: u64) -> Result<u64, VaultError> {
        self.to_shares(assets, Rounding::Floor)
    }

    /// Assets a mint of `shares` would charge.
    pub fn preview_mint(&self, shares: u64) -> Result<u64, VaultError> {
        self.to_assets(shares, Rounding::Ceil)
    }

    /// Shares a withdrawal of `assets` would burn.
    pub fn preview_withdraw(&self, assets: u64) -> Result<u64, VaultError> {
        self.to_shares(assets, Rounding::Ceil)
    }

    /// Assets a redemption of `shares` would pay out.
    pub fn preview_redeem(&self, shares: u64) -> Result<u64, VaultError> {
        self.to_assets(shares, Rounding::Floor)
    }

    // -----------------------------------------------------------------------
    // Plans (checks)
    // -----------------------------------------------------------------------

    /// Validates and prices a deposit of `assets` for `receiver`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroAmount`] if `assets == 0`.
    /// - [`VaultError::ZeroShares`] if the deposit rounds to zero shares.
    /// - [`VaultError::Overflow`] if a total would overflow.
    pub fn plan_deposit(&self, assets: u64, receiver: &AccountId) -> Result<Settlement, VaultError> {
        if assets == 0 {
            return Err(VaultError::ZeroAmount);
        }

        let shares = self.preview_deposit(assets)?;
        if shares == 0 {
            return Err(VaultError::ZeroShares { assets });
        }

        self.plan_inflow(SettlementKind::Deposit, assets, shares, receiver)
    }

    /// Validates and prices a mint of exactly `shares` for `receiver`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroAmount`] if `shares == 0`.
    /// - [`VaultError::ZeroAssets`] if the mint would cost nothing.
    /// - [`VaultError::Overflow`] if a total would overflow.
    pub fn plan_mint(&self, shares: u64, receiver: &AccountId) -> Result<Settlement, VaultError> {
        if shares == 0 {
            return Err(VaultError::ZeroAmount);
        }

        let assets = self.preview_mint(shares)?;
        if assets == 0 {
            return Err(VaultError::ZeroAssets { shares });
        }

        self.plan_inflow(SettlementKind::Mint, assets, shares, receiver)
    }

    /// Validates and prices a withdrawal of exactly `assets` from `owner`'s
    /// position, paid to `receiver`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroAmount`] if `assets == 0`.
    /// - [`VaultError::LockedShares`] if `owner` is the dead-share sink.
    /// - [`VaultError::InsufficientAssets`] if `assets > total_assets`.
    /// - [`VaultError::InsufficientShares`] if `owner` cannot cover the
    ///   rounded-up share cost.
    pub fn plan_withdraw(
        &self,
        assets: u64,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<Settlement, VaultError> {
        if assets == 0 {
            return Err(VaultError::ZeroAmount);
        }
        self.ensure_unlocked(owner)?;
        self.ensure_assets_available(assets)?;

        let shares = self.preview_withdraw(assets)?;
        self.ensure_balance(owner, shares)?;

        self.plan_outflow(SettlementKind::Withdraw, assets, shares, receiver, owner)
    }

    /// Validates and prices a redemption of exactly `shares` from `owner`'s
    /// position, paid to `receiver`. The payout may round down to zero for
    /// dust; that is accepted because the owner chose the share amount.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroAmount`] if `shares == 0`.
    /// - [`VaultError::LockedShares`] if `owner` is the dead-share sink.
    /// - [`VaultError::InsufficientShares`] if `owner` holds fewer shares.
    /// - [`VaultError::InsufficientAssets`] if the payout exceeds
    ///   `total_assets`.
    pub fn plan_redeem(
        &self,
        shares: u64,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<Settlement, VaultError> {
        if shares == 0 {
            return Err(VaultError::ZeroAmount);
        }
        self.ensure_unlocked(owner)?;
        self.ensure_balance(owner, shares)?;

        let assets = self.preview_redeem(shares)?;
        self.ensure_assets_available(assets)?;

        self.plan_outflow(SettlementKind::Redeem, assets, shares, receiver, owner)
    }

    /// Plans crediting `reinvested` assets of harvested yield.
    /// Supply is unchanged, so every share gains value pro rata.
    pub fn plan_yield(&self, reinvested: u64) -> Result<Settlement, VaultError> {
        let before = self.state.totals();
        let after = Totals {
            total_assets: checked_add(before.total_assets, reinvested)?,
            total_supply: before.total_supply,
        };
        Ok(self.settlement(SettlementKind::Yield, None, None, reinvested, 0, after))
    }

    /// Plans resetting `total_assets` to `custodial_balance`.
    pub fn plan_sync(&self, custodial_balance: u64) -> Result<Settlement, VaultError> {
        let before = self.state.totals();
        let delta = custodial_balance.abs_diff(before.total_assets);
        let after = Totals {
            total_assets: custodial_balance,
            total_supply: before.total_supply,
        };
        Ok(self.settlement(SettlementKind::Sync, None, None, delta, 0, after))
    }

    // -----------------------------------------------------------------------
    // Commit / rollback (effects)
    // -----------------------------------------------------------------------

    /// Applies a planned settlement.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::StaleSettlement`] if the ledger changed since
    /// the settlement was planned. Nothing is modified in that case.
    pub fn commit(&mut self, settlement: &Settlement) -> Result<(), VaultError> {
        let current = self.state.epoch();
        if current != settlement.epoch || self.state.totals() != settlement.before {
            return Err(VaultError::StaleSettlement {
                planned: settlement.epoch,
                current,
            });
        }
        let next_epoch = current.checked_add(1).ok_or(VaultError::Overflow)?;

        // Positions first: this is the only step that can still fail, and
        // nothing else has been touched yet if it does.
        if let Some(holder) = &settlement.holder {
            if settlement.kind.is_inflow() {
                self.positions.credit(holder, settlement.shares)?;
            } else if settlement.kind.is_outflow() {
                self.positions.debit(holder, settlement.shares)?;
            }
        }

        self.state.totals = settlement.after;
        self.state.epoch = next_epoch;

        debug!(
            kind = ?settlement.kind,
            assets = settlement.assets,
            shares = settlement.shares,
            total_assets = settlement.after.total_assets,
            total_supply = settlement.after.total_supply,
            epoch = next_epoch,
            "settlement committed"
        );
        Ok(())
    }

    /// Reverts the most recently committed settlement, restoring totals,
    /// positions, and the epoch exactly.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::StaleSettlement`] unless `settlement` is the
    /// last thing committed.
    pub fn rollback(&mut self, settlement: &Settlement) -> Result<(), VaultError> {
        let current = self.state.epoch();
        if current != settlement.epoch.wrapping_add(1) || self.state.totals() != settlement.after {
            return Err(VaultError::StaleSettlement {
                planned: settlement.epoch,
                current,
            });
        }

        if let Some(holder) = &settlement.holder {
            if settlement.kind.is_inflow() {
                self.positions.debit(holder, settlement.shares)?;
            } else if settlement.kind.is_outflow() {
                self.positions.credit(holder, settlement.shares)?;
            }
        }

        self.state.totals = settlement.before;
        self.state.epoch = settlement.epoch;

        debug!(kind = ?settlement.kind, epoch = settlement.epoch, "settlement rolled back");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Direct operations (no custody)
    // -----------------------------------------------------------------------

    /// Deposits `assets` for `receiver` and returns the shares issued.
    pub fn deposit(&mut self, assets: u64, receiver: &AccountId) -> Result<u64, VaultError> {
        let settlement = self.plan_deposit(assets, receiver)?;
        self.commit(&settlement)?;
        Ok(settlement.shares)
    }

    /// Mints exactly `shares` for `receiver` and returns the assets charged.
    pub fn mint(&mut self, shares: u64, receiver: &AccountId) -> Result<u64, VaultError> {
        let settlement = self.plan_mint(shares, receiver)?;
        self.commit(&settlement)?;
        Ok(settlement.assets)
    }

    /// Withdraws exactly `assets` from `owner` and returns the shares burned.
    pub fn withdraw(
        &mut self,
        assets: u64,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<u64, VaultError> {
        let settlement = self.plan_withdraw(assets, receiver, owner)?;
        self.commit(&settlement)?;
        Ok(settlement.shares)
    }

    /// Redeems exactly `shares` from `owner` and returns the assets owed.
    pub fn redeem(
        &mut self,
        shares: u64,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<u64, VaultError> {
        let settlement = self.plan_redeem(shares, receiver, owner)?;
        self.commit(&settlement)?;
        Ok(settlement.assets)
    }

    // -----------------------------------------------------------------------
    // Internal Helpers
    // -----------------------------------------------------------------------

    fn to_shares(&self, assets: u64, rounding: Rounding) -> Result<u64, VaultError> {
        self.guard
            .to_shares(assets, self.total_assets(), self.total_supply(), rounding)
    }

    fn to_assets(&self, shares: u64, rounding: Rounding) -> Result<u64, VaultError> {
        self.guard
            .to_assets(shares, self.total_assets(), self.total_supply(), rounding)
    }

    fn ensure_unlocked(&self, owner: &AccountId) -> Result<(), VaultError> {
        if owner.is_dead_sink() {
            return Err(VaultError::LockedShares(owner.clone()));
        }
        Ok(())
    }

    fn ensure_balance(&self, owner: &AccountId, shares: u64) -> Result<(), VaultError> {
        let available = self.balance_of(owner);
        if available < shares {
            return Err(VaultError::InsufficientShares {
                owner: owner.clone(),
                available,
                requested: shares,
            });
        }
        Ok(())
    }

    fn ensure_assets_available(&self, assets: u64) -> Result<(), VaultError> {
        let available = self.total_assets();
        if assets > available {
            return Err(VaultError::InsufficientAssets {
                available,
                requested: assets,
            });
        }
        Ok(())
    }

    fn plan_inflow(
        &self,
        kind: SettlementKind,
        assets: u64,
        shares: u64,
        receiver: &AccountId,
    ) -> Result<Settlement, VaultError> {
        let before = self.state.totals();
        let after = Totals {
            total_assets: checked_add(before.total_assets, assets)?,
            total_supply: checked_add(before.total_supply, shares)?,
        };
        Ok(self.settlement(kind, Some(receiver.clone()), None, assets, shares, after))
    }

    fn plan_outflow(
        &self,
        kind: SettlementKind,
        assets: u64,
        shares: u64,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<Settlement, VaultError> {
        let before = self.state.totals();
        let after = Totals {
            total_assets: checked_sub(before.total_assets, assets)?,
            total_supply: checked_sub(before.total_supply, shares)?,
        };
        Ok(self.settlement(
            kind,
            Some(owner.clone()),
            Some(receiver.clone()),
            assets,
            shares,
            after,
        ))
    }

    fn settlement(
        &self,
        kind: SettlementKind,
        holder: Option<AccountId>,
        receiver: Option<AccountId>,
        assets: u64,
        shares: u64,
        after: Totals,
    ) -> Settlement {
        let settlement = Settlement {
            kind,
            holder,
            receiver,
            assets,
            shares,
            epoch: self.state.epoch(),
            before: self.state.totals(),
            after,
        };
        debug!(
            kind = ?settlement.kind,
            assets,
            shares,
            epoch = settlement.epoch,
            "settlement planned"
        );
        settlement
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
