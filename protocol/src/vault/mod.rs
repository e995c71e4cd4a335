//! # Vault
//!
//! The [`Vault`] is the surface a host calls. It owns a [`ShareLedger`], a
//! [`HarvestAccountant`], and the three external collaborators, and runs
//! every mutating call in the same order:
//!
//! ```text
//! inflow  (deposit, mint)      plan -> pull from payer -> commit
//! outflow (withdraw, redeem)   plan -> commit -> push to receiver
//! harvest                      plan -> commit -> push fee to recipient
//! ```
//!
//! Shares are only credited after the assets have arrived, and the ledger is
//! always debited before assets leave. If the outbound push fails, the
//! settlement is rolled back and the vault is exactly as it was before the
//! call. If a commit fails after a pull, the pulled assets are refunded.
//!
//! ## Module Layout
//!
//! ```text
//! mod.rs    construction, views, previews, limits, sync, pause, harvest
//! flows.rs  deposit, mint, withdraw, redeem and their bounded forms
//! ```

mod flows;

use tracing::{info, warn};

use crate::account::AccountId;
use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::external::{AssetCustodian, Clock, YieldStrategy};
use crate::harvest::{FeeConfig, HarvestAccountant, HarvestRecord};
use crate::ledger::ShareLedger;

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// A tokenized vault wired to its custodian, strategy, and clock.
///
/// Every mutating method takes `&mut self`, so a single owner can never
/// interleave two operations. Hosts that share a vault across threads wrap
/// it in a lock of their choosing.
#[derive(Debug)]
pub struct Vault<C, S, K> {
    ledger: ShareLedger,
    accountant: HarvestAccountant,
    custodian: C,
    strategy: S,
    clock: K,
    paused: bool,
}

impl<C, S, K> Vault<C, S, K>
where
    C: AssetCustodian,
    S: YieldStrategy,
    K: Clock,
{
    /// Builds an empty vault from a validated config.
    ///
    /// # Errors
    ///
    /// Propagates [`VaultConfig::validate`] failures.
    pub fn new(config: VaultConfig, custodian: C, strategy: S, clock: K) -> Result<Self, VaultError> {
        config.validate()?;
        let ledger = ShareLedger::new(config.guard)?;
        let accountant = HarvestAccountant::new(config.fees)?;

        info!(
            guard = ?ledger.guard(),
            fee_bps = accountant.fees().performance_fee_bps,
            fee_recipient = %accountant.fees().fee_recipient,
            cooldown_secs = accountant.fees().cooldown.as_secs(),
            "vault created"
        );

        Ok(Self {
            ledger,
            accountant,
            custodian,
            strategy,
            clock,
            paused: false,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The share ledger (read-only).
    pub fn ledger(&self) -> &ShareLedger {
        &self.ledger
    }

    /// The harvest accountant (read-only).
    pub fn accountant(&self) -> &HarvestAccountant {
        &self.accountant
    }

    /// The asset custodian.
    pub fn custodian(&self) -> &C {
        &self.custodian
    }

    /// The yield strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Mutable access to the strategy, e.g. to queue scripted reports.
    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// The clock harvest cooldowns are measured against.
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Whether mutating operations are currently refused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Asset units attributed to the vault.
    pub fn total_assets(&self) -> u64 {
        self.ledger.total_assets()
    }

    /// Outstanding shares, including any locked in the dead-share sink.
    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    /// Share balance of `owner`.
    pub fn balance_of(&self, owner: &AccountId) -> u64 {
        self.ledger.balance_of(owner)
    }

    /// Assets to shares at the current price, rounded down.
    pub fn convert_to_shares(&self, assets: u64) -> Result<u64, VaultError> {
        self.ledger.convert_to_shares(assets)
    }

    /// Shares to assets at the current price, rounded down.
    pub fn convert_to_assets(&self, shares: u64) -> Result<u64, VaultError> {
        self.ledger.convert_to_assets(shares)
    }

    /// See [`ShareLedger::price_per_share`].
    pub fn price_per_share(&self) -> Result<u128, VaultError> {
        self.ledger.price_per_share()
    }

    // -----------------------------------------------------------------------
    // Previews
    // -----------------------------------------------------------------------
    //
    // Previews are served while paused; they never touch a collaborator.

    /// Shares [`Vault::deposit`] would issue for `assets`.
    pub fn preview_deposit(&self, assets: u64) -> Result<u64, VaultError> {
        self.ledger.preview_deposit(assets)
    }

    /// Assets [`Vault::mint`] would charge for `shares`.
    pub fn preview_mint(&self, shares: u64) -> Result<u64, VaultError> {
        self.ledger.preview_mint(shares)
    }

    /// Shares [`Vault::withdraw`] would burn for `assets`.
    pub fn preview_withdraw(&self, assets: u64) -> Result<u64, VaultError> {
        self.ledger.preview_withdraw(assets)
    }

    /// Assets [`Vault::redeem`] would pay for `shares`.
    pub fn preview_redeem(&self, shares: u64) -> Result<u64, VaultError> {
        self.ledger.preview_redeem(shares)
    }

    // -----------------------------------------------------------------------
    // Limits
    // -----------------------------------------------------------------------

    /// Largest deposit that cannot overflow either total. Zero while paused.
    pub fn max_deposit(&self) -> u64 {
        if self.paused {
            return 0;
        }
        let asset_room = u64::MAX - self.total_assets();
        let share_room = u64::MAX - self.total_supply();
        let by_shares = self.ledger.convert_to_assets(share_room).unwrap_or(u64::MAX);
        asset_room.min(by_shares)
    }

    /// Largest mint that cannot overflow either total. Zero while paused
    /// and while the vault is insolvent.
    pub fn max_mint(&self) -> u64 {
        if self.paused {
            return 0;
        }
        let asset_room = u64::MAX - self.total_assets();
        let share_room = u64::MAX - self.total_supply();
        let by_assets = match self.ledger.convert_to_shares(asset_room) {
            Ok(shares) => shares,
            Err(VaultError::Overflow) => u64::MAX,
            Err(_) => return 0,
        };
        share_room.min(by_assets)
    }

    /// Assets `owner` can withdraw right now. Zero while paused and for the
    /// dead-share sink.
    pub fn max_withdraw(&self, owner: &AccountId) -> Result<u64, VaultError> {
        if self.paused || owner.is_dead_sink() {
            return Ok(0);
        }
        let value = self.ledger.convert_to_assets(self.balance_of(owner))?;
        Ok(value.min(self.total_assets()))
    }

    /// Shares `owner` can redeem right now. Zero while paused and for the
    /// dead-share sink.
    pub fn max_redeem(&self, owner: &AccountId) -> u64 {
        if self.paused || owner.is_dead_sink() {
            return 0;
        }
        self.balance_of(owner)
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    /// Stops every mutating operation until [`Vault::unpause`].
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            warn!(total_assets = self.total_assets(), "vault paused");
        }
    }

    /// Resumes mutating operations.
    pub fn unpause(&mut self) {
        if self.paused {
            self.paused = false;
            info!("vault unpaused");
        }
    }

    /// Replaces the fee configuration. Allowed while paused.
    pub fn update_fee_config(&mut self, fees: FeeConfig) -> Result<(), VaultError> {
        let previous_bps = self.accountant.fees().performance_fee_bps;
        self.accountant.set_fees(fees)?;
        info!(
            previous_bps,
            fee_bps = self.accountant.fees().performance_fee_bps,
            fee_recipient = %self.accountant.fees().fee_recipient,
            "fee config updated"
        );
        Ok(())
    }

    /// Sets `total_assets` to the custodian's balance and returns the new
    /// value. This is how direct transfers into custody become part of the
    /// share price; it can also recognize a loss.
    pub fn sync(&mut self) -> Result<u64, VaultError> {
        self.ensure_active()?;
        let previous = self.total_assets();
        let balance = self.custodian.vault_balance();
        let settlement = self.ledger.plan_sync(balance)?;
        self.ledger.commit(&settlement)?;

        if balance < previous {
            warn!(previous, total_assets = balance, delta = settlement.assets(), "sync recognized a loss");
        } else {
            info!(previous, total_assets = balance, delta = settlement.assets(), "vault synced");
        }
        Ok(balance)
    }

    // -----------------------------------------------------------------------
    // Harvest
    // -----------------------------------------------------------------------

    /// Asks the strategy for yield, reinvests it, and pays the performance
    /// fee.
    ///
    /// The cooldown is checked before the strategy is called, so a rejected
    /// harvest consumes no report. Once the strategy has reported, its yield
    /// is in custody: if the harvest then fails, that yield stays in custody
    /// unrealized until the next [`Vault::sync`].
    ///
    /// # Errors
    ///
    /// - [`VaultError::Paused`], [`VaultError::CooldownActive`],
    ///   [`VaultError::NoYield`].
    /// - [`VaultError::Strategy`] if the strategy fails to report.
    /// - [`VaultError::Custody`] if the fee payout fails; the harvest is
    ///   rolled back.
    pub fn harvest(&mut self) -> Result<HarvestRecord, VaultError> {
        self.ensure_active()?;
        let now = self.clock.now();
        if let Err(err) = self.accountant.ensure_ready(now) {
            warn!(error = %err, "harvest rejected");
            return Err(err);
        }

        let reported = self.strategy.report_yield()?;
        let plan = self.accountant.plan(reported, now, &self.ledger)?;
        self.ledger.commit(plan.settlement())?;

        let mut accountant = self.accountant.clone();
        let record = match accountant.finish(&plan) {
            Ok(record) => record,
            Err(err) => {
                self.ledger.rollback(plan.settlement())?;
                return Err(err);
            }
        };

        if plan.fee_amount() > 0 {
            let recipient = accountant.fees().fee_recipient.clone();
            if let Err(err) = self.custodian.push_to(&recipient, plan.fee_amount()) {
                warn!(
                    error = %err,
                    fee_amount = plan.fee_amount(),
                    %recipient,
                    "fee payout failed; rolling back harvest"
                );
                self.ledger.rollback(plan.settlement())?;
                return Err(err.into());
            }
        }

        self.accountant = accountant;
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // Internal Helpers
    // -----------------------------------------------------------------------

    fn ensure_active(&self) -> Result<(), VaultError> {
        if self.paused {
            return Err(VaultError::Paused);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
