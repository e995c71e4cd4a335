//! Deposit, mint, withdraw, and redeem.
//!
//! The unbounded forms delegate to the bounded ones with a bound that can
//! never trip. Bounds are checked against the planned settlement, before the
//! custodian is touched.

use tracing::{error, info, warn};

use super::Vault;
use crate::account::AccountId;
use crate::error::VaultError;
use crate::external::{AssetCustodian, Clock, YieldStrategy};
use crate::ledger::Settlement;

impl<C, S, K> Vault<C, S, K>
where
    C: AssetCustodian,
    S: YieldStrategy,
    K: Clock,
{
    // -----------------------------------------------------------------------
    // Inflows
    // -----------------------------------------------------------------------

    /// Pulls `assets` from `payer` and credits the resulting shares to
    /// `receiver`. Returns the shares issued.
    pub fn deposit(
        &mut self,
        payer: &AccountId,
        assets: u64,
        receiver: &AccountId,
    ) -> Result<u64, VaultError> {
        self.deposit_bounded(payer, assets, receiver, 0)
    }

    /// [`Vault::deposit`] that fails [`VaultError::SlippageExceeded`] if
    /// fewer than `min_shares_out` shares would be issued.
    pub fn deposit_bounded(
        &mut self,
        payer: &AccountId,
        assets: u64,
        receiver: &AccountId,
        min_shares_out: u64,
    ) -> Result<u64, VaultError> {
        self.ensure_active()?;
        ensure_receiver(receiver)?;
        let settlement = self.ledger.plan_deposit(assets, receiver)?;
        if settlement.shares() < min_shares_out {
            return Err(VaultError::SlippageExceeded {
                limit: min_shares_out,
                actual: settlement.shares(),
            });
        }

        self.settle_inflow(payer, &settlement)?;
        Ok(settlement.shares())
    }

    /// Credits exactly `shares` to `receiver`, pulling the rounded-up asset
    /// cost from `payer`. Returns the assets charged.
    pub fn mint(
        &mut self,
        payer: &AccountId,
        shares: u64,
        receiver: &AccountId,
    ) -> Result<u64, VaultError> {
        self.mint_bounded(payer, shares, receiver, u64::MAX)
    }

    /// [`Vault::mint`] that fails [`VaultError::SlippageExceeded`] if more
    /// than `max_assets_in` would be charged.
    pub fn mint_bounded(
        &mut self,
        payer: &AccountId,
        shares: u64,
        receiver: &AccountId,
        max_assets_in: u64,
    ) -> Result<u64, VaultError> {
        self.ensure_active()?;
        ensure_receiver(receiver)?;
        let settlement = self.ledger.plan_mint(shares, receiver)?;
        if settlement.assets() > max_assets_in {
            return Err(VaultError::SlippageExceeded {
                limit: max_assets_in,
                actual: settlement.assets(),
            });
        }

        self.settle_inflow(payer, &settlement)?;
        Ok(settlement.assets())
    }

    // -----------------------------------------------------------------------
    // Outflows
    // -----------------------------------------------------------------------

    /// Burns the rounded-up share cost of `assets` from `owner` and pays
    /// `assets` to `receiver`. Returns the shares burned.
    pub fn withdraw(
        &mut self,
        assets: u64,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<u64, VaultError> {
        self.withdraw_bounded(assets, receiver, owner, u64::MAX)
    }

    /// [`Vault::withdraw`] that fails [`VaultError::SlippageExceeded`] if
    /// more than `max_shares_in` shares would be burned.
    pub fn withdraw_bounded(
        &mut self,
        assets: u64,
        receiver: &AccountId,
        owner: &AccountId,
        max_shares_in: u64,
    ) -> Result<u64, VaultError> {
        self.ensure_active()?;
        ensure_receiver(receiver)?;
        let settlement = self.ledger.plan_withdraw(assets, receiver, owner)?;
        if settlement.shares() > max_shares_in {
            return Err(VaultError::SlippageExceeded {
                limit: max_shares_in,
                actual: settlement.shares(),
            });
        }

        self.settle_outflow(receiver, &settlement)?;
        Ok(settlement.shares())
    }

    /// Burns exactly `shares` from `owner` and pays the rounded-down asset
    /// value to `receiver`. Returns the assets paid, which may be zero for
    /// dust.
    pub fn redeem(
        &mut self,
        shares: u64,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<u64, VaultError> {
        self.redeem_bounded(shares, receiver, owner, 0)
    }

    /// [`Vault::redeem`] that fails [`VaultError::SlippageExceeded`] if
    /// fewer than `min_assets_out` assets would be paid.
    pub fn redeem_bounded(
        &mut self,
        shares: u64,
        receiver: &AccountId,
        owner: &AccountId,
        min_assets_out: u64,
    ) -> Result<u64, VaultError> {
        self.ensure_active()?;
        ensure_receiver(receiver)?;
        let settlement = self.ledger.plan_redeem(shares, receiver, owner)?;
        if settlement.assets() < min_assets_out {
            return Err(VaultError::SlippageExceeded {
                limit: min_assets_out,
                actual: settlement.assets(),
            });
        }

        self.settle_outflow(receiver, &settlement)?;
        Ok(settlement.assets())
    }

    // -----------------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------------

    fn settle_inflow(&mut self, payer: &AccountId, settlement: &Settlement) -> Result<(), VaultError> {
        self.custodian.pull_from(payer, settlement.assets())?;

        if let Err(err) = self.ledger.commit(settlement) {
            warn!(error = %err, %payer, assets = settlement.assets(), "commit failed after pull; refunding");
            return Err(self.refund(payer, settlement.assets(), err));
        }

        info!(
            kind = ?settlement.kind(),
            %payer,
            receiver = ?settlement.holder(),
            assets = settlement.assets(),
            shares = settlement.shares(),
            total_assets = self.ledger.total_assets(),
            total_supply = self.ledger.total_supply(),
            "inflow settled"
        );
        Ok(())
    }

    fn settle_outflow(&mut self, receiver: &AccountId, settlement: &Settlement) -> Result<(), VaultError> {
        self.ledger.commit(settlement)?;

        if settlement.assets() > 0 {
            if let Err(err) = self.custodian.push_to(receiver, settlement.assets()) {
                warn!(
                    error = %err,
                    %receiver,
                    assets = settlement.assets(),
                    "payout failed; rolling back"
                );
                self.ledger.rollback(settlement)?;
                return Err(err.into());
            }
        }

        info!(
            kind = ?settlement.kind(),
            owner = ?settlement.holder(),
            %receiver,
            assets = settlement.assets(),
            shares = settlement.shares(),
            total_assets = self.ledger.total_assets(),
            total_supply = self.ledger.total_supply(),
            "outflow settled"
        );
        Ok(())
    }

    /// Returns pulled assets to `payer` after `cause` stopped the commit.
    /// Yields the error the caller should see: `cause` itself, or
    /// [`VaultError::RefundFailed`] if the assets could not be returned.
    fn refund(&mut self, payer: &AccountId, assets: u64, cause: VaultError) -> VaultError {
        match self.custodian.push_to(payer, assets) {
            Ok(()) => cause,
            Err(refund) => {
                error!(error = %refund, %payer, assets, "refund failed; assets stranded in custody");
                VaultError::RefundFailed {
                    payer: payer.clone(),
                    assets,
                    cause: Box::new(cause),
                    refund,
                }
            }
        }
    }
}

fn ensure_receiver(receiver: &AccountId) -> Result<(), VaultError> {
    if receiver.is_null() {
        return Err(VaultError::InvalidRecipient(receiver.as_str().to_string()));
    }
    Ok(())
}
