//! Error types for the vault accounting core.
//!
//! Every fallible operation in the crate returns a [`VaultError`]. The
//! variants are grouped by the question a caller has to answer next:
//! "change the request" (zero amounts, short balances, slippage), "try
//! later" (cooldown, pause), or "this is a bug" (stale settlement).
//! Arithmetic failures are never recovered: an overflow aborts the whole
//! operation before anything is written.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::account::AccountId;
use crate::external::{CustodyError, StrategyError};

/// Errors returned by ledger, harvest, and vault operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    // --- Request validation ---
    /// A positive amount was required.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// Rounding collapsed a deposit to zero shares. Accepting it would
    /// silently donate the assets to existing holders.
    #[error("deposit of {assets} assets converts to zero shares")]
    ZeroShares {
        /// The assets the caller tried to deposit.
        assets: u64,
    },

    /// Rounding collapsed a mint to zero assets.
    #[error("mint of {shares} shares converts to zero assets")]
    ZeroAssets {
        /// The shares the caller tried to mint.
        shares: u64,
    },

    /// The owner does not hold enough shares.
    #[error("insufficient shares for {owner}: available {available}, requested {requested}")]
    InsufficientShares {
        /// The account being debited.
        owner: AccountId,
        /// The owner's current share balance.
        available: u64,
        /// The share amount the operation needs.
        requested: u64,
    },

    /// The vault does not attribute enough assets to honour the request.
    #[error("insufficient assets in vault: available {available}, requested {requested}")]
    InsufficientAssets {
        /// `total_assets` at the time of the call.
        available: u64,
        /// The asset amount requested.
        requested: u64,
    },

    /// The computed amount crossed the caller's slippage bound.
    #[error("slippage exceeded: computed {actual}, limit {limit}")]
    SlippageExceeded {
        /// The caller's bound (a minimum out or a maximum in).
        limit: u64,
        /// The amount the operation would have produced or charged.
        actual: u64,
    },

    /// Shares held by the dead-share sink can never leave it.
    #[error("shares held by {0} are locked")]
    LockedShares(AccountId),

    // --- Arithmetic ---
    /// A result does not fit the integer type. Never wrapped, never clamped.
    #[error("arithmetic overflow")]
    Overflow,

    /// A conversion tried to divide by zero.
    #[error("division by zero")]
    DivisionByZero,

    // --- Harvest ---
    /// The harvest cooldown has not elapsed yet.
    #[error("harvest cooling down until {ready_at}")]
    CooldownActive {
        /// Earliest instant at which the next harvest is accepted.
        ready_at: DateTime<Utc>,
    },

    /// The strategy reported no yield.
    #[error("strategy reported no yield")]
    NoYield,

    // --- Configuration ---
    /// Performance fee above the protocol cap.
    #[error("performance fee {fee_bps} bps exceeds maximum {max_bps} bps")]
    FeeTooHigh {
        /// Requested fee.
        fee_bps: u16,
        /// Protocol cap.
        max_bps: u16,
    },

    /// Fee recipient is empty or otherwise unusable.
    #[error("invalid fee recipient: {0:?}")]
    InvalidRecipient(String),

    /// Harvest cooldown outside the range the clock can be trusted for.
    #[error("harvest cooldown of {secs}s outside allowed range [{min_secs}s, {max_secs}s]")]
    CooldownOutOfRange {
        /// Requested cooldown.
        secs: u64,
        /// Minimum accepted cooldown.
        min_secs: u64,
        /// Maximum accepted cooldown.
        max_secs: u64,
    },

    /// Decimals offset outside the range the policy supports.
    #[error("decimals offset {offset} outside allowed range [{min}, {max}]")]
    InvalidDecimalsOffset {
        /// Requested offset.
        offset: u8,
        /// Smallest accepted offset for the policy.
        min: u8,
        /// Supported maximum.
        max: u8,
    },

    /// The dead-share policy needs a non-zero share amount.
    #[error("dead-share policy requires a non-zero share amount")]
    InvalidDeadShares,

    // --- State ---
    /// The vault is paused; only previews and views are served.
    #[error("vault is paused")]
    Paused,

    /// A settlement was committed against a ledger that changed after it was
    /// planned. Indicates an interleaved mutation (reentrancy) in the host.
    #[error("stale settlement: planned at epoch {planned}, ledger at epoch {current}")]
    StaleSettlement {
        /// Epoch recorded when the settlement was planned.
        planned: u64,
        /// Epoch of the ledger at commit time.
        current: u64,
    },

    /// Shares are outstanding but the vault holds no assets, so no price
    /// exists for new shares. A [`sync`](crate::vault::Vault::sync) that
    /// recognizes assets again lifts this.
    #[error("vault holds no assets against {total_supply} outstanding shares")]
    Insolvent {
        /// Outstanding shares at the time of the call.
        total_supply: u64,
    },

    // --- Collaborators ---
    /// The asset custodian refused or failed a transfer.
    #[error("custody error: {0}")]
    Custody(#[from] CustodyError),

    /// The yield strategy failed to report.
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),

    /// A commit failed after the payer's assets were pulled, and returning
    /// them failed too. The assets sit in custody with no shares issued
    /// against them until the host reconciles.
    #[error("refund of {assets} to {payer} failed ({refund}) after: {cause}")]
    RefundFailed {
        /// Account the assets were pulled from.
        payer: AccountId,
        /// Assets stranded in custody.
        assets: u64,
        /// Why the commit failed.
        cause: Box<VaultError>,
        /// Why the refund failed.
        refund: CustodyError,
    },
}

impl VaultError {
    /// Returns `true` if resubmitting the same request later may succeed
    /// without any change on the caller's side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VaultError::CooldownActive { .. } | VaultError::Paused | VaultError::Strategy(_)
        )
    }

    /// Returns `true` for failures that indicate a broken invariant rather
    /// than a bad request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            VaultError::StaleSettlement { .. } | VaultError::RefundFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(VaultError::Paused.is_retryable());
        assert!(VaultError::CooldownActive { ready_at: Utc::now() }.is_retryable());
        assert!(!VaultError::ZeroAmount.is_retryable());
        assert!(!VaultError::Overflow.is_retryable());
    }

    #[test]
    fn stale_settlement_is_internal() {
        let err = VaultError::StaleSettlement { planned: 3, current: 4 };
        assert!(err.is_internal());
        assert!(!err.is_retryable());
        assert!(!VaultError::NoYield.is_internal());
    }

    #[test]
    fn messages_carry_amounts() {
        let err = VaultError::InsufficientShares {
            owner: AccountId::new("alice"),
            available: 10,
            requested: 25,
        };
        let msg = err.to_string();
        assert!(msg.contains("alice"));
        assert!(msg.contains("10"));
        assert!(msg.contains("25"));
    }

    #[test]
    fn refund_failure_is_internal_and_names_payer() {
        let err = VaultError::RefundFailed {
            payer: AccountId::new("carol"),
            assets: 77,
            cause: Box::new(VaultError::StaleSettlement { planned: 1, current: 2 }),
            refund: CustodyError::Rejected("frozen".into()),
        };
        assert!(err.is_internal());
        assert!(!err.is_retryable());
        let msg = err.to_string();
        assert!(msg.contains("carol"));
        assert!(msg.contains("77"));
        assert!(msg.contains("frozen"));
    }

    #[test]
    fn custody_errors_convert() {
        let err: VaultError = CustodyError::InsufficientAllowance {
            owner: AccountId::new("bob"),
            allowance: 1,
            requested: 2,
        }
        .into();
        assert!(matches!(err, VaultError::Custody(_)));
    }
}
