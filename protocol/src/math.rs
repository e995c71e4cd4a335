//! # Scaled Arithmetic
//!
//! Every conversion between assets and shares in Tessera is a
//! multiply-then-divide: `value * numerator / denominator`. Done naively in
//! `u64` the product overflows long before the result would, and the
//! overflow either panics (debug) or silently wraps (release without
//! overflow checks). Neither is acceptable when the numbers are money.
//!
//! [`mul_div`] forms the product in a `u128` intermediate, which can hold
//! the product of any two `u64` values, and only then narrows the quotient
//! back to `u64`. The rounding direction is always explicit; callers pick
//! [`Rounding::Floor`] or [`Rounding::Ceil`] and the choice is visible at
//! every call site.

use serde::{Deserialize, Serialize};

use crate::config::BPS_DENOMINATOR;
use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Direction in which a non-exact quotient is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rounding {
    /// Round toward zero. The caller receives at most the fair value.
    Floor,
    /// Round away from zero. The caller pays at least the fair value.
    Ceil,
}

// ---------------------------------------------------------------------------
// mul_div
// ---------------------------------------------------------------------------

/// Computes `value * numerator / denominator` with explicit rounding.
///
/// The product is formed in `u128`, so it cannot overflow; only a quotient
/// that does not fit back into `u64` is rejected.
///
/// # Errors
///
/// - [`VaultError::DivisionByZero`] if `denominator == 0`.
/// - [`VaultError::Overflow`] if the rounded result exceeds `u64::MAX`.
pub fn mul_div(
    value: u64,
    numerator: u64,
    denominator: u64,
    rounding: Rounding,
) -> Result<u64, VaultError> {
    mul_div_wide(value as u128, numerator as u128, denominator as u128, rounding)
}

/// Same as [`mul_div`] for operands that are already widened.
///
/// Used by the inflation guard, whose virtual totals (`supply + 10^offset`)
/// can legitimately exceed `u64::MAX` even when the real totals do not.
/// Unlike the `u64` entry point, the product itself can overflow here, and
/// that is reported as [`VaultError::Overflow`].
pub fn mul_div_wide(
    value: u128,
    numerator: u128,
    denominator: u128,
    rounding: Rounding,
) -> Result<u64, VaultError> {
    if denominator == 0 {
        return Err(VaultError::DivisionByZero);
    }

    let product = value.checked_mul(numerator).ok_or(VaultError::Overflow)?;
    let quotient = product / denominator;
    let remainder = product % denominator;

    let result = match rounding {
        Rounding::Ceil if remainder != 0 => quotient + 1,
        _ => quotient,
    };

    u64::try_from(result).map_err(|_| VaultError::Overflow)
}

// ---------------------------------------------------------------------------
// Checked helpers
// ---------------------------------------------------------------------------

/// `a + b`, or [`VaultError::Overflow`].
pub fn checked_add(a: u64, b: u64) -> Result<u64, VaultError> {
    a.checked_add(b).ok_or(VaultError::Overflow)
}

/// `a - b`, or [`VaultError::Overflow`] on underflow.
///
/// Callers that can legitimately run short (a holder redeeming more than
/// they own) check the balance first and return a domain error; reaching
/// this error means an internal invariant is broken.
pub fn checked_sub(a: u64, b: u64) -> Result<u64, VaultError> {
    a.checked_sub(b).ok_or(VaultError::Overflow)
}

/// `10^exponent` as `u64`.
pub fn pow10(exponent: u8) -> Result<u64, VaultError> {
    10u64
        .checked_pow(exponent as u32)
        .ok_or(VaultError::Overflow)
}

/// The `bps` basis-point fraction of `amount`, rounded down.
///
/// `bps_of(1_000, 1_000) == 100`.
pub fn bps_of(amount: u64, bps: u16) -> Result<u64, VaultError> {
    mul_div(amount, bps as u64, BPS_DENOMINATOR, Rounding::Floor)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
