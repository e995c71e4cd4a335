//! # Protocol Configuration & Constants
//!
//! Every magic number in Tessera lives here, next to the [`VaultConfig`]
//! that a host deserializes to construct a vault. Changing a constant after
//! vaults are live changes the share price function for every holder, so
//! treat this file as part of the protocol, not as tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::guard::InflationGuard;
use crate::harvest::FeeConfig;

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// Basis-point denominator. 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Hard cap on the performance fee: 20% of harvested yield.
pub const MAX_PERFORMANCE_FEE_BPS: u16 = 2_000;

/// Performance fee applied when a config omits one: 10%.
pub const DEFAULT_PERFORMANCE_FEE_BPS: u16 = 1_000;

/// Fixed-point scale of [`ShareLedger::price_per_share`](crate::ledger::ShareLedger::price_per_share).
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Inflation Guard
// ---------------------------------------------------------------------------

/// Default decimals offset. The virtual share supply is `10^offset`, so 6
/// gives one million virtual shares against one virtual asset unit.
pub const DEFAULT_DECIMALS_OFFSET: u8 = 6;

/// Smallest decimals offset the virtual-offset policy accepts. Below
/// `10^6` virtual shares a donation can still take a sizeable cut of the
/// next deposit.
pub const MIN_DECIMALS_OFFSET: u8 = 6;

/// Largest accepted decimals offset. `10^12` virtual shares on top of a
/// `u64` supply still leaves the `u128` products comfortably in range.
pub const MAX_DECIMALS_OFFSET: u8 = 12;

/// Shares minted to the sink under the dead-share policy.
pub const DEFAULT_DEAD_SHARES: u64 = 1_000_000;

/// Address of the dead-share sink. Nothing can debit it.
pub const DEAD_SINK_ADDRESS: &str = "tessera:dead";

// ---------------------------------------------------------------------------
// Harvest Timing
// ---------------------------------------------------------------------------

/// Default minimum spacing between harvests.
pub const DEFAULT_HARVEST_COOLDOWN: Duration = Duration::from_secs(12 * 60 * 60);

/// Shortest accepted cooldown. Host clocks can drift or be nudged by whoever
/// produces them; below an hour that drift becomes a meaningful fraction of
/// the window.
pub const MIN_HARVEST_COOLDOWN: Duration = Duration::from_secs(60 * 60);

/// Longest accepted cooldown: 30 days.
pub const MAX_HARVEST_COOLDOWN: Duration = Duration::from_secs(30 * 24 * 60 * 60);

// ---------------------------------------------------------------------------
// VaultConfig
// ---------------------------------------------------------------------------

/// Everything needed to construct a vault, in a serde-friendly shape.
///
/// ```json
/// {
///   "guard": { "policy": "virtual_offset", "decimals_offset": 6 },
///   "fees": {
///     "performance_fee_bps": 1000,
///     "fee_recipient": "tessera:treasury",
///     "cooldown": { "secs": 43200, "nanos": 0 }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Inflation-attack mitigation and bootstrap scaling.
    #[serde(default)]
    pub guard: InflationGuard,
    /// Performance fee, recipient, and harvest cooldown.
    pub fees: FeeConfig,
}

impl VaultConfig {
    /// Builds a config with the default guard and the given fee settings.
    pub fn new(fees: FeeConfig) -> Self {
        Self {
            guard: InflationGuard::default(),
            fees,
        }
    }

    /// Validates every section. Deserialized configs bypass the checked
    /// constructors, so hosts must call this (vault construction does).
    pub fn validate(&self) -> Result<(), VaultError> {
        self.guard.validate()?;
        self.fees.validate()
    }
}
