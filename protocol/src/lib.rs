// Copyright (c) 2026 Tessera Contributors. MIT License.
// See LICENSE for details.

//! # Tessera: Tokenized-Vault Share Accounting
//!
//! Tessera converts between a pool's underlying asset balance and a fungible
//! share balance that represents proportional ownership of it. It is the
//! part of a vault where the money bugs live: rounding direction, empty-vault
//! bootstrap, overflow in `a * b / c`, first-depositor price inflation, and
//! fee bookkeeping that must never create or destroy value.
//!
//! ## Architecture
//!
//! Leaf first:
//!
//! - **math**: `mul_div` over a `u128` intermediate with explicit rounding.
//! - **guard**: inflation-attack mitigation (virtual offset or dead shares).
//! - **ledger**: totals, holder positions, plan/commit/rollback.
//! - **harvest**: fee split, cooldown, and yield reinvestment.
//! - **external**: traits for the custodian, the strategy, and the clock.
//! - **vault**: wires the above together in checks-effects-interactions
//!   order.
//! - **memory**: in-memory collaborators for tests and simulation.
//! - **config**: protocol constants and [`VaultConfig`].
//!
//! ## Ground Rules
//!
//! 1. Every amount is a `u64` in base units. No floating point anywhere.
//! 2. Rounding always goes against the caller and in favour of the vault.
//! 3. Every check runs before the first write; a failed call changes nothing.
//! 4. The core never moves tokens or reads the time itself.

pub mod account;
pub mod config;
pub mod error;
pub mod external;
pub mod guard;
pub mod harvest;
pub mod ledger;
pub mod math;
pub mod memory;
pub mod vault;

pub use account::AccountId;
pub use config::VaultConfig;
pub use error::VaultError;
pub use external::{AssetCustodian, Clock, CustodyError, StrategyError, SystemClock, YieldStrategy};
pub use guard::InflationGuard;
pub use harvest::{FeeConfig, HarvestAccountant, HarvestLog, HarvestRecord};
pub use ledger::{Settlement, SettlementKind, ShareLedger, Totals, VaultState};
pub use math::Rounding;
pub use vault::Vault;
