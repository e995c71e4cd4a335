//! # Harvest
//!
//! Realizes strategy yield into the vault: fee configuration, the
//! accountant that prices and records harvests, and an optional audit log.
//!
//! ```text
//! fees.rs        FeeConfig: rate, recipient, cooldown, fee/reinvest split
//! accountant.rs  HarvestAccountant: cooldown, plan, finish
//! log.rs         HarvestLog: caller-owned history with running totals
//! ```

pub mod accountant;
pub mod fees;
pub mod log;

pub use accountant::{HarvestAccountant, HarvestPlan, HarvestRecord};
pub use fees::FeeConfig;
pub use log::HarvestLog;
