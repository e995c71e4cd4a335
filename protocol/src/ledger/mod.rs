//! # Share Ledger
//!
//! Bookkeeping for one vault: the two totals, every holder's share balance,
//! and the plan/commit/rollback cycle that changes them.
//!
//! - [`state`]: [`VaultState`] and [`Totals`].
//! - [`positions`]: per-holder share balances.
//! - [`settlement`]: validated, priced, not-yet-applied mutations.
//! - [`share_ledger`]: the [`ShareLedger`] that ties them together.

pub mod positions;
pub mod settlement;
pub mod share_ledger;
pub mod state;

pub use positions::HolderPositions;
pub use settlement::{Settlement, SettlementKind};
pub use share_ledger::ShareLedger;
pub use state::{Totals, VaultState};
