//! # Holder Positions
//!
//! Per-account share balances. A [`HolderPositions`] maps [`AccountId`] to
//! a `u64` share count and enforces that no balance ever goes negative or
//! overflows. Entries are created on the first non-zero credit and removed
//! when a debit takes them to zero, so iteration only ever sees live
//! holders.
//!
//! Backed by a `BTreeMap` rather than a `HashMap` so that serialized
//! snapshots are byte-for-byte deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::error::VaultError;

/// Share balances indexed by holder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderPositions {
    positions: BTreeMap<AccountId, u64>,
}

impl HolderPositions {
    /// Creates an empty position table.
    pub fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
        }
    }

    /// Credits `shares` to `holder`, creating the entry if needed.
    ///
    /// Crediting zero is a no-op and does not create an entry.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the balance would exceed `u64::MAX`.
    pub fn credit(&mut self, holder: &AccountId, shares: u64) -> Result<u64, VaultError> {
        if shares == 0 {
            return Ok(self.balance_of(holder));
        }

        let current = self.balance_of(holder);
        let updated = current.checked_add(shares).ok_or(VaultError::Overflow)?;
        self.positions.insert(holder.clone(), updated);
        Ok(updated)
    }

    /// Debits `shares` from `holder`, removing the entry when it hits zero.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InsufficientShares`] if the holder has fewer
    /// than `shares`.
    pub fn debit(&mut self, holder: &AccountId, shares: u64) -> Result<u64, VaultError> {
        let current = self.balance_of(holder);
        if current < shares {
            return Err(VaultError::InsufficientShares {
                owner: holder.clone(),
                available: current,
                requested: shares,
            });
        }

        let remaining = current - shares;
        if remaining == 0 {
            self.positions.remove(holder);
        } else {
            self.positions.insert(holder.clone(), remaining);
        }
        Ok(remaining)
    }

    /// Share balance of `holder`; zero for unknown accounts.
    pub fn balance_of(&self, holder: &AccountId) -> u64 {
        self.positions.get(holder).copied().unwrap_or(0)
    }

    /// All live positions in account order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, u64)> {
        self.positions.iter().map(|(id, shares)| (id, *shares))
    }

    /// Sum of all balances, widened so the sum itself cannot overflow.
    pub fn sum(&self) -> u128 {
        self.positions.values().map(|s| *s as u128).sum()
    }

    /// Number of accounts with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no account holds shares.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::new("tessera:alice")
    }

    fn bob() -> AccountId {
        AccountId::new("tessera:bob")
    }

    #[test]
    fn credit_creates_new_entry() {
        let mut book = HolderPositions::new();
        assert_eq!(book.credit(&alice(), 1000).unwrap(), 1000);
        assert_eq!(book.balance_of(&alice()), 1000);
        assert_eq!(book.holder_count(), 1);
    }

    #[test]
    fn zero_credit_creates_nothing() {
        let mut book = HolderPositions::new();
        book.credit(&alice(), 0).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn credit_accumulates() {
        let mut book = HolderPositions::new();
        book.credit(&alice(), 500).unwrap();
        book.credit(&alice(), 300).unwrap();
        assert_eq!(book.balance_of(&alice()), 800);
    }

    #[test]
    fn credit_overflow_rejected() {
        let mut book = HolderPositions::new();
        book.credit(&alice(), u64::MAX).unwrap();
        assert!(matches!(book.credit(&alice(), 1), Err(VaultError::Overflow)));
        assert_eq!(book.balance_of(&alice()), u64::MAX);
    }

    #[test]
    fn debit_to_zero_removes_entry() {
        let mut book = HolderPositions::new();
        book.credit(&alice(), 500).unwrap();
        assert_eq!(book.debit(&alice(), 500).unwrap(), 0);
        assert!(book.is_empty());
        assert_eq!(book.balance_of(&alice()), 0);
    }

    #[test]
    fn debit_insufficient_rejected_without_change() {
        let mut book = HolderPositions::new();
        book.credit(&alice(), 100).unwrap();
        let err = book.debit(&alice(), 200).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InsufficientShares {
                available: 100,
                requested: 200,
                ..
            }
        ));
        assert_eq!(book.balance_of(&alice()), 100);
    }

    #[test]
    fn debit_unknown_holder_is_insufficient() {
        let mut book = HolderPositions::new();
        assert!(matches!(
            book.debit(&bob(), 1),
            Err(VaultError::InsufficientShares { available: 0, .. })
        ));
    }

    #[test]
    fn sum_and_iteration_order() {
        let mut book = HolderPositions::new();
        book.credit(&bob(), 2).unwrap();
        book.credit(&alice(), u64::MAX).unwrap();
        assert_eq!(book.sum(), u64::MAX as u128 + 2);

        let order: Vec<_> = book.iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(order, vec![alice(), bob()]);
    }
}
