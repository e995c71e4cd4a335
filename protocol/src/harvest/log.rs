//! Caller-owned audit trail of harvests.

use serde::{Deserialize, Serialize};

use super::accountant::HarvestRecord;

/// Append-only list of [`HarvestRecord`]s with running totals.
///
/// The accountant keeps no history; hosts that want one push every record
/// they get back from a harvest into a `HarvestLog`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestLog {
    records: Vec<HarvestRecord>,
    total_yield: u128,
    total_fees: u128,
    total_reinvested: u128,
}

impl HarvestLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and updates the totals.
    pub fn append(&mut self, record: HarvestRecord) {
        self.total_yield += record.yield_amount as u128;
        self.total_fees += record.fee_amount as u128;
        self.total_reinvested += record.reinvested_amount as u128;
        self.records.push(record);
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[HarvestRecord] {
        &self.records
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&HarvestRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of reported yield.
    pub fn total_yield(&self) -> u128 {
        self.total_yield
    }

    /// Sum of fees paid.
    pub fn total_fees(&self) -> u128 {
        self.total_fees
    }

    /// Sum of yield reinvested.
    pub fn total_reinvested(&self) -> u128 {
        self.total_reinvested
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(sequence: u64, yield_amount: u64, fee_amount: u64) -> HarvestRecord {
        HarvestRecord {
            sequence,
            yield_amount,
            fee_amount,
            reinvested_amount: yield_amount - fee_amount,
            total_assets_after: 0,
            total_supply: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn totals_accumulate() {
        let mut log = HarvestLog::new();
        assert!(log.is_empty());
        log.append(record(1, 1_000, 100));
        log.append(record(2, 500, 50));

        assert_eq!(log.len(), 2);
        assert_eq!(log.total_yield(), 1_500);
        assert_eq!(log.total_fees(), 150);
        assert_eq!(log.total_reinvested(), 1_350);
        assert_eq!(log.total_fees() + log.total_reinvested(), log.total_yield());
        assert_eq!(log.last().map(|r| r.sequence), Some(2));
    }

    #[test]
    fn totals_do_not_overflow_u64() {
        let mut log = HarvestLog::new();
        log.append(record(1, u64::MAX, 0));
        log.append(record(2, u64::MAX, 0));
        assert_eq!(log.total_yield(), 2 * u64::MAX as u128);
    }
}
