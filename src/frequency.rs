//! Frequency tables.
//!
//! Groups observations by distinct value and reports absolute, relative
//! and cumulative relative frequencies, in ascending value order.
//!
//! # Examples
//!
//! ```
//! use u_stats::frequency::FrequencyTable;
//!
//! let table = FrequencyTable::from_data(&[3.0, 1.0, 2.0, 1.0, 4.0]).unwrap();
//! assert_eq!(table.len(), 4);
//! assert_eq!(table.count_of(1.0), 2);
//! let last = table.entries().last().unwrap();
//! assert_eq!(last.cumulative, 1.0);
//! ```

use crate::error::{Result, StatsError};
use crate::stats;

/// One row of a [`FrequencyTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyEntry {
    /// The distinct observed value.
    pub value: f64,
    /// Number of occurrences.
    pub count: u64,
    /// `count / total`.
    pub relative: f64,
    /// Running sum of `relative` up to and including this row.
    pub cumulative: f64,
}

/// Distinct values of a dataset with their frequencies.
///
/// `-0.0` and `0.0` are counted as the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
    total: u64,
}

impl FrequencyTable {
    /// Builds the table from raw observations.
    ///
    /// Cumulative frequencies are computed from running counts, so the
    /// last row is exactly `1.0`.
    ///
    /// # Errors
    /// [`StatsError::InvalidParameters`] if `data` is empty or contains
    /// NaN.
    pub fn from_data(data: &[f64]) -> Result<Self> {
        if data.is_empty() {
            return Err(StatsError::invalid(
                "frequency table requires at least one value",
            ));
        }
        let sorted = stats::sorted_copy(data)
            .ok_or_else(|| StatsError::invalid("NaN cannot be tabulated"))?;

        let total = sorted.len() as u64;
        let n = total as f64;
        let mut entries = Vec::new();
        let mut running = 0_u64;

        for group in sorted.chunk_by(|a, b| stats::value_key(*a) == stats::value_key(*b)) {
            let count = group.len() as u64;
            running += count;
            entries.push(FrequencyEntry {
                value: if group[0] == 0.0 { 0.0 } else { group[0] },
                count,
                relative: count as f64 / n,
                cumulative: running as f64 / n,
            });
        }

        Ok(Self { entries, total })
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of observations.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Occurrences of `x`; `0` if it was never observed.
    pub fn count_of(&self, x: f64) -> u64 {
        let x = if x == 0.0 { 0.0 } else { x };
        self.entries
            .binary_search_by(|e| e.value.total_cmp(&x))
            .map_or(0, |i| self.entries[i].count)
    }

    /// Rows in ascending value order.
    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    /// Every value that attains the highest count, ascending.
    pub fn modes(&self) -> Vec<f64> {
        let top = self.entries.iter().map(|e| e.count).max().unwrap_or(0);
        self.entries
            .iter()
            .filter(|e| e.count == top)
            .map(|e| e.value)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn counts_sum_to_total(data in proptest::collection::vec(-20_i32..20, 1..200)) {
            let xs: Vec<f64> = data.iter().map(|&v| v as f64).collect();
            let table = FrequencyTable::from_data(&xs).unwrap();
            let sum: u64 = table.entries().iter().map(|e| e.count).sum();
            prop_assert_eq!(sum, xs.len() as u64);
            prop_assert_eq!(table.entries().last().unwrap().cumulative, 1.0);
            for w in table.entries().windows(2) {
                prop_assert!(w[0].value < w[1].value);
                prop_assert!(w[0].cumulative < w[1].cumulative);
            }
        }
    }
}
