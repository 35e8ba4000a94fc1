use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::FailurePolicy;
use crate::models::Sample;
use crate::{ExportError, Result};

/// Converts a Prometheus sample timestamp (float seconds) to the integer
/// millisecond key rows are indexed by.
pub fn timestamp_key(ts: f64) -> i64 {
    (ts * 1000.0).round() as i64
}

/// Samples of several series aligned on timestamp.
///
/// The first series fixes the set of rows. Every later column adds exactly
/// one cell to each row, so rows always have `labels().len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    labels: Vec<String>,
    rows: BTreeMap<i64, Vec<String>>,
}

impl ResultTable {
    pub fn seed(label: impl Into<String>, samples: &[Sample]) -> Self {
        let rows = samples
            .iter()
            .map(|(ts, value)| (timestamp_key(*ts), vec![value.clone()]))
            .collect();
        Self {
            labels: vec![label.into()],
            rows,
        }
    }

    /// Adds a column. Under `Strict` the series must cover exactly the seeded
    /// timestamps. Under `Lenient` uncovered rows get an empty cell and
    /// timestamps the first series never produced are ignored.
    pub fn append(
        &mut self,
        label: impl Into<String>,
        samples: &[Sample],
        policy: FailurePolicy,
    ) -> Result<()> {
        let label = label.into();
        let width = self.labels.len();
        let mut column: BTreeMap<i64, &str> = BTreeMap::new();

        for (ts, value) in samples {
            let key = timestamp_key(*ts);
            if !self.rows.contains_key(&key) {
                match policy {
                    FailurePolicy::Strict => {
                        return Err(ExportError::Misaligned {
                            label,
                            timestamp_ms: key,
                        })
                    }
                    FailurePolicy::Lenient => {
                        debug!("Ignoring unseeded timestamp {}ms for {}", key, label);
                        continue;
                    }
                }
            }
            column.insert(key, value.as_str());
        }

        if column.len() < self.rows.len() {
            if policy == FailurePolicy::Strict {
                let missing = self
                    .rows
                    .keys()
                    .find(|k| !column.contains_key(*k))
                    .copied()
                    .unwrap_or_default();
                return Err(ExportError::Misaligned {
                    label,
                    timestamp_ms: missing,
                });
            }
            warn!(
                "{} is missing {} of {} samples, leaving cells empty",
                label,
                self.rows.len() - column.len(),
                self.rows.len()
            );
        }

        for (key, row) in self.rows.iter_mut() {
            debug_assert_eq!(row.len(), width);
            row.push(column.get(key).map(|v| v.to_string()).unwrap_or_default());
        }
        self.labels.push(label);
        Ok(())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, timestamp_ms: i64) -> Option<&[String]> {
        self.rows.get(&timestamp_ms).map(|r| r.as_slice())
    }

    /// Rows newest first.
    pub fn rows_descending(&self) -> impl Iterator<Item = (i64, &[String])> + '_ {
        self.rows.iter().rev().map(|(k, v)| (*k, v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn samples(values: &[(f64, &str)]) -> Vec<Sample> {
        values.iter().map(|(t, v)| (*t, v.to_string())).collect()
    }

    #[test]
    fn test_seed_and_append() {
        let mut table = ResultTable::seed("a", &samples(&[(100.0, "a1"), (200.0, "a2"), (300.0, "a3")]));
        table
            .append("b", &samples(&[(100.0, "b1"), (200.0, "b2"), (300.0, "b3")]), FailurePolicy::Strict)
            .unwrap();

        assert_eq!(table.labels(), &["a", "b"]);
        assert_eq!(table.len(), 3);
        let keys: Vec<i64> = table.rows_descending().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![300_000, 200_000, 100_000]);
        assert_eq!(table.row(200_000).unwrap(), &["a2", "b2"]);
    }

    #[test]
    fn test_fractional_timestamps_align() {
        let mut table = ResultTable::seed("a", &samples(&[(1700000000.5, "1")]));
        table
            .append("b", &samples(&[(1700000000.5, "2")]), FailurePolicy::Strict)
            .unwrap();
        assert_eq!(table.row(1_700_000_000_500).unwrap(), &["1", "2"]);
    }

    #[test]
    fn test_strict_rejects_gaps_and_extras() {
        let mut table = ResultTable::seed("a", &samples(&[(100.0, "a1"), (200.0, "a2")]));

        let err = table
            .append("b", &samples(&[(100.0, "b1")]), FailurePolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, ExportError::Misaligned { timestamp_ms: 200_000, .. }));

        let err = table
            .append("c", &samples(&[(100.0, "c1"), (200.0, "c2"), (400.0, "c4")]), FailurePolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, ExportError::Misaligned { timestamp_ms: 400_000, .. }));

        // Failed appends leave the table untouched.
        assert_eq!(table.labels(), &["a"]);
        assert_eq!(table.row(100_000).unwrap(), &["a1"]);
    }

    #[test]
    fn test_lenient_fills_gaps() {
        let mut table = ResultTable::seed("a", &samples(&[(100.0, "a1"), (200.0, "a2")]));
        table
            .append("b", &samples(&[(200.0, "b2"), (900.0, "b9")]), FailurePolicy::Lenient)
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.row(100_000).unwrap(), &["a1", ""]);
        assert_eq!(table.row(200_000).unwrap(), &["a2", "b2"]);
    }
}
