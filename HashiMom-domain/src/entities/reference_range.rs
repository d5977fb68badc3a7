use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::gestation::Trimester;

/// Trimester-specific normal band for an analyte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    /// Uppercased analyte name
    pub analyte: String,
    pub trimester: Trimester,
    pub low: f64,
    pub high: f64,
    pub unit: String,
}

/// Anything that can answer a (analyte, trimester) range lookup
pub trait ReferenceRangeLookup {
    /// Find the range for an analyte. Implementations uppercase the analyte.
    fn lookup(&self, analyte: &str, trimester: Trimester) -> Option<&ReferenceRange>;
}

/// In-memory reference range table keyed by (analyte, trimester)
#[derive(Debug, Clone, Default)]
pub struct ReferenceRangeTable {
    ranges: HashMap<(String, Trimester), ReferenceRange>,
}

impl ReferenceRangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a range
    pub fn insert(&mut self, mut range: ReferenceRange) {
        range.analyte = range.analyte.to_uppercase();
        self.ranges.insert((range.analyte.clone(), range.trimester), range);
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl FromIterator<ReferenceRange> for ReferenceRangeTable {
    fn from_iter<I: IntoIterator<Item = ReferenceRange>>(iter: I) -> Self {
        let mut table = Self::new();
        for range in iter {
            table.insert(range);
        }
        table
    }
}

impl ReferenceRangeLookup for ReferenceRangeTable {
    fn lookup(&self, analyte: &str, trimester: Trimester) -> Option<&ReferenceRange> {
        self.ranges.get(&(analyte.to_uppercase(), trimester))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_uppercases_analyte() {
        let table: ReferenceRangeTable = vec![ReferenceRange {
            analyte: "tsh".to_string(),
            trimester: Trimester::T2,
            low: 0.2,
            high: 3.0,
            unit: "mIU/L".to_string(),
        }]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("Tsh", Trimester::T2).map(|r| r.high), Some(3.0));
        assert!(table.lookup("TSH", Trimester::T1).is_none());
    }
}
