//! Which columns the summary is broken down by.
//!
//! Filtering a category column treats it, and every coarser column before
//! it, as resolved: the breakdown continues with the finer columns after the
//! last filtered one. The unit column is appended whenever the table has it.

use crate::filter::AppliedFilters;

/// Columns to group by, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupKey {
    columns: Vec<String>,
}

impl GroupKey {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_columns(self) -> Vec<String> {
        self.columns
    }
}

/// Derive the group key from the available category columns (priority order)
/// and the filters applied to them.
///
/// ```
/// use effortview::filter::AppliedFilters;
/// use effortview::grouping::derive_group_key;
///
/// let available: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
/// let key = derive_group_key(&available, &AppliedFilters::new(["A", "C"]), None);
/// assert_eq!(key.columns(), ["D"]);
/// ```
pub fn derive_group_key(
    available: &[String],
    applied: &AppliedFilters,
    unit_column: Option<&str>,
) -> GroupKey {
    let last_filtered = available.iter().rposition(|c| applied.contains(c));
    let mut columns: Vec<String> = match last_filtered {
        Some(idx) => available[idx + 1..].to_vec(),
        None => available.to_vec(),
    };
    if let Some(unit) = unit_column {
        if !columns.iter().any(|c| c == unit) {
            columns.push(unit.to_string());
        }
    }
    GroupKey { columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_filters_uses_all_available() {
        let available = cols(&["A", "B", "C", "D"]);
        let key = derive_group_key(&available, &AppliedFilters::default(), None);
        assert_eq!(key.columns(), available.as_slice());
    }

    #[test]
    fn test_last_filtered_column_truncates() {
        let available = cols(&["A", "B", "C", "D"]);
        let key = derive_group_key(&available, &AppliedFilters::new(["A", "C"]), None);
        assert_eq!(key.columns(), ["D"]);
    }

    #[test]
    fn test_single_coarse_filter_drops_only_that_level() {
        let available = cols(&["A", "B", "C"]);
        let key = derive_group_key(&available, &AppliedFilters::new(["A"]), Some("UNIT"));
        assert_eq!(key.columns(), ["B", "C", "UNIT"]);
    }

    #[test]
    fn test_unit_appended_when_all_filtered() {
        let available = cols(&["A", "B"]);
        let key = derive_group_key(&available, &AppliedFilters::new(["B"]), Some("UNIT"));
        assert_eq!(key.columns(), ["UNIT"]);
    }

    #[test]
    fn test_all_filtered_without_unit_is_empty() {
        let available = cols(&["A", "B"]);
        let key = derive_group_key(&available, &AppliedFilters::new(["A", "B"]), None);
        assert!(key.is_empty());
    }

    #[test]
    fn test_unit_not_duplicated() {
        let available = cols(&["A", "UNIT"]);
        let key = derive_group_key(&available, &AppliedFilters::default(), Some("UNIT"));
        assert_eq!(key.columns(), ["A", "UNIT"]);
    }

    #[test]
    fn test_applied_columns_outside_available_are_ignored() {
        let available = cols(&["A", "B"]);
        let key = derive_group_key(&available, &AppliedFilters::new(["Z"]), None);
        assert_eq!(key.columns(), ["A", "B"]);
    }

    #[test]
    fn test_no_categories_unit_only() {
        let key = derive_group_key(&[], &AppliedFilters::default(), Some("UNIT"));
        assert_eq!(key.into_columns(), vec!["UNIT".to_string()]);
    }
}
