//! Missing-value handling: the blank label shown in option lists and grouped
//! output, and the reverse mapping used when matching filter selections.

use polars::prelude::*;
use std::collections::HashSet;

/// How an option list ended up ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOrder {
    /// Lexicographic by label.
    Sorted,
    /// First-seen order; the column could not be read as comparable labels.
    Original,
}

/// String label of every cell in a column, `None` where the value is missing.
///
/// Values are labelled through a cast to String so mixed or numeric columns
/// compare by their text. Columns that cannot be cast fall back to the
/// per-cell display form and report [`OptionOrder::Original`].
pub fn cell_labels(column: &Column) -> (Vec<Option<String>>, OptionOrder) {
    let series = column.as_materialized_series();
    match series.cast(&DataType::String) {
        Ok(cast) => match cast.str() {
            Ok(ca) => {
                let labels = ca.into_iter().map(|v| v.map(str::to_string)).collect();
                (labels, OptionOrder::Sorted)
            }
            Err(_) => (display_labels(series), OptionOrder::Original),
        },
        Err(e) => {
            tracing::warn!(column = %series.name(), error = %e, "column not comparable as text; keeping original option order");
            (display_labels(series), OptionOrder::Original)
        }
    }
}

/// Display form of a single cell; `None` when the value is missing.
pub fn option_label(value: &AnyValue) -> Option<String> {
    match value {
        AnyValue::Null => None,
        v => Some(v.str_value().to_string()),
    }
}

fn display_labels(series: &Series) -> Vec<Option<String>> {
    (0..series.len())
        .map(|i| series.get(i).ok().and_then(|v| option_label(&v)))
        .collect()
}

/// Unique option labels for a column, missing values shown as `blank_label`.
///
/// Returns an empty list when the column is absent or has no rows.
pub fn column_options(df: &DataFrame, column: &str, blank_label: &str) -> Vec<String> {
    let Ok(col) = df.column(column) else {
        return Vec::new();
    };
    let (labels, order) = cell_labels(col);
    let mut seen = HashSet::new();
    let mut options = Vec::new();
    for label in labels {
        let label = label.unwrap_or_else(|| blank_label.to_string());
        if seen.insert(label.clone()) {
            options.push(label);
        }
    }
    if order == OptionOrder::Sorted {
        options.sort();
    }
    options
}

/// A filter selection with the blank label separated from concrete values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlankSplit {
    pub include_blank: bool,
    pub values: HashSet<String>,
}

impl BlankSplit {
    pub fn from_selection(selected: &[String], blank_label: &str) -> Self {
        let mut split = Self::default();
        for value in selected {
            if value == blank_label {
                split.include_blank = true;
            } else {
                split.values.insert(value.clone());
            }
        }
        split
    }

    /// Whether a cell with this label passes the filter. A missing cell passes
    /// only when blank was selected; a real value equal to the blank text does not.
    pub fn matches(&self, label: Option<&str>) -> bool {
        match label {
            Some(v) => self.values.contains(v),
            None => self.include_blank,
        }
    }
}

/// Replace missing values in `columns` with `blank_label`.
///
/// Only columns that actually contain nulls are rewritten (and become String
/// typed); the rest keep their type so numeric keys still sort numerically.
pub fn fill_blank_labels(
    df: DataFrame,
    columns: &[String],
    blank_label: &str,
) -> PolarsResult<DataFrame> {
    let exprs: Vec<Expr> = columns
        .iter()
        .filter_map(|name| df.column(name).ok())
        .filter(|c| c.null_count() > 0)
        .map(|c| {
            let name = c.name().as_str();
            col(name)
                .cast(DataType::String)
                .fill_null(lit(blank_label))
                .alias(name)
        })
        .collect();
    if exprs.is_empty() {
        return Ok(df);
    }
    df.lazy().with_columns(exprs).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BLANK_LABEL;

    #[test]
    fn test_options_sorted_with_blank() {
        let df = df!("c" => &[Some("b"), None, Some("a"), Some("b")]).unwrap();
        let opts = column_options(&df, "c", BLANK_LABEL);
        assert_eq!(opts, vec![BLANK_LABEL, "a", "b"]);
    }

    #[test]
    fn test_options_numeric_column_sorted_as_text() {
        let df = df!("n" => &[Some(10_i64), Some(9), None]).unwrap();
        let opts = column_options(&df, "n", "-");
        assert_eq!(opts, vec!["-", "10", "9"]);
    }

    #[test]
    fn test_option_label() {
        assert_eq!(option_label(&AnyValue::Null), None);
        assert_eq!(option_label(&AnyValue::Int64(7)), Some("7".to_string()));
        assert_eq!(option_label(&AnyValue::String("x")), Some("x".to_string()));
    }

    #[test]
    fn test_options_missing_column_is_empty() {
        let df = df!("c" => &["a"]).unwrap();
        assert!(column_options(&df, "missing", BLANK_LABEL).is_empty());
    }

    #[test]
    fn test_blank_split() {
        let selected = vec!["x".to_string(), BLANK_LABEL.to_string()];
        let split = BlankSplit::from_selection(&selected, BLANK_LABEL);
        assert!(split.include_blank);
        assert_eq!(split.values.len(), 1);
        assert!(split.matches(Some("x")));
        assert!(split.matches(None));
        assert!(!split.matches(Some("y")));
    }

    #[test]
    fn test_blank_label_text_is_not_a_real_value() {
        let selected = vec!["x".to_string()];
        let split = BlankSplit::from_selection(&selected, BLANK_LABEL);
        assert!(!split.matches(None));
        assert!(!split.matches(Some(BLANK_LABEL)));
    }

    #[test]
    fn test_fill_blank_labels_only_touches_null_columns() {
        let df = df!(
            "k" => &[Some("a"), None],
            "n" => &[1_i64, 2]
        )
        .unwrap();
        let out = fill_blank_labels(df, &["k".to_string(), "n".to_string()], BLANK_LABEL).unwrap();
        let k: Vec<Option<&str>> = out.column("k").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(k, vec![Some("a"), Some(BLANK_LABEL)]);
        assert_eq!(out.column("n").unwrap().dtype(), &DataType::Int64);
    }
}
