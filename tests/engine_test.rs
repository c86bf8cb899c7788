mod common;

use common::{effort_table, floats, strings, two_row_table, BLANK, MEASURE, UNIT};
use effortview::aggregate::{total_measure, Aggregation};
use effortview::display::{sort_rows, SortDirection, SortSpec};
use effortview::{AnalysisRequest, ColumnSchema, Engine, FilterSelection};

fn analyze(table: &polars::prelude::DataFrame, selection: FilterSelection) -> effortview::AnalysisReport {
    Engine::new(ColumnSchema::default())
        .analyze(table, &AnalysisRequest::new(selection))
        .expect("analysis should succeed")
}

#[test]
fn test_two_rows_no_filters() {
    let report = analyze(&two_row_table(), FilterSelection::new());
    assert_eq!(report.key.columns(), ["USER_FIELD_01", UNIT]);
    assert_eq!(strings(&report.table.sorted, "USER_FIELD_01"), ["X", "Y"]);
    assert_eq!(floats(&report.table.sorted, MEASURE), [3.5, 1.5]);
    assert_eq!(report.total, 5.0);
    assert_eq!(report.filtered_rows, 2);
}

#[test]
fn test_two_rows_filtered_to_unit_only() {
    let report = analyze(&two_row_table(), FilterSelection::new().with("USER_FIELD_01", ["X"]));
    assert_eq!(report.key.columns(), [UNIT]);
    assert_eq!(report.table.height(), 1);
    assert_eq!(strings(&report.table.sorted, UNIT), ["h"]);
    assert_eq!(floats(&report.table.sorted, MEASURE), [3.5]);
    assert_eq!(report.filter_count, 1);
}

#[test]
fn test_adding_filters_never_adds_rows() {
    let table = effort_table();
    let steps = [
        FilterSelection::new(),
        FilterSelection::new().with("USER_FIELD_01", ["開発", BLANK]),
        FilterSelection::new()
            .with("USER_FIELD_01", ["開発", BLANK])
            .with("USER_FIELD_02", ["B社"]),
        FilterSelection::new()
            .with("USER_FIELD_01", ["開発", BLANK])
            .with("USER_FIELD_02", ["B社"])
            .with(UNIT, ["h"]),
        FilterSelection::new()
            .with("USER_FIELD_01", ["開発", BLANK])
            .with("USER_FIELD_02", ["B社"])
            .with(UNIT, ["h"])
            .with("業務内容1", ["設計"]),
    ];
    let mut previous = usize::MAX;
    for selection in steps {
        let rows = analyze(&table, selection.clone()).filtered_rows;
        assert!(rows <= previous, "{:?} grew the result to {}", selection, rows);
        previous = rows;
    }
    assert_eq!(previous, 1);
}

#[test]
fn test_missing_values_match_only_the_blank_label() {
    let table = effort_table();
    let without = analyze(&table, FilterSelection::new().with("USER_FIELD_02", ["A社", "B社"]));
    assert_eq!(without.filtered_rows, 5);
    let with = analyze(&table, FilterSelection::new().with("USER_FIELD_02", ["A社", "B社", BLANK]));
    assert_eq!(with.filtered_rows, 6);
    let only_blank = analyze(&table, FilterSelection::new().with("USER_FIELD_02", [BLANK]));
    assert_eq!(only_blank.filtered_rows, 1);
    assert_eq!(only_blank.total, 4.0);
}

#[test]
fn test_options_cascade_and_unit_comes_last() {
    let report = analyze(&effort_table(), FilterSelection::new().with("USER_FIELD_01", ["保守"]));
    let columns: Vec<&str> = report.options.iter().map(|o| o.column.as_str()).collect();
    assert_eq!(columns.last(), Some(&UNIT));
    let second = report
        .options
        .iter()
        .find(|o| o.column == "USER_FIELD_02")
        .unwrap();
    assert_eq!(second.options, ["A社", BLANK]);
    let unit = report.options.iter().find(|o| o.is_unit).unwrap();
    assert_eq!(unit.options, [BLANK, "d", "h"]);
}

#[test]
fn test_blank_groups_are_labelled() {
    let report = analyze(&effort_table(), FilterSelection::new());
    let first_level = strings(&report.table.sorted, "USER_FIELD_01");
    assert!(first_level.iter().any(|v| v == BLANK));
    assert!(first_level.iter().all(|v| !v.is_empty()));
}

#[test]
fn test_grouped_total_matches_filtered_total() {
    let table = effort_table();
    for selection in [
        FilterSelection::new(),
        FilterSelection::new().with("USER_FIELD_01", ["開発"]),
        FilterSelection::new().with("業務内容2", ["障害", BLANK]),
    ] {
        let report = analyze(&table, selection);
        let grouped = total_measure(report.aggregation.rows(), MEASURE).unwrap();
        assert!((grouped - report.total).abs() < 1e-9);
    }
}

#[test]
fn test_everything_filtered_without_unit_lists_rows() {
    let table = two_row_table().drop(UNIT).unwrap();
    let report = analyze(&table, FilterSelection::new().with("USER_FIELD_01", ["X", "Y"]));
    assert!(report.key.is_empty());
    match &report.aggregation {
        Aggregation::Ungrouped { total, rows } => {
            assert_eq!(*total, 5.0);
            assert_eq!(rows.height(), 2);
        }
        other => panic!("expected flat listing, got {:?}", other),
    }
}

#[test]
fn test_sort_round_trip_is_stable() {
    let report = analyze(&effort_table(), FilterSelection::new());
    let rows = report.aggregation.rows();
    let desc = SortSpec::new(MEASURE, SortDirection::Descending);
    let asc = SortSpec::new(MEASURE, SortDirection::Ascending);
    let first = sort_rows(rows, &desc).unwrap().rows;
    let back = sort_rows(&sort_rows(&first, &asc).unwrap().rows, &desc).unwrap().rows;
    assert_eq!(floats(&first, MEASURE), floats(&back, MEASURE));
    assert_eq!(strings(&first, "業務内容1"), strings(&back, "業務内容1"));
}

#[test]
fn test_chart_title_and_order() {
    let report = analyze(&effort_table(), FilterSelection::new());
    let chart = report.chart.unwrap();
    assert!(chart.title.contains(MEASURE));
    let values: Vec<f64> = chart.points.iter().map(|(_, v)| *v).collect();
    let mut ascending = values.clone();
    ascending.sort_by(f64::total_cmp);
    assert_eq!(values, ascending);
}
