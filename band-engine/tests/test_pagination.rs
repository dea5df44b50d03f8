//! FILENAME: band-engine/tests/test_pagination.rs
//! PURPOSE: Page and column breaks driven by the oracle and by band settings.

mod common;

use band_engine::report_model::{
    AggregationKind, Band, BandSettings, BandType, ExpressionRef, Record, ReportDefinition, Value,
    VariableDefinition, VariableScope,
};
use band_engine::{AlwaysFits, BandInstance, EngineOptions, FieldEvaluator, NoChildRows, RunConfig, SpaceHint};
use common::*;

fn reprinting_report(reprint: bool) -> ReportDefinition {
    ReportDefinition::new("paged")
        .with_group("region", ExpressionRef::new("region"))
        .with_band(Band::group_header(0).with_settings(BandSettings {
            reprint_on_page_break: reprint,
            ..BandSettings::default()
        }))
        .with_band(Band::detail(0))
        .with_band(Band::group_footer(0))
        .with_variable(
            VariableDefinition::new("total", VariableScope::Group(0), AggregationKind::Sum)
                .with_expression(ExpressionRef::new("amt")),
        )
        .with_variable(VariableDefinition::new("page_rows", VariableScope::Page, AggregationKind::Count))
}

fn east_records() -> Vec<Record> {
    (1..=4)
        .map(|i| Record::new().with("region", "E").with("amt", i as f64))
        .collect()
}

// ============================================================================
// ORACLE DRIVEN BREAKS
// ============================================================================

#[test]
fn test_refused_detail_moves_to_next_page_with_reprint() {
    let definition = reprinting_report(true);
    let mut oracle = ScriptedOracle::new().refuse(BandType::Detail, 3);
    let (events, summary) = collect(
        &definition,
        east_records(),
        &NoChildRows,
        &FieldEvaluator,
        &mut oracle,
        RunConfig::default(),
    );

    assert_eq!(
        describe(&events, "amt"),
        vec![
            "PageHeader",
            "ColumnHeader",
            "GroupHeader(0)[E]",
            "Detail(0)[1]",
            "Detail(0)[2]",
            "ColumnFooter",
            "PageFooter",
            "PageHeader",
            "ColumnHeader",
            "GroupHeader(0)[E]*",
            "Detail(0)[3]",
            "Detail(0)[4]",
            "GroupFooter(0)[E]",
            "ColumnFooter",
            "PageFooter",
        ]
    );

    let pages: Vec<u32> = events.iter().map(|e| e.band.page).collect();
    assert_eq!(pages, vec![1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2]);
    assert_eq!(summary.pages, 2);

    // Page-scoped count closes with each page; the group total spans both
    assert_eq!(events[6].variable("page_rows"), Some(&Value::Number(2.0)));
    assert_eq!(events[14].variable("page_rows"), Some(&Value::Number(2.0)));
    assert_eq!(events[12].variable("total"), Some(&Value::Number(10.0)));

    // The reprint shows the record that opened the group
    assert_eq!(events[9].field("amt"), Some(&Value::Number(1.0)));
}

#[test]
fn test_no_reprint_without_flag() {
    let definition = reprinting_report(false);
    let mut oracle = ScriptedOracle::new().refuse(BandType::Detail, 3);
    let (events, _) = collect(
        &definition,
        east_records(),
        &NoChildRows,
        &FieldEvaluator,
        &mut oracle,
        RunConfig::default(),
    );

    let labels = labels(&events);
    assert_eq!(labels[7..10], ["PageHeader", "ColumnHeader", "Detail(0)"]);
    assert!(events.iter().all(|e| !e.band.reprinted));
}

#[test]
fn test_oracle_is_asked_only_about_content_bands() {
    let definition = reprinting_report(true)
        .with_band(Band::title())
        .with_band(Band::summary());
    let mut oracle = ScriptedOracle::new().refuse(BandType::Detail, 2);
    collect(
        &definition,
        east_records(),
        &NoChildRows,
        &FieldEvaluator,
        &mut oracle,
        RunConfig::default(),
    );

    let asked: Vec<String> = oracle.asked.iter().map(|b| b.kind.to_string()).collect();
    assert_eq!(
        asked,
        vec!["Title", "GroupHeader(0)", "Detail(0)", "Detail(0)", "Detail(0)", "Detail(0)", "GroupFooter(0)"]
    );
    // The deferred band was asked once, on the page it did not fit
    assert_eq!(oracle.asked[3].page, 1);
    assert_eq!(oracle.asked[4].page, 2);
}

#[test]
fn test_band_too_large_for_any_page_is_emitted_anyway() {
    let definition = ReportDefinition::new("huge").with_band(Band::detail(0));
    let mut never = |_: &BandInstance, _: &SpaceHint| false;
    let (events, summary) = collect(
        &definition,
        vec![Record::new(), Record::new(), Record::new()],
        &NoChildRows,
        &FieldEvaluator,
        &mut never,
        RunConfig::default(),
    );

    let detail_pages: Vec<u32> = events
        .iter()
        .filter(|e| e.band_type() == BandType::Detail)
        .map(|e| e.band.page)
        .collect();
    assert_eq!(detail_pages, vec![1, 2, 3]);
    assert_eq!(summary.pages, 3);
    assert!(summary.completed);
}

#[test]
fn test_pagination_can_be_switched_off() {
    let definition = reprinting_report(true);
    let mut oracle = ScriptedOracle::new().refuse(BandType::Detail, 1);
    let options = EngineOptions {
        honor_pagination: false,
        ..EngineOptions::default()
    };
    let (events, summary) = collect(
        &definition,
        east_records(),
        &NoChildRows,
        &FieldEvaluator,
        &mut oracle,
        RunConfig::default().with_options(options),
    );

    assert!(oracle.asked.is_empty());
    assert_eq!(summary.pages, 1);
    assert_eq!(events.len(), 10);
}

#[test]
fn test_space_hint_carries_band_settings() {
    let definition = ReportDefinition::new("hint").with_band(Band::detail(0).with_settings(BandSettings {
        min_distance_from_bottom: 42.0,
        ..BandSettings::default()
    }));
    let mut hints = Vec::new();
    let mut oracle = |_: &BandInstance, hint: &SpaceHint| {
        hints.push(hint.clone());
        true
    };
    collect(
        &definition,
        vec![Record::new()],
        &NoChildRows,
        &FieldEvaluator,
        &mut oracle,
        RunConfig::default(),
    );

    assert_eq!(
        hints,
        vec![SpaceHint {
            page: 1,
            column: 0,
            min_distance_from_bottom: 42.0,
        }]
    );
}

// ============================================================================
// SETTINGS DRIVEN BREAKS
// ============================================================================

#[test]
fn test_start_new_page_per_group() {
    let definition = ReportDefinition::new("per-region")
        .with_group("region", ExpressionRef::new("region"))
        .with_band(Band::group_header(0).with_settings(BandSettings {
            start_new_page: true,
            ..BandSettings::default()
        }))
        .with_band(Band::detail(0))
        .with_band(Band::group_footer(0));
    let mut oracle = AlwaysFits;
    let (events, summary) = collect(
        &definition,
        region_records(),
        &NoChildRows,
        &FieldEvaluator,
        &mut oracle,
        RunConfig::default(),
    );

    assert_eq!(
        describe(&events, "amt"),
        vec![
            // The first group starts on the empty first page
            "PageHeader",
            "ColumnHeader",
            "GroupHeader(0)[E]",
            "Detail(0)[10]",
            "Detail(0)[5]",
            "GroupFooter(0)[E]",
            "ColumnFooter",
            "PageFooter",
            "PageHeader",
            "ColumnHeader",
            "GroupHeader(0)[W]",
            "Detail(0)[7]",
            "GroupFooter(0)[W]",
            "ColumnFooter",
            "PageFooter",
        ]
    );
    assert_eq!(summary.pages, 2);
}

#[test]
fn test_reset_page_numbering_after_group() {
    let definition = ReportDefinition::new("restart")
        .with_group("region", ExpressionRef::new("region"))
        .with_band(Band::group_header(0).with_settings(BandSettings {
            start_new_page: true,
            ..BandSettings::default()
        }))
        .with_band(Band::detail(0))
        .with_band(Band::group_footer(0).with_settings(BandSettings {
            reset_page_numbering: true,
            ..BandSettings::default()
        }));
    let records = vec![
        Record::new().with("region", "E"),
        Record::new().with("region", "W"),
    ];
    let mut oracle = ScriptedOracle::new().refuse(BandType::Detail, 1);
    let (events, summary) = collect(&definition, records, &NoChildRows, &FieldEvaluator, &mut oracle, RunConfig::default());

    // The E header fills page 1, so its refused detail goes to page 2.
    // Numbering restarts after the E footer, so W starts on page 1 again.
    let headers: Vec<u32> = events
        .iter()
        .filter(|e| e.band_type() == BandType::GroupHeader)
        .map(|e| e.band.page)
        .collect();
    assert_eq!(headers, vec![1, 1]);

    let last = events.last().unwrap();
    assert_eq!(last.band_type(), BandType::PageFooter);
    assert_eq!(last.band.page, 1);
    assert_eq!(summary.pages, 3);
}

#[test]
fn test_columns_fill_before_pages() {
    let mut definition = ReportDefinition::new("columns").with_band(Band::detail(0));
    definition.page.columns = 2;
    let mut oracle = ScriptedOracle::new()
        .refuse(BandType::Detail, 2)
        .refuse(BandType::Detail, 3);
    let (events, summary) = collect(
        &definition,
        (0..4).map(|i| Record::new().with("n", i as f64)).collect(),
        &NoChildRows,
        &FieldEvaluator,
        &mut oracle,
        RunConfig::default(),
    );

    assert_eq!(
        labels(&events),
        vec![
            "PageHeader",
            "ColumnHeader",
            "Detail(0)",
            "ColumnFooter",
            "ColumnHeader",
            "Detail(0)",
            "ColumnFooter",
            "PageFooter",
            "PageHeader",
            "ColumnHeader",
            "Detail(0)",
            "Detail(0)",
            "ColumnFooter",
            "PageFooter",
        ]
    );

    let placement: Vec<(u32, u32)> = events
        .iter()
        .filter(|e| e.band_type() == BandType::Detail)
        .map(|e| (e.band.page, e.band.column))
        .collect();
    assert_eq!(placement, vec![(1, 0), (1, 1), (2, 0), (2, 0)]);
    assert_eq!(summary.pages, 2);
}

#[test]
fn test_start_new_column() {
    let mut definition = ReportDefinition::new("column-groups")
        .with_group("region", ExpressionRef::new("region"))
        .with_band(Band::group_header(0).with_settings(BandSettings {
            start_new_column: true,
            ..BandSettings::default()
        }))
        .with_band(Band::detail(0));
    definition.page.columns = 2;
    let records = vec![
        Record::new().with("region", "E"),
        Record::new().with("region", "W"),
        Record::new().with("region", "X"),
    ];
    let mut oracle = AlwaysFits;
    let (events, _) = collect(&definition, records, &NoChildRows, &FieldEvaluator, &mut oracle, RunConfig::default());

    let headers: Vec<(u32, u32)> = events
        .iter()
        .filter(|e| e.band_type() == BandType::GroupHeader)
        .map(|e| (e.band.page, e.band.column))
        .collect();
    // Out of columns on page 1, so X starts page 2
    assert_eq!(headers, vec![(1, 0), (1, 1), (2, 0)]);
}
