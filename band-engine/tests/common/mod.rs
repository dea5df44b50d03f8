//! FILENAME: band-engine/tests/common/mod.rs
//! Test harness and fixtures for band-engine integration tests.

#![allow(dead_code)]

use band_engine::{
    run_with, BandInstance, ChildRowSource, ChildSourceError, Collaborators, EvalContext,
    ExpressionError, ExpressionEvaluator, FieldEvaluator, PaginationOracle, RenderEvent,
    ReportError, RunConfig, RunSummary, SpaceHint,
};
use band_engine::report_model::{
    AggregationKind, Band, BandType, ExpressionRef, Record, ReportDefinition, Value,
    VariableDefinition, VariableScope,
};

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Oracle that refuses chosen questions and remembers every question asked.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    /// (band type, 1-based occurrence) pairs to refuse.
    refuse: Vec<(BandType, usize)>,
    seen: Vec<(BandType, usize)>,
    pub asked: Vec<BandInstance>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses the `occurrence`-th question about a band of `band_type`.
    pub fn refuse(mut self, band_type: BandType, occurrence: usize) -> Self {
        self.refuse.push((band_type, occurrence));
        self
    }
}

impl PaginationOracle for ScriptedOracle {
    fn fits(&mut self, band: &BandInstance, _hint: &SpaceHint) -> bool {
        self.asked.push(band.clone());
        let band_type = band.band_type();
        let occurrence = match self.seen.iter_mut().find(|(t, _)| *t == band_type) {
            Some((_, n)) => {
                *n += 1;
                *n
            }
            None => {
                self.seen.push((band_type, 1));
                1
            }
        };
        !self.refuse.contains(&(band_type, occurrence))
    }
}

/// Child row source whose every lookup fails.
pub struct BrokenChildRows;

impl ChildRowSource for BrokenChildRows {
    fn rows(&self, _parent: &Record, alias: &str) -> Result<Vec<Record>, ChildSourceError> {
        Err(ChildSourceError::new(alias, "connection lost"))
    }
}

/// Field evaluator that fails for one expression name.
pub struct FailingEvaluator {
    pub failing: &'static str,
}

impl ExpressionEvaluator for FailingEvaluator {
    fn evaluate(&self, expression: &ExpressionRef, ctx: &EvalContext<'_>) -> Result<Value, ExpressionError> {
        if expression.name == self.failing {
            return Err(ExpressionError::new(&expression.name, "division by zero"));
        }
        FieldEvaluator.evaluate(expression, ctx)
    }
}

// ============================================================================
// RUN HELPERS
// ============================================================================

/// Runs to completion, returning every event and the summary.
/// Panics on a fatal error.
pub fn collect(
    definition: &ReportDefinition,
    records: Vec<Record>,
    child_rows: &dyn ChildRowSource,
    evaluator: &dyn ExpressionEvaluator,
    pagination: &mut dyn PaginationOracle,
    config: RunConfig,
) -> (Vec<RenderEvent>, RunSummary) {
    let mut processor = run_with(
        definition,
        records,
        Collaborators {
            child_rows,
            evaluator,
            pagination,
        },
        config,
    )
    .expect("definition should be valid");

    let mut events = Vec::new();
    for event in processor.by_ref() {
        events.push(event.expect("run should not fail"));
    }
    (events, processor.close())
}

/// Runs until the stream ends, keeping events and the first error.
pub fn collect_until_error(
    definition: &ReportDefinition,
    records: Vec<Record>,
    child_rows: &dyn ChildRowSource,
    evaluator: &dyn ExpressionEvaluator,
    pagination: &mut dyn PaginationOracle,
    config: RunConfig,
) -> (Vec<RenderEvent>, Option<ReportError>) {
    let processor = run_with(
        definition,
        records,
        Collaborators {
            child_rows,
            evaluator,
            pagination,
        },
        config,
    )
    .expect("definition should be valid");

    let mut events = Vec::new();
    for event in processor {
        match event {
            Ok(event) => events.push(event),
            Err(err) => return (events, Some(err)),
        }
    }
    (events, None)
}

/// "Kind" labels, e.g. "GroupHeader(0)".
pub fn labels(events: &[RenderEvent]) -> Vec<String> {
    events.iter().map(|e| e.kind().to_string()).collect()
}

/// Labels with the group key or the named field, e.g. "GroupFooter(0)[E]", "Detail(0)[10]".
/// Reprinted headers carry a trailing "*".
pub fn describe(events: &[RenderEvent], field: &str) -> Vec<String> {
    events
        .iter()
        .map(|e| {
            let mut label = e.kind().to_string();
            let shown = match e.band_type() {
                BandType::GroupHeader | BandType::GroupFooter => e.context.group_key.clone(),
                BandType::Detail => e.field(field).cloned(),
                _ => None,
            };
            if let Some(value) = shown {
                label.push_str(&format!("[{}]", value.display_value()));
            }
            if e.band.reprinted {
                label.push('*');
            }
            label
        })
        .collect()
}

// ============================================================================
// FIXTURES
// ============================================================================

/// [{region:"E",amt:10},{region:"E",amt:5},{region:"W",amt:7}]
pub fn region_records() -> Vec<Record> {
    vec![
        Record::new().with("region", "E").with("amt", 10.0),
        Record::new().with("region", "E").with("amt", 5.0),
        Record::new().with("region", "W").with("amt", 7.0),
    ]
}

/// One group level on `region` with a group-scoped Sum `total` of `amt`.
pub fn region_report() -> ReportDefinition {
    ReportDefinition::new("regions")
        .with_group("region", ExpressionRef::new("region"))
        .with_band(Band::group_header(0))
        .with_band(Band::detail(0))
        .with_band(Band::group_footer(0))
        .with_variable(
            VariableDefinition::new("total", VariableScope::Group(0), AggregationKind::Sum)
                .with_expression(ExpressionRef::new("amt")),
        )
}

/// `count` records keyed by `region` in blocks of `block`.
pub fn sorted_records(count: usize, block: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new()
                .with("region", format!("R{:04}", i / block.max(1)))
                .with("amt", (i % 10) as f64)
        })
        .collect()
}
