//! FILENAME: band-engine/src/processor.rs
//! Band Processor - the single-pass state machine of a report run.
//!
//! A run walks the driving cursor exactly once and turns it into an ordered
//! stream of `RenderEvent`s. It is pull based: nothing happens until the
//! consumer asks for the next event, and at most one record is read ahead.
//!
//! Work is planned as a queue of small steps. Pulling a record plans the
//! group footers and headers of its break, its detail bands, and the
//! accumulator updates, in that order. Steps that discover more work (child
//! rows, page breaks) push it to the front of the queue, so the order of
//! events is fixed by the queue alone and no step recurses.
//!
//! Emission order per driving record:
//! 1. Footers of the closed levels, deepest first, each followed by a
//!    reset of that level's variables
//! 2. Headers of the opened levels, shallowest first
//! 3. Detail bands in declared order (child rows expand in place)
//! 4. Variable updates: Detail, Group (deepest first), Page, Report

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::sync::Arc;
use report_model::{
    AggregationKind, BandKind, BandTree, BandType, DefinitionError, ExpressionRef, OnError, Record,
    ReportDefinition, ResolvedTarget, Value, VariableScope,
};
use crate::collaborators::{
    ChildRowSource, EvalContext, ExpressionEvaluator, PaginationOracle, SpaceHint,
};
use crate::config::{EngineOptions, RunConfig};
use crate::error::{Diagnostic, GroupKeyError, ReportError};
use crate::event::{BandInstance, RenderEvent, ResolvedContext, RunSummary};
use crate::group_break::{detect_break, GroupKey, KeyComparer};
use crate::logging::{
    log_debug, log_enter, log_error, log_exit, log_info, log_warn, CAT_BREAK, CAT_CHILD,
    CAT_PAGE, CAT_RUN, CAT_VARS,
};
use crate::state::RunState;
use crate::variables::{Aggregator, VariableManager};

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// The host-provided collaborators of a run.
pub struct Collaborators<'a> {
    pub child_rows: &'a dyn ChildRowSource,
    pub evaluator: &'a dyn ExpressionEvaluator,
    pub pagination: &'a mut dyn PaginationOracle,
}

/// Starts a run with default configuration.
///
/// The definition is validated before the cursor is touched; an invalid
/// definition or a relation cycle is returned here and no event is produced.
pub fn run<'a, I>(
    definition: &'a ReportDefinition,
    cursor: I,
    child_rows: &'a dyn ChildRowSource,
    evaluator: &'a dyn ExpressionEvaluator,
    pagination: &'a mut dyn PaginationOracle,
) -> Result<BandProcessor<'a, I::IntoIter>, ReportError>
where
    I: IntoIterator<Item = Record>,
{
    run_with(
        definition,
        cursor,
        Collaborators {
            child_rows,
            evaluator,
            pagination,
        },
        RunConfig::default(),
    )
}

/// Starts a run with explicit configuration.
pub fn run_with<'a, I>(
    definition: &'a ReportDefinition,
    cursor: I,
    collaborators: Collaborators<'a>,
    config: RunConfig,
) -> Result<BandProcessor<'a, I::IntoIter>, ReportError>
where
    I: IntoIterator<Item = Record>,
{
    log_enter!(
        CAT_RUN,
        "run",
        "report={} bands={} groups={} variables={}",
        definition.name,
        definition.bands.len(),
        definition.groups.len(),
        definition.variables.len()
    );

    let tree = definition.validate().map_err(|err| {
        log_error!(CAT_RUN, "definition of \"{}\" rejected: {}", definition.name, err);
        ReportError::from(err)
    })?;

    let mut variables = VariableManager::new();
    let mut inputs = Vec::with_capacity(definition.variables.len());
    for var in &definition.variables {
        let aggregator = Aggregator::resolve(&var.aggregation, &config.reducers).ok_or_else(|| {
            let reducer = match &var.aggregation {
                AggregationKind::Custom { reducer } => reducer.clone(),
                _ => String::new(),
            };
            ReportError::from(DefinitionError::UnknownReducer {
                name: var.name.clone(),
                reducer,
            })
        })?;
        let slot = variables.declare(&var.name, var.scope, aggregator);
        debug_assert_eq!(slot, inputs.len());
        inputs.push(var.expression.as_ref());
    }

    let plan = UpdatePlan::build(&tree, &variables);
    let state = RunState::new(tree.level_count(), variables);

    log_exit!(
        CAT_RUN,
        "run",
        "levels={} details={}",
        tree.level_count(),
        tree.details().len()
    );

    Ok(BandProcessor {
        definition,
        tree,
        cursor: cursor.into_iter(),
        child_rows: collaborators.child_rows,
        evaluator: collaborators.evaluator,
        pagination: collaborators.pagination,
        comparer: config.key_comparer,
        options: config.options,
        inputs,
        plan,
        state,
        phase: Phase::Start,
        steps: VecDeque::new(),
        diagnostics: Vec::new(),
        failed: false,
    })
}

// ============================================================================
// STEPS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Title and the first page frame are not planned yet.
    Start,
    /// Pulling driving records.
    Records,
    /// Closing footers and the summary are planned.
    Closing,
    Done,
}

/// A band that is about to be emitted.
#[derive(Debug, Clone)]
struct Emission {
    kind: BandKind,
    record: Option<Arc<Record>>,
    child: Option<Arc<Record>>,
    group_key: Option<Value>,
    /// Group header repeated after a page break.
    reprint: bool,
    /// Placement already decided, emit without asking again.
    placed: bool,
}

impl Emission {
    fn new(kind: BandKind, record: Option<Arc<Record>>) -> Self {
        Emission {
            kind,
            record,
            child: None,
            group_key: None,
            reprint: false,
            placed: false,
        }
    }

    fn placed(mut self) -> Self {
        self.placed = true;
        self
    }

    fn with_key(mut self, key: Value) -> Self {
        self.group_key = Some(key);
        self
    }

    fn with_child(mut self, child: Arc<Record>) -> Self {
        self.child = Some(child);
        self
    }
}

#[derive(Debug)]
enum Step {
    Emit(Emission),
    OpenGroup { level: usize, key: Value, record: Arc<Record> },
    Reset(VariableScope),
    ExpandChildren { detail: usize, record: Arc<Record> },
    AccumulateChild { detail: usize, record: Arc<Record>, child: Arc<Record> },
    AccumulateRecord { record: Arc<Record> },
    AdvancePage,
    AdvanceColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Here,
    NextColumn,
    NextPage,
}

/// Variable slots updated per driving record and per child row, in update order.
///
/// Every detail emission is one observation for the outer scopes: non-relation
/// details observe the driving record once, relation details observe each
/// child row.
#[derive(Debug, Default)]
struct UpdatePlan {
    per_record: Vec<usize>,
    /// Indexed by detail position. Empty for non-relation details.
    per_child: Vec<Vec<usize>>,
}

impl UpdatePlan {
    fn build(tree: &BandTree, variables: &VariableManager) -> Self {
        let mut outer = Vec::new();
        for level in (0..tree.level_count()).rev() {
            outer.extend(variables.slots_in_scope(VariableScope::Group(level)));
        }
        outer.extend(variables.slots_in_scope(VariableScope::Page));
        outer.extend(variables.slots_in_scope(VariableScope::Report));

        let mut plan = UpdatePlan::default();
        // A report without details still observes each driving record
        let mut record_observed = tree.details().is_empty();
        for slot in tree.details() {
            let mut slots: Vec<usize> = variables.slots_in_scope(VariableScope::Detail(slot.index)).collect();
            match slot.target {
                ResolvedTarget::Relation { .. } => {
                    slots.extend(outer.iter().copied());
                    plan.per_child.push(slots);
                }
                ResolvedTarget::PerRecord | ResolvedTarget::Driving => {
                    record_observed = true;
                    plan.per_record.extend(slots);
                    plan.per_child.push(Vec::new());
                }
            }
        }
        if record_observed {
            plan.per_record.extend(outer);
        }
        plan
    }
}

fn is_content(band_type: BandType) -> bool {
    !band_type.is_page_frame() && band_type != BandType::Summary
}

// ============================================================================
// BAND PROCESSOR
// ============================================================================

/// A running report. Yields render events in order; the first fatal error
/// is yielded once and ends the stream.
pub struct BandProcessor<'a, C> {
    definition: &'a ReportDefinition,
    tree: BandTree,
    cursor: C,
    child_rows: &'a dyn ChildRowSource,
    evaluator: &'a dyn ExpressionEvaluator,
    pagination: &'a mut dyn PaginationOracle,
    comparer: Arc<dyn KeyComparer + Send + Sync>,
    options: EngineOptions,
    /// Input expression per variable slot.
    inputs: Vec<Option<&'a ExpressionRef>>,
    plan: UpdatePlan,
    state: RunState,
    phase: Phase,
    steps: VecDeque<Step>,
    diagnostics: Vec<Diagnostic>,
    failed: bool,
}

impl<'a, C> BandProcessor<'a, C>
where
    C: Iterator<Item = Record>,
{
    /// Recoverable failures observed so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Current page number (1-based).
    pub fn page(&self) -> u32 {
        self.state.page
    }

    pub fn records_processed(&self) -> u64 {
        self.state.records_processed
    }

    /// Live value of a variable.
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.state.variables.current_value(name)
    }

    /// Whether the stream ended normally.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done && !self.failed
    }

    /// Ends the run, early or not, and reports what it observed.
    /// Nothing beyond the last event already pulled is emitted.
    pub fn close(self) -> RunSummary {
        let summary = RunSummary {
            records_processed: self.state.records_processed,
            pages: self.state.pages_started,
            events: self.state.events_emitted,
            completed: self.phase == Phase::Done && !self.failed,
            diagnostics: self.diagnostics,
        };
        if !summary.completed {
            log_info!(
                CAT_RUN,
                "run of \"{}\" closed early after {} events",
                self.definition.name,
                summary.events
            );
        }
        summary
    }

    // ------------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------------

    /// Plans the next batch of steps. Called only with an empty queue.
    fn refill(&mut self) -> Result<(), ReportError> {
        match self.phase {
            Phase::Start => {
                if self.tree.band(BandType::Title).is_some() {
                    self.steps.push_back(Step::Emit(Emission::new(BandKind::Title, None)));
                }
                self.steps.push_back(Step::Emit(Emission::new(BandKind::PageHeader, None)));
                self.steps.push_back(Step::Emit(Emission::new(BandKind::ColumnHeader, None)));
                self.phase = Phase::Records;
            }
            Phase::Records => match self.cursor.next() {
                Some(record) => self.plan_record(record)?,
                None => {
                    self.plan_closing();
                    self.phase = Phase::Closing;
                }
            },
            Phase::Closing => {
                self.phase = Phase::Done;
                log_info!(
                    CAT_RUN,
                    "run of \"{}\" finished: records={} pages={} events={} diagnostics={}",
                    self.definition.name,
                    self.state.records_processed,
                    self.state.pages_started,
                    self.state.events_emitted,
                    self.diagnostics.len()
                );
            }
            Phase::Done => {}
        }
        Ok(())
    }

    fn plan_record(&mut self, record: Record) -> Result<(), ReportError> {
        let record = Arc::new(record);
        self.state.records_processed += 1;

        let key = self.derive_key(&record)?;
        let level_count = self.tree.level_count();
        let first = self.state.last_record.is_none();

        let break_level = if level_count == 0 {
            None
        } else if first {
            Some(0)
        } else {
            detect_break(&self.state.current_key, &key, level_count, self.comparer.as_ref())?
        };

        if let Some(level) = break_level {
            if !first {
                log_debug!(
                    CAT_BREAK,
                    "break at level {} on record {}",
                    level,
                    self.state.records_processed
                );
            }
            let previous = self.state.last_record.clone();
            for closed in (level..self.state.open_levels).rev() {
                let old_key = self.state.current_key.get(closed).cloned().unwrap_or_default();
                self.steps.push_back(Step::Emit(
                    Emission::new(BandKind::GroupFooter { level: closed }, previous.clone()).with_key(old_key),
                ));
                self.steps.push_back(Step::Reset(VariableScope::Group(closed)));
            }
            for opened in level..level_count {
                let new_key = key.get(opened).cloned().unwrap_or_default();
                self.steps.push_back(Step::OpenGroup {
                    level: opened,
                    key: new_key.clone(),
                    record: Arc::clone(&record),
                });
                self.steps.push_back(Step::Emit(
                    Emission::new(BandKind::GroupHeader { level: opened }, Some(Arc::clone(&record)))
                        .with_key(new_key),
                ));
            }
        }

        for slot in self.tree.details() {
            self.steps.push_back(Step::Reset(VariableScope::Detail(slot.index)));
            match slot.target {
                ResolvedTarget::PerRecord | ResolvedTarget::Driving => {
                    let kind = self.definition.bands[slot.band].kind.clone();
                    self.steps.push_back(Step::Emit(Emission::new(kind, Some(Arc::clone(&record)))));
                }
                ResolvedTarget::Relation { .. } => {
                    self.steps.push_back(Step::ExpandChildren {
                        detail: slot.index,
                        record: Arc::clone(&record),
                    });
                }
            }
        }
        self.steps.push_back(Step::AccumulateRecord {
            record: Arc::clone(&record),
        });

        self.state.current_key = key;
        self.state.last_record = Some(record);
        Ok(())
    }

    fn plan_closing(&mut self) {
        let last = self.state.last_record.clone();
        for level in (0..self.state.open_levels).rev() {
            let key = self.state.current_key.get(level).cloned().unwrap_or_default();
            self.steps.push_back(Step::Emit(
                Emission::new(BandKind::GroupFooter { level }, last.clone()).with_key(key),
            ));
            self.steps.push_back(Step::Reset(VariableScope::Group(level)));
        }
        self.steps.push_back(Step::Emit(Emission::new(BandKind::ColumnFooter, last.clone())));
        self.steps.push_back(Step::Emit(Emission::new(BandKind::PageFooter, last.clone())));
        self.steps.push_back(Step::Reset(VariableScope::Page));
        if self.tree.band(BandType::Summary).is_some() {
            self.steps.push_back(Step::Emit(Emission::new(BandKind::Summary, last)));
        }
        self.steps.push_back(Step::Reset(VariableScope::Report));
    }

    /// Evaluates the key tuple of a driving record. Any failure is fatal.
    fn derive_key(&self, record: &Record) -> Result<GroupKey, GroupKeyError> {
        let ctx = self.context(None, Some(record), None, None);
        let mut key = GroupKey::with_capacity(self.definition.group_count());
        for group in &self.definition.groups {
            let value = self
                .evaluator
                .evaluate(&group.key, &ctx)
                .map_err(|source| GroupKeyError::Derivation {
                    level: group.level,
                    source,
                })?;
            key.push(value);
        }
        Ok(key)
    }

    /// Pushes steps to the front of the queue, keeping their order.
    fn push_front_all(&mut self, steps: Vec<Step>) {
        for step in steps.into_iter().rev() {
            self.steps.push_front(step);
        }
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    fn execute(&mut self, step: Step) -> Result<Option<RenderEvent>, ReportError> {
        match step {
            Step::Emit(emission) => self.emit(emission),
            Step::OpenGroup { level, key, record } => {
                self.state.open_group(level, key, record);
                self.state.variables.reset_scope(VariableScope::Group(level));
                Ok(None)
            }
            Step::Reset(scope) => {
                let reset = self.state.variables.reset_scope(scope);
                if reset > 0 {
                    log_debug!(CAT_VARS, "reset {} variables of scope {}", reset, scope);
                }
                Ok(None)
            }
            Step::ExpandChildren { detail, record } => {
                self.expand_children(detail, record)?;
                Ok(None)
            }
            Step::AccumulateChild { detail, record, child } => {
                let slots = self.plan.per_child.get(detail).cloned().unwrap_or_default();
                self.accumulate(&slots, &record, Some(child.as_ref()))?;
                Ok(None)
            }
            Step::AccumulateRecord { record } => {
                let slots = std::mem::take(&mut self.plan.per_record);
                let result = self.accumulate(&slots, &record, None);
                self.plan.per_record = slots;
                result?;
                Ok(None)
            }
            Step::AdvancePage => {
                self.state.advance_page();
                log_debug!(CAT_PAGE, "page {} started", self.state.page);
                Ok(None)
            }
            Step::AdvanceColumn => {
                self.state.advance_column();
                log_debug!(CAT_PAGE, "column {} started on page {}", self.state.column, self.state.page);
                Ok(None)
            }
        }
    }

    fn emit(&mut self, emission: Emission) -> Result<Option<RenderEvent>, ReportError> {
        let definition = self.definition;
        let band_index = self.tree.band_for(&emission.kind);
        let band = band_index.map(|i| &definition.bands[i]);
        let band_type = emission.kind.band_type();

        if !emission.placed && !emission.reprint && is_content(band_type) {
            let placement = self.placement(&emission, band_index);
            if placement != Placement::Here {
                let kind = emission.kind.clone();
                self.schedule_break(placement, emission);
                log_debug!(CAT_PAGE, "{:?} before {}", placement, kind);
                return Ok(None);
            }
        }

        if !emission.reprint {
            match emission.kind {
                BandKind::GroupHeader { level } => self.state.open_levels = level + 1,
                BandKind::GroupFooter { level } => self.state.open_levels = level,
                _ => {}
            }
        }

        let hooks = band.filter(|_| !emission.reprint);
        if let Some(on_entry) = hooks.and_then(|b| b.on_entry.as_ref()) {
            self.evaluate(
                on_entry,
                Some(&emission.kind),
                emission.record.as_deref(),
                emission.child.as_deref(),
                None,
            )?;
        }

        let event = RenderEvent {
            sequence: self.state.events_emitted,
            band: self.instance(&emission, band_index),
            context: ResolvedContext {
                record: emission.record.clone(),
                child: emission.child.clone(),
                group_key: emission.group_key.clone(),
                variables: self.state.variables.snapshot(),
            },
        };

        if let Some(on_exit) = hooks.and_then(|b| b.on_exit.as_ref()) {
            self.evaluate(
                on_exit,
                Some(&emission.kind),
                emission.record.as_deref(),
                emission.child.as_deref(),
                None,
            )?;
        }

        if is_content(band_type) && !emission.reprint {
            self.state.page_has_content = true;
            self.state.column_has_content = true;
        }
        if hooks.map_or(false, |b| b.settings.reset_page_numbering) {
            self.state.reset_page_pending = true;
        }

        self.state.events_emitted += 1;
        Ok(Some(event))
    }

    fn instance(&self, emission: &Emission, band_index: Option<usize>) -> BandInstance {
        BandInstance {
            kind: emission.kind.clone(),
            band_index,
            page: self.state.page,
            column: self.state.column,
            reprinted: emission.reprint,
        }
    }

    /// Decides where a content band goes: here, the next column or the next page.
    fn placement(&mut self, emission: &Emission, band_index: Option<usize>) -> Placement {
        let definition = self.definition;
        let settings = band_index.map(|i| &definition.bands[i].settings);
        let columns_left = self.state.column + 1 < definition.page.columns;

        if let Some(settings) = settings {
            if settings.start_new_page && self.state.page_has_content {
                return Placement::NextPage;
            }
            if settings.start_new_column && self.state.column_has_content {
                return if columns_left {
                    Placement::NextColumn
                } else {
                    Placement::NextPage
                };
            }
        }

        if self.options.honor_pagination {
            let hint = SpaceHint {
                page: self.state.page,
                column: self.state.column,
                min_distance_from_bottom: settings.map_or(0.0, |s| s.min_distance_from_bottom),
            };
            let instance = self.instance(emission, band_index);
            // A band that does not fit an empty column is emitted anyway
            if !self.pagination.fits(&instance, &hint) && self.state.column_has_content {
                return if columns_left {
                    Placement::NextColumn
                } else {
                    Placement::NextPage
                };
            }
        }

        Placement::Here
    }

    /// Queues the page or column break and the deferred band behind it.
    fn schedule_break(&mut self, placement: Placement, deferred: Emission) {
        let record = deferred.record.clone();
        let mut steps = vec![Step::Emit(
            Emission::new(BandKind::ColumnFooter, record.clone()).placed(),
        )];

        match placement {
            Placement::NextColumn => {
                steps.push(Step::AdvanceColumn);
                steps.push(Step::Emit(Emission::new(BandKind::ColumnHeader, record).placed()));
            }
            Placement::NextPage => {
                steps.push(Step::Emit(Emission::new(BandKind::PageFooter, record.clone()).placed()));
                steps.push(Step::Reset(VariableScope::Page));
                steps.push(Step::AdvancePage);
                steps.push(Step::Emit(Emission::new(BandKind::PageHeader, record.clone()).placed()));
                steps.push(Step::Emit(Emission::new(BandKind::ColumnHeader, record).placed()));

                let definition = self.definition;
                for level in 0..self.state.open_levels {
                    let reprint = self
                        .tree
                        .group_header(level)
                        .map_or(false, |i| definition.bands[i].settings.reprint_on_page_break);
                    if !reprint {
                        continue;
                    }
                    let Some(open) = self.state.levels.get(level) else {
                        continue;
                    };
                    let mut emission = Emission::new(BandKind::GroupHeader { level }, open.record.clone())
                        .with_key(open.key.clone())
                        .placed();
                    emission.reprint = true;
                    steps.push(Step::Emit(emission));
                }
            }
            Placement::Here => {}
        }

        steps.push(Step::Emit(deferred.placed()));
        self.push_front_all(steps);
    }

    fn expand_children(&mut self, detail: usize, record: Arc<Record>) -> Result<(), ReportError> {
        let Some(slot) = self.tree.details().get(detail) else {
            return Ok(());
        };
        let ResolvedTarget::Relation { alias, required } = &slot.target else {
            return Ok(());
        };
        let (alias, required) = (alias.clone(), *required);
        let kind = self.definition.bands[slot.band].kind.clone();

        match self.child_rows.rows(&record, &alias) {
            Ok(rows) => {
                log_debug!(CAT_CHILD, "relation \"{}\" yielded {} rows for detail {}", alias, rows.len(), detail);
                let mut steps = Vec::with_capacity(rows.len() * 2);
                for row in rows {
                    let child = Arc::new(row);
                    steps.push(Step::Emit(
                        Emission::new(kind.clone(), Some(Arc::clone(&record))).with_child(Arc::clone(&child)),
                    ));
                    steps.push(Step::AccumulateChild {
                        detail,
                        record: Arc::clone(&record),
                        child,
                    });
                }
                self.push_front_all(steps);
                Ok(())
            }
            Err(err) if required || self.options.require_child_rows => Err(err.into()),
            Err(err) => {
                self.record_diagnostic(Diagnostic::ChildRowsUnavailable {
                    detail_index: detail,
                    error: err,
                });
                Ok(())
            }
        }
    }

    /// Feeds one observation into each listed variable slot.
    fn accumulate(&mut self, slots: &[usize], record: &Record, child: Option<&Record>) -> Result<(), ReportError> {
        for &slot in slots {
            let observed = match self.inputs.get(slot).copied().flatten() {
                Some(expression) => self.evaluate(expression, None, Some(record), child, Some(slot))?,
                None => Value::Number(1.0),
            };
            self.state.variables.accumulate_at(slot, &observed);
        }
        Ok(())
    }

    /// Evaluates an expression under its own failure policy.
    fn evaluate(
        &mut self,
        expression: &ExpressionRef,
        band: Option<&BandKind>,
        record: Option<&Record>,
        child: Option<&Record>,
        observing: Option<usize>,
    ) -> Result<Value, ReportError> {
        let result = {
            let ctx = self.context(band, record, child, observing);
            self.evaluator.evaluate(expression, &ctx)
        };
        match result {
            Ok(value) => Ok(value),
            Err(error) => match &expression.on_error {
                OnError::Fail => Err(error.into()),
                OnError::UseDefault(default) => {
                    self.record_diagnostic(Diagnostic::ExpressionDefaulted {
                        band: band.cloned(),
                        error,
                        substituted: default.clone(),
                    });
                    Ok(default.clone())
                }
            },
        }
    }

    fn context<'c>(
        &'c self,
        band: Option<&'c BandKind>,
        record: Option<&'c Record>,
        child: Option<&'c Record>,
        observing: Option<usize>,
    ) -> EvalContext<'c> {
        EvalContext {
            band,
            record,
            child,
            variables: &self.state.variables,
            observing: observing.and_then(|slot| self.state.variables.name_at(slot)),
            page: self.state.page,
            column: self.state.column,
            records_processed: self.state.records_processed,
        }
    }

    fn record_diagnostic(&mut self, diagnostic: Diagnostic) {
        log_warn!(CAT_RUN, "{}", diagnostic);
        if self.options.collect_diagnostics {
            self.diagnostics.push(diagnostic);
        }
    }

    fn fail(&mut self, err: ReportError) -> ReportError {
        log_error!(
            CAT_RUN,
            "run of \"{}\" failed after {} events: {}",
            self.definition.name,
            self.state.events_emitted,
            err
        );
        self.failed = true;
        self.phase = Phase::Done;
        self.steps.clear();
        err
    }
}

impl<'a, C> Iterator for BandProcessor<'a, C>
where
    C: Iterator<Item = Record>,
{
    type Item = Result<RenderEvent, ReportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(step) = self.steps.pop_front() {
                match self.execute(step) {
                    Ok(Some(event)) => return Some(Ok(event)),
                    Ok(None) => continue,
                    Err(err) => return Some(Err(self.fail(err))),
                }
            }
            if self.phase == Phase::Done {
                return None;
            }
            if let Err(err) = self.refill() {
                return Some(Err(self.fail(err)));
            }
        }
    }
}

impl<'a, C> FusedIterator for BandProcessor<'a, C> where C: Iterator<Item = Record> {}
