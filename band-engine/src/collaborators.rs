//! FILENAME: band-engine/src/collaborators.rs
//! PURPOSE: Contracts of the collaborators a run depends on.
//! CONTEXT: The engine performs no I/O. Child rows, expression results and
//! page-fit decisions all come from the host through these traits, and the
//! engine waits for each call to return before it moves on.
//!
//! Simple implementations are provided for hosts and tests that do not need
//! a real query layer or layout engine.

use rustc_hash::FxHashMap;
use report_model::{BandKind, ExpressionRef, Record, Value};
use crate::error::{ChildSourceError, ExpressionError};
use crate::event::BandInstance;
use crate::variables::VariableManager;

// ============================================================================
// EVALUATION CONTEXT
// ============================================================================

/// What an expression may look at when it is evaluated.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// Band being emitted, or None for group keys and variable inputs.
    pub band: Option<&'a BandKind>,
    pub record: Option<&'a Record>,
    pub child: Option<&'a Record>,
    pub variables: &'a VariableManager,
    /// Variable whose input is being evaluated. It never reads itself.
    pub observing: Option<&'a str>,
    pub page: u32,
    pub column: u32,
    pub records_processed: u64,
}

impl<'a> EvalContext<'a> {
    /// Field lookup: the child row first, then the driving record.
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.child
            .and_then(|c| c.get(name))
            .or_else(|| self.record.and_then(|r| r.get(name)))
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        if self.observing == Some(name) {
            return None;
        }
        self.variables.current_value(name)
    }
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Supplies the ordered child rows of a relation for one driving record.
/// Must be deterministic for a given parent/alias pair within a run.
pub trait ChildRowSource {
    fn rows(&self, parent: &Record, alias: &str) -> Result<Vec<Record>, ChildSourceError>;
}

/// Evaluates expression references.
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &ExpressionRef, ctx: &EvalContext<'_>) -> Result<Value, ExpressionError>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&ExpressionRef, &EvalContext<'_>) -> Result<Value, ExpressionError>,
{
    fn evaluate(&self, expression: &ExpressionRef, ctx: &EvalContext<'_>) -> Result<Value, ExpressionError> {
        self(expression, ctx)
    }
}

/// Hints handed to the pagination oracle with every fit question.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceHint {
    pub page: u32,
    pub column: u32,
    /// The band's own `min_distance_from_bottom` setting.
    pub min_distance_from_bottom: f64,
}

/// Decides whether a band still fits on the current page.
/// Only the oracle knows page geometry and the current rendering position.
pub trait PaginationOracle {
    fn fits(&mut self, band: &BandInstance, hint: &SpaceHint) -> bool;
}

impl<F> PaginationOracle for F
where
    F: FnMut(&BandInstance, &SpaceHint) -> bool,
{
    fn fits(&mut self, band: &BandInstance, hint: &SpaceHint) -> bool {
        self(band, hint)
    }
}

// ============================================================================
// PROVIDED COLLABORATORS
// ============================================================================

/// A child row source without any relations. Every lookup yields no rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChildRows;

impl ChildRowSource for NoChildRows {
    fn rows(&self, _parent: &Record, _alias: &str) -> Result<Vec<Record>, ChildSourceError> {
        Ok(Vec::new())
    }
}

/// An oracle with infinite pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFits;

impl PaginationOracle for AlwaysFits {
    fn fits(&mut self, _band: &BandInstance, _hint: &SpaceHint) -> bool {
        true
    }
}

/// Built-in names understood by `FieldEvaluator`.
pub const PAGE_NUMBER: &str = "PAGE_NUMBER";
pub const COLUMN_NUMBER: &str = "COLUMN_NUMBER";
pub const REPORT_COUNT: &str = "REPORT_COUNT";

/// Treats every expression name as a plain reference:
/// a field of the child row or driving record, then a variable, then one of
/// `PAGE_NUMBER`, `COLUMN_NUMBER` (1-based) or `REPORT_COUNT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldEvaluator;

impl ExpressionEvaluator for FieldEvaluator {
    fn evaluate(&self, expression: &ExpressionRef, ctx: &EvalContext<'_>) -> Result<Value, ExpressionError> {
        let name = expression.name.as_str();
        if let Some(value) = ctx.field(name) {
            return Ok(value.clone());
        }
        if let Some(value) = ctx.variable(name) {
            return Ok(value);
        }
        match name {
            PAGE_NUMBER => Ok(Value::Number(ctx.page as f64)),
            COLUMN_NUMBER => Ok(Value::Number((ctx.column + 1) as f64)),
            REPORT_COUNT => Ok(Value::Number(ctx.records_processed as f64)),
            _ => Err(ExpressionError::new(name, "unknown field or variable")),
        }
    }
}

/// In-memory relations keyed by one field of the parent record.
#[derive(Debug, Clone, Default)]
pub struct StaticChildRows {
    parent_field: String,
    /// alias -> parent key (display form) -> rows
    relations: FxHashMap<String, FxHashMap<String, Vec<Record>>>,
}

impl StaticChildRows {
    pub fn new(parent_field: &str) -> Self {
        StaticChildRows {
            parent_field: parent_field.to_string(),
            relations: FxHashMap::default(),
        }
    }

    /// Declares a relation with no rows yet.
    pub fn with_relation(mut self, alias: &str) -> Self {
        self.relations.entry(alias.to_string()).or_default();
        self
    }

    /// Adds rows of `alias` for parents whose key field equals `parent_key`.
    pub fn with_rows(mut self, alias: &str, parent_key: impl Into<Value>, rows: Vec<Record>) -> Self {
        let key = parent_key.into().display_value();
        self.relations
            .entry(alias.to_string())
            .or_default()
            .entry(key)
            .or_default()
            .extend(rows);
        self
    }
}

impl ChildRowSource for StaticChildRows {
    fn rows(&self, parent: &Record, alias: &str) -> Result<Vec<Record>, ChildSourceError> {
        let relation = self
            .relations
            .get(alias)
            .ok_or_else(|| ChildSourceError::new(alias, "relation not available"))?;
        let key = parent
            .get(&self.parent_field)
            .map(Value::display_value)
            .unwrap_or_default();
        Ok(relation.get(&key).cloned().unwrap_or_default())
    }
}
