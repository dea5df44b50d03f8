//! FILENAME: report-model/src/variable.rs
//! PURPOSE: Declarations of report variables (scoped accumulators).
//! CONTEXT: A variable is reset whenever its scope closes: a detail band's
//! iteration for one driving record, a group level, a page, or never for
//! report scope. The live accumulator table lives in the band engine.

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::expression::ExpressionRef;

/// Where a variable's values accumulate and when they reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableScope {
    /// Detail band by detail index.
    Detail(usize),
    /// Group by nesting level.
    Group(usize),
    Page,
    Report,
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableScope::Detail(i) => write!(f, "Detail({})", i),
            VariableScope::Group(l) => write!(f, "Group({})", l),
            VariableScope::Page => write!(f, "Page"),
            VariableScope::Report => write!(f, "Report"),
        }
    }
}

/// Supported aggregation functions for variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationKind {
    Sum,
    Count,
    Min,
    Max,
    Avg,
    /// Delegates to a reducer registered under this name for the run.
    Custom { reducer: String },
}

impl Default for AggregationKind {
    fn default() -> Self {
        AggregationKind::Sum
    }
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub scope: VariableScope,

    #[serde(default)]
    pub aggregation: AggregationKind,

    /// Produces the observed value for each update.
    /// Without one every observation contributes `Number(1)`.
    #[serde(default)]
    pub expression: Option<ExpressionRef>,
}

impl VariableDefinition {
    pub fn new(name: &str, scope: VariableScope, aggregation: AggregationKind) -> Self {
        VariableDefinition {
            name: name.to_string(),
            scope,
            aggregation,
            expression: None,
        }
    }

    pub fn with_expression(mut self, expression: ExpressionRef) -> Self {
        self.expression = Some(expression);
        self
    }
}
