//! FILENAME: report-model/src/expression.rs
//! PURPOSE: Opaque references to expressions evaluated by the host.
//! CONTEXT: The engine never parses expressions. Group keys, variable inputs
//! and band entry/exit hooks are all named references handed back to the
//! caller's evaluator together with the current context.

use serde::{Deserialize, Serialize};
use crate::value::Value;

/// What to do when evaluating an expression fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OnError {
    /// The failure aborts the run.
    Fail,
    /// The given value is substituted and the failure is reported as a diagnostic.
    UseDefault(Value),
}

impl Default for OnError {
    fn default() -> Self {
        OnError::Fail
    }
}

/// A reference to an expression known to the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionRef {
    /// Identifier or source text of the expression; meaning belongs to the evaluator.
    pub name: String,

    /// Recoverability of a failed evaluation.
    #[serde(default)]
    pub on_error: OnError,
}

impl ExpressionRef {
    pub fn new(name: &str) -> Self {
        ExpressionRef {
            name: name.to_string(),
            on_error: OnError::Fail,
        }
    }

    /// Makes failures recoverable by substituting `default`.
    pub fn or_default(mut self, default: impl Into<Value>) -> Self {
        self.on_error = OnError::UseDefault(default.into());
        self
    }
}
