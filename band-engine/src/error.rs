//! FILENAME: band-engine/src/error.rs
//! PURPOSE: Fatal errors and recoverable diagnostics of a report run.
//! CONTEXT: Fatal errors end the event stream. Recoverable failures are kept
//! as diagnostics beside it, so the host can decide between a failed report
//! and a partial report with warnings.

use thiserror::Error;
use report_model::{AliasCycleError, BandKind, DefinitionError, Value};

/// Evaluation of an expression failed. Produced by the host's evaluator.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Expression \"{expression}\" failed: {message}")]
pub struct ExpressionError {
    pub expression: String,
    pub message: String,
}

impl ExpressionError {
    pub fn new(expression: &str, message: impl Into<String>) -> Self {
        ExpressionError {
            expression: expression.to_string(),
            message: message.into(),
        }
    }
}

/// A group key could not be derived or compared. Always fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupKeyError {
    #[error("Group key at level {level} could not be derived: {source}")]
    Derivation {
        level: usize,
        #[source]
        source: ExpressionError,
    },

    #[error("Group key at level {level} is not comparable: {previous} vs {current}")]
    Incomparable {
        level: usize,
        previous: &'static str,
        current: &'static str,
    },
}

impl GroupKeyError {
    pub fn incomparable(level: usize, previous: &Value, current: &Value) -> Self {
        GroupKeyError::Incomparable {
            level,
            previous: previous.type_name(),
            current: current.type_name(),
        }
    }

    pub fn level(&self) -> usize {
        match self {
            GroupKeyError::Derivation { level, .. } | GroupKeyError::Incomparable { level, .. } => {
                *level
            }
        }
    }
}

/// The child row source could not produce rows.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Child rows for relation \"{alias}\" unavailable: {message}")]
pub struct ChildSourceError {
    pub alias: String,
    pub message: String,
}

impl ChildSourceError {
    pub fn new(alias: &str, message: impl Into<String>) -> Self {
        ChildSourceError {
            alias: alias.to_string(),
            message: message.into(),
        }
    }
}

/// A fatal error. The run yields it once and then stops.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Invalid report definition: {0}")]
    Definition(DefinitionError),

    #[error(transparent)]
    TargetAliasCycle(AliasCycleError),

    #[error(transparent)]
    GroupKey(#[from] GroupKeyError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    ChildSource(#[from] ChildSourceError),
}

impl From<DefinitionError> for ReportError {
    fn from(err: DefinitionError) -> Self {
        match err {
            DefinitionError::TargetAliasCycle(cycle) => ReportError::TargetAliasCycle(cycle),
            other => ReportError::Definition(other),
        }
    }
}

/// A recoverable failure observed during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An expression failed and its configured default was used instead.
    ExpressionDefaulted {
        /// Band being emitted, or None for variable updates between bands.
        band: Option<BandKind>,
        error: ExpressionError,
        substituted: Value,
    },
    /// A child row lookup failed and was treated as zero rows.
    ChildRowsUnavailable {
        detail_index: usize,
        error: ChildSourceError,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::ExpressionDefaulted { band, error, substituted } => {
                match band {
                    Some(kind) => write!(f, "{} in {}", error, kind)?,
                    None => write!(f, "{}", error)?,
                }
                write!(f, "; using {:?}", substituted)
            }
            Diagnostic::ChildRowsUnavailable { detail_index, error } => {
                write!(f, "{} (detail {} skipped)", error, detail_index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_cycle_is_lifted_to_its_own_kind() {
        let cycle = AliasCycleError {
            cycle_path: vec!["a".to_string(), "a".to_string()],
        };
        let err: ReportError = DefinitionError::TargetAliasCycle(cycle.clone()).into();
        assert_eq!(err, ReportError::TargetAliasCycle(cycle));

        let err: ReportError = DefinitionError::DuplicateVariable("x".to_string()).into();
        assert!(matches!(err, ReportError::Definition(_)));
    }

    #[test]
    fn test_messages() {
        let err = GroupKeyError::incomparable(2, &Value::from("a"), &Value::from(1.0));
        assert_eq!(
            err.to_string(),
            "Group key at level 2 is not comparable: text vs number"
        );
        assert_eq!(err.level(), 2);

        let diag = Diagnostic::ChildRowsUnavailable {
            detail_index: 1,
            error: ChildSourceError::new("lines", "timeout"),
        };
        assert_eq!(
            diag.to_string(),
            "Child rows for relation \"lines\" unavailable: timeout (detail 1 skipped)"
        );
    }
}
