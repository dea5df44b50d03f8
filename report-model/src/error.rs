//! FILENAME: report-model/src/error.rs

use thiserror::Error;
use crate::band::BandType;
use crate::variable::VariableScope;

/// A detail target alias whose relation chain loops back on itself.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Target alias cycle detected: {}", cycle_path.join(" -> "))]
pub struct AliasCycleError {
    /// The relations involved in the loop, first name repeated at the end.
    pub cycle_path: Vec<String>,
}

/// A band-tree invariant violation. Raised before any record is processed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("At most one {0} band is allowed")]
    DuplicateBand(BandType),

    #[error("Too many group levels: {count} (maximum {max})")]
    TooManyGroupLevels { count: usize, max: usize },

    #[error("Group levels must be contiguous from 0: expected level {expected}, found {found}")]
    GroupLevelGap { expected: usize, found: usize },

    #[error("{band} band refers to undeclared group level {level}")]
    UnknownGroupLevel { band: BandType, level: usize },

    #[error("Duplicate {band} band for group level {level}")]
    DuplicateGroupBand { band: BandType, level: usize },

    #[error("Detail indices must be contiguous from 0: expected {expected}, found {found}")]
    DetailIndexGap { expected: usize, found: usize },

    #[error("Target alias \"driving\" is only legal on the first detail band, found on detail {index}")]
    DrivingAliasNotFirst { index: usize },

    #[error("Detail {index} targets undeclared relation \"{alias}\"")]
    UnknownRelation { index: usize, alias: String },

    #[error("Relation \"{relation}\" is derived from undeclared relation \"{parent}\"")]
    UnknownRelationSource { relation: String, parent: String },

    #[error("Relation name \"{0}\" is reserved")]
    ReservedRelationName(String),

    #[error("Duplicate relation \"{0}\"")]
    DuplicateRelation(String),

    #[error("Duplicate variable \"{0}\"")]
    DuplicateVariable(String),

    #[error("Variable \"{name}\" has scope {scope}, which does not exist in this report")]
    UnknownVariableScope { name: String, scope: VariableScope },

    #[error("Variable \"{name}\" uses unregistered reducer \"{reducer}\"")]
    UnknownReducer { name: String, reducer: String },

    #[error(transparent)]
    TargetAliasCycle(#[from] AliasCycleError),
}
