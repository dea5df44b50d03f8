//! FILENAME: report-model/src/lib.rs
//! Band Definition Model for the banded report engine.
//!
//! This crate describes WHAT a report is: its bands, group levels, variables
//! and relations. It is read-only once a run starts and knows nothing about
//! records flowing through it.
//!
//! Layers:
//! - `value` / `record`: Data flowing through a run
//! - `band` / `definition` / `variable` / `expression`: Serializable configuration
//! - `aliases`: Relation derivation graph (cycle detection)
//! - `validate`: Invariant checks and the index-addressed `BandTree`

pub mod aliases;
pub mod band;
pub mod definition;
pub mod error;
pub mod expression;
pub mod record;
pub mod validate;
pub mod value;
pub mod variable;

pub use aliases::AliasGraph;
pub use band::{Band, BandKind, BandSettings, BandType, Element, TargetAlias};
pub use definition::{
    GroupDefinition, PageGeometry, RelationDefinition, ReportDefinition, DRIVING_ALIAS,
    MAX_GROUP_LEVELS,
};
pub use error::{AliasCycleError, DefinitionError};
pub use expression::{ExpressionRef, OnError};
pub use record::Record;
pub use validate::{BandTree, DetailSlot, ResolvedTarget};
pub use value::Value;
pub use variable::{AggregationKind, VariableDefinition, VariableScope};
