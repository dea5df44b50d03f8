//! FILENAME: band-engine/src/lib.rs
//! Band processing engine for banded reports.
//!
//! Given a validated `ReportDefinition` and an ordered stream of driving
//! records, a run produces the ordered `RenderEvent`s a renderer draws.
//! The engine never lays anything out and never performs I/O: child rows,
//! expression results and page-fit decisions come from host collaborators.
//!
//! Layers:
//! - `processor`: The single-pass state machine (`run`, `BandProcessor`)
//! - `group_break`: Key tuple comparison
//! - `variables`: Scoped accumulators
//! - `collaborators`: Host contracts and simple implementations
//! - `event` / `error` / `config`: Output, failures and run options

mod logging;

pub mod collaborators;
pub mod config;
pub mod error;
pub mod event;
pub mod group_break;
pub mod processor;
pub mod state;
pub mod variables;

pub use collaborators::{
    AlwaysFits, ChildRowSource, EvalContext, ExpressionEvaluator, FieldEvaluator, NoChildRows,
    PaginationOracle, SpaceHint, StaticChildRows, COLUMN_NUMBER, PAGE_NUMBER, REPORT_COUNT,
};
pub use config::{EngineOptions, Reducer, ReducerRegistry, RunConfig};
pub use error::{ChildSourceError, Diagnostic, ExpressionError, GroupKeyError, ReportError};
pub use event::{BandInstance, RenderEvent, ResolvedContext, RunSummary};
pub use group_break::{detect_break, GroupKey, KeyComparer, ValueComparer};
pub use processor::{run, run_with, BandProcessor, Collaborators};
pub use variables::{Aggregator, VariableManager, VariableValues};

pub use report_model;
