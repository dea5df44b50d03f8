//! FILENAME: band-engine/src/config.rs
//! Run configuration.
//!
//! `EngineOptions` is plain data the host may deserialize from its own
//! settings. Custom reducers are code and travel beside it in `RunConfig`.

use std::fmt;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use report_model::Value;
use crate::group_break::{KeyComparer, ValueComparer};

// ============================================================================
// ENGINE OPTIONS
// ============================================================================

/// Behavioural switches of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Treat every child row failure as fatal, whatever the relation says.
    #[serde(default)]
    pub require_child_rows: bool,

    /// Ask the pagination oracle before content bands.
    /// When off, only explicit `start_new_page` / `start_new_column` break pages.
    #[serde(default = "default_true")]
    pub honor_pagination: bool,

    /// Keep recoverable failures as diagnostics. They are logged either way.
    #[serde(default = "default_true")]
    pub collect_diagnostics: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            require_child_rows: false,
            honor_pagination: true,
            collect_diagnostics: true,
        }
    }
}

// ============================================================================
// CUSTOM REDUCERS
// ============================================================================

/// Aggregation logic for `AggregationKind::Custom` variables.
pub trait Reducer: Send + Sync {
    /// The accumulated value after a reset.
    fn identity(&self) -> Value;

    /// Folds one observed value into the accumulated one.
    fn reduce(&self, accumulated: Value, observed: &Value) -> Value;
}

/// Any `Fn(Value, &Value) -> Value` closure is a reducer with an `Empty` identity.
impl<F> Reducer for F
where
    F: Fn(Value, &Value) -> Value + Send + Sync,
{
    fn identity(&self) -> Value {
        Value::Empty
    }

    fn reduce(&self, accumulated: Value, observed: &Value) -> Value {
        self(accumulated, observed)
    }
}

/// Named reducers available to a run.
#[derive(Clone, Default)]
pub struct ReducerRegistry {
    reducers: FxHashMap<String, Arc<dyn Reducer>>,
}

impl ReducerRegistry {
    pub fn new() -> Self {
        ReducerRegistry {
            reducers: FxHashMap::default(),
        }
    }

    pub fn register(&mut self, name: &str, reducer: Arc<dyn Reducer>) {
        self.reducers.insert(name.to_string(), reducer);
    }

    pub fn with(mut self, name: &str, reducer: impl Reducer + 'static) -> Self {
        self.register(name, Arc::new(reducer));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Reducer>> {
        self.reducers.get(name).cloned()
    }
}

impl fmt::Debug for ReducerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.reducers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ReducerRegistry").field("reducers", &names).finish()
    }
}

/// Everything a run needs besides the definition and collaborators.
#[derive(Clone)]
pub struct RunConfig {
    pub options: EngineOptions,
    pub reducers: ReducerRegistry,
    /// Group key equality. Defaults to `ValueComparer`.
    pub key_comparer: Arc<dyn KeyComparer + Send + Sync>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            options: EngineOptions::default(),
            reducers: ReducerRegistry::default(),
            key_comparer: Arc::new(ValueComparer),
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("options", &self.options)
            .field("reducers", &self.reducers)
            .finish_non_exhaustive()
    }
}

impl RunConfig {
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_reducers(mut self, reducers: ReducerRegistry) -> Self {
        self.reducers = reducers;
        self
    }

    pub fn with_key_comparer(mut self, comparer: impl KeyComparer + Send + Sync + 'static) -> Self {
        self.key_comparer = Arc::new(comparer);
        self
    }
}
