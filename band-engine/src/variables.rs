//! FILENAME: band-engine/src/variables.rs
//! Variable Manager - scoped accumulators of a single run.
//!
//! Each declared variable owns one accumulator. Accumulators are updated
//! incrementally as records are observed and reset back to their identity
//! when the variable's scope closes. A reset never removes the declaration.
//!
//! Identity elements:
//! - Sum / Count: 0
//! - Min / Max: unset (reads as `Value::Empty`)
//! - Avg: (sum 0, count 0), reads as `Value::Empty` until a number is seen
//! - Custom: whatever the reducer's `identity()` returns

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use report_model::{AggregationKind, Value, VariableScope};
use crate::config::{Reducer, ReducerRegistry};

/// Live values of every variable, in declaration order.
pub type VariableValues = Vec<(Arc<str>, Value)>;

// ============================================================================
// AGGREGATOR
// ============================================================================

/// The aggregation applied by a variable, with custom reducers resolved.
#[derive(Clone)]
pub enum Aggregator {
    Sum,
    Count,
    Min,
    Max,
    Avg,
    Custom(Arc<dyn Reducer>),
}

impl Aggregator {
    /// Resolves a declared aggregation kind. Returns None for an unknown reducer.
    pub fn resolve(kind: &AggregationKind, reducers: &ReducerRegistry) -> Option<Self> {
        Some(match kind {
            AggregationKind::Sum => Aggregator::Sum,
            AggregationKind::Count => Aggregator::Count,
            AggregationKind::Min => Aggregator::Min,
            AggregationKind::Max => Aggregator::Max,
            AggregationKind::Avg => Aggregator::Avg,
            AggregationKind::Custom { reducer } => Aggregator::Custom(reducers.get(reducer)?),
        })
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregator::Sum => write!(f, "Sum"),
            Aggregator::Count => write!(f, "Count"),
            Aggregator::Min => write!(f, "Min"),
            Aggregator::Max => write!(f, "Max"),
            Aggregator::Avg => write!(f, "Avg"),
            Aggregator::Custom(_) => write!(f, "Custom"),
        }
    }
}

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Intermediate state for all built-in aggregations.
#[derive(Debug, Clone, Default)]
struct Accumulator {
    sum: f64,
    /// Non-empty observations.
    count: u64,
    /// Numeric observations (Avg divisor).
    count_numbers: u64,
    min: Option<Value>,
    max: Option<Value>,
    custom: Value,
}

impl Accumulator {
    fn new(aggregator: &Aggregator) -> Self {
        let mut acc = Accumulator::default();
        if let Aggregator::Custom(reducer) = aggregator {
            acc.custom = reducer.identity();
        }
        acc
    }

    fn add(&mut self, aggregator: &Aggregator, value: &Value) {
        if let Aggregator::Custom(reducer) = aggregator {
            let current = std::mem::take(&mut self.custom);
            self.custom = reducer.reduce(current, value);
            return;
        }

        if value.is_empty() {
            return;
        }
        self.count += 1;

        if let Some(n) = value.as_number() {
            self.count_numbers += 1;
            self.sum += n;
        }

        // Values not comparable with the current extreme are skipped
        if self.min.as_ref().map_or(true, |m| value.compare(m) == Some(Ordering::Less)) {
            self.min = Some(value.clone());
        }
        if self.max.as_ref().map_or(true, |m| value.compare(m) == Some(Ordering::Greater)) {
            self.max = Some(value.clone());
        }
    }

    fn compute(&self, aggregator: &Aggregator) -> Value {
        match aggregator {
            Aggregator::Sum => Value::Number(self.sum),
            Aggregator::Count => Value::Number(self.count as f64),
            Aggregator::Min => self.min.clone().unwrap_or(Value::Empty),
            Aggregator::Max => self.max.clone().unwrap_or(Value::Empty),
            Aggregator::Avg => {
                if self.count_numbers > 0 {
                    Value::Number(self.sum / (self.count_numbers as f64))
                } else {
                    Value::Empty
                }
            }
            Aggregator::Custom(_) => self.custom.clone(),
        }
    }
}

// ============================================================================
// VARIABLE MANAGER
// ============================================================================

#[derive(Debug, Clone)]
struct Variable {
    name: Arc<str>,
    scope: VariableScope,
    aggregator: Aggregator,
    acc: Accumulator,
}

/// The live accumulator table of one run.
#[derive(Debug, Clone, Default)]
pub struct VariableManager {
    variables: Vec<Variable>,
    by_name: FxHashMap<Arc<str>, usize>,
}

impl VariableManager {
    pub fn new() -> Self {
        VariableManager {
            variables: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Declares a variable and returns its slot.
    /// Declaring an existing name replaces its scope and aggregation and resets it.
    pub fn declare(&mut self, name: &str, scope: VariableScope, aggregator: Aggregator) -> usize {
        let acc = Accumulator::new(&aggregator);
        if let Some(&slot) = self.by_name.get(name) {
            let variable = &mut self.variables[slot];
            variable.scope = scope;
            variable.aggregator = aggregator;
            variable.acc = acc;
            return slot;
        }

        let name: Arc<str> = Arc::from(name);
        let slot = self.variables.len();
        self.variables.push(Variable {
            name: Arc::clone(&name),
            scope,
            aggregator,
            acc,
        });
        self.by_name.insert(name, slot);
        slot
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Folds a value into the named variable. Returns false for an unknown name.
    pub fn accumulate(&mut self, name: &str, value: &Value) -> bool {
        match self.slot(name) {
            Some(slot) => {
                self.accumulate_at(slot, value);
                true
            }
            None => false,
        }
    }

    pub fn accumulate_at(&mut self, slot: usize, value: &Value) {
        if let Some(variable) = self.variables.get_mut(slot) {
            variable.acc.add(&variable.aggregator, value);
        }
    }

    pub fn current_value(&self, name: &str) -> Option<Value> {
        self.slot(name).map(|slot| self.value_at(slot))
    }

    pub fn name_at(&self, slot: usize) -> Option<&str> {
        self.variables.get(slot).map(|v| v.name.as_ref())
    }

    pub fn value_at(&self, slot: usize) -> Value {
        self.variables
            .get(slot)
            .map_or(Value::Empty, |v| v.acc.compute(&v.aggregator))
    }

    pub fn scope_of(&self, name: &str) -> Option<VariableScope> {
        self.slot(name).map(|slot| self.variables[slot].scope)
    }

    /// Resets every variable declared with exactly this scope.
    /// Returns how many variables were reset.
    pub fn reset_scope(&mut self, scope: VariableScope) -> usize {
        let mut reset = 0;
        for variable in self.variables.iter_mut().filter(|v| v.scope == scope) {
            variable.acc = Accumulator::new(&variable.aggregator);
            reset += 1;
        }
        reset
    }

    /// Slots of the variables declared with this scope, in declaration order.
    pub fn slots_in_scope(&self, scope: VariableScope) -> impl Iterator<Item = usize> + '_ {
        self.variables
            .iter()
            .enumerate()
            .filter(move |(_, v)| v.scope == scope)
            .map(|(slot, _)| slot)
    }

    /// Current value of every variable, in declaration order.
    pub fn snapshot(&self) -> VariableValues {
        self.variables
            .iter()
            .map(|v| (Arc::clone(&v.name), v.acc.compute(&v.aggregator)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
