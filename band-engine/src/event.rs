//! FILENAME: band-engine/src/event.rs
//! Render events - the engine's only output.
//!
//! Each event pairs a band instance with the data it must be drawn with:
//! the driving record, the child row for relation details, the key value of
//! the group level for group bands, and the live variable values at the time
//! of emission. Band elements are not copied; renderers resolve them through
//! `band_index` in the definition they already hold.

use std::sync::Arc;
use serde::Serialize;
use report_model::{BandKind, BandType, Record, Value};
use crate::error::Diagnostic;
use crate::variables::VariableValues;

/// One placement of a band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandInstance {
    pub kind: BandKind,

    /// Index into `ReportDefinition::bands`. None for structural page/column
    /// frame or group bands the report does not declare.
    pub band_index: Option<usize>,

    /// Page number at emission time (1-based).
    pub page: u32,

    /// Column index at emission time (0-based).
    pub column: u32,

    /// Group header repeated at the top of a new page.
    pub reprinted: bool,
}

impl BandInstance {
    pub fn band_type(&self) -> BandType {
        self.kind.band_type()
    }
}

/// The data a band instance is drawn with.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedContext {
    /// Current driving record. None before the first and after the last record.
    pub record: Option<Arc<Record>>,

    /// Current child row of a relation detail band.
    pub child: Option<Arc<Record>>,

    /// Key value of the band's group level (group bands only).
    pub group_key: Option<Value>,

    /// Live value of every declared variable, in declaration order.
    /// Scope decides when a variable resets, not where it is visible:
    /// a variable read outside its scope shows its value since the last reset,
    /// e.g. Detail(1) totals on Detail(2) events or the identity on a Title.
    pub variables: VariableValues,
}

/// A band instance paired with its resolved context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEvent {
    /// Position of this event in the run (0-based, gap free).
    pub sequence: u64,
    pub band: BandInstance,
    pub context: ResolvedContext,
}

impl RenderEvent {
    pub fn kind(&self) -> &BandKind {
        &self.band.kind
    }

    pub fn band_type(&self) -> BandType {
        self.band.band_type()
    }

    /// Live value of a variable at emission time.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.context
            .variables
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Field lookup: the child row first, then the driving record.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.context
            .child
            .as_deref()
            .and_then(|c| c.get(name))
            .or_else(|| self.context.record.as_deref().and_then(|r| r.get(name)))
    }
}

/// What a finished or abandoned run observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub records_processed: u64,
    /// Pages started, including the first one.
    pub pages: u32,
    pub events: u64,
    pub completed: bool,
    pub diagnostics: Vec<Diagnostic>,
}
