//! FILENAME: report-model/src/definition.rs
//! Report Definition - The serializable description of a report.
//!
//! This module contains all the types needed to DESCRIBE a report.
//! These structures are designed to be:
//! - Serializable (hosts hand them over as JSON)
//! - Immutable snapshots once a run starts
//! - Validated by `validate()` before any record is touched

use serde::{Deserialize, Serialize};
use crate::band::Band;
use crate::expression::ExpressionRef;
use crate::variable::VariableDefinition;

/// Deepest supported group nesting: levels 0..=73.
pub const MAX_GROUP_LEVELS: usize = 74;

/// Relation name reserved for the driving record itself.
pub const DRIVING_ALIAS: &str = "driving";

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

/// Page geometry, in page units. Only the pagination oracle interprets sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,

    #[serde(default)]
    pub top_margin: f64,

    #[serde(default)]
    pub bottom_margin: f64,

    /// Number of columns per page (1 = single column).
    #[serde(default = "default_columns")]
    pub columns: u32,
}

fn default_columns() -> u32 {
    1
}

impl Default for PageGeometry {
    fn default() -> Self {
        // A4 portrait in points
        PageGeometry {
            width: 595.0,
            height: 842.0,
            top_margin: 20.0,
            bottom_margin: 20.0,
            columns: 1,
        }
    }
}

// ============================================================================
// GROUPS AND RELATIONS
// ============================================================================

/// One nesting level of grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Nesting level, outermost = 0.
    pub level: usize,

    pub name: String,

    /// Derives this level's key component from the driving record.
    pub key: ExpressionRef,
}

impl GroupDefinition {
    pub fn new(level: usize, name: &str, key: ExpressionRef) -> Self {
        GroupDefinition {
            level,
            name: name.to_string(),
            key,
        }
    }
}

/// A named relation detail bands can iterate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDefinition {
    pub name: String,

    /// Relation this one is derived from. None = the driving source.
    #[serde(default)]
    pub source: Option<String>,

    /// A failing child row lookup aborts the run instead of yielding no rows.
    #[serde(default)]
    pub required: bool,
}

impl RelationDefinition {
    pub fn new(name: &str) -> Self {
        RelationDefinition {
            name: name.to_string(),
            source: None,
            required: false,
        }
    }

    pub fn derived_from(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete description of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub name: String,

    /// Locale tag, passed through to formatters.
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub page: PageGeometry,

    /// All bands, in any order. Lookups go through the validated `BandTree`.
    #[serde(default)]
    pub bands: Vec<Band>,

    /// Group levels (ordered from outer to inner).
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,

    #[serde(default)]
    pub variables: Vec<VariableDefinition>,

    #[serde(default)]
    pub relations: Vec<RelationDefinition>,
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl ReportDefinition {
    /// Creates an empty report definition.
    pub fn new(name: &str) -> Self {
        ReportDefinition {
            name: name.to_string(),
            locale: default_locale(),
            page: PageGeometry::default(),
            bands: Vec::new(),
            groups: Vec::new(),
            variables: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_band(mut self, band: Band) -> Self {
        self.bands.push(band);
        self
    }

    /// Appends a group as the next-deeper level.
    pub fn with_group(mut self, name: &str, key: ExpressionRef) -> Self {
        let level = self.groups.len();
        self.groups.push(GroupDefinition::new(level, name, key));
        self
    }

    pub fn with_variable(mut self, variable: VariableDefinition) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_relation(mut self, relation: RelationDefinition) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDefinition> {
        self.relations.iter().find(|r| r.name == name)
    }
}
