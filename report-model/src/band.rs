//! FILENAME: report-model/src/band.rs
//! Band types - the typed sections of a report layout.
//!
//! A report is a flat, index-addressed list of bands. Group bands carry their
//! nesting level and detail bands carry their position among the detail
//! bands, so no band ever points at another one.

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::expression::ExpressionRef;

// ============================================================================
// BAND KIND
// ============================================================================

/// The type of a band without its per-instance payload.
/// Used for lookups and for bands the engine emits structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandType {
    Title,
    PageHeader,
    ColumnHeader,
    GroupHeader,
    Detail,
    GroupFooter,
    ColumnFooter,
    PageFooter,
    Summary,
}

impl BandType {
    /// Page and column frame bands are emitted at page/column boundaries
    /// and are never subject to the pagination handshake themselves.
    pub fn is_page_frame(self) -> bool {
        matches!(
            self,
            BandType::PageHeader
                | BandType::ColumnHeader
                | BandType::ColumnFooter
                | BandType::PageFooter
        )
    }
}

impl fmt::Display for BandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What a detail band iterates against for each driving record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetAlias {
    /// Fires once per driving record.
    None,
    /// Fires once, reusing the driving record. Only legal on the first detail band.
    Driving,
    /// Fires once per child row of the named relation.
    Relation(String),
}

impl Default for TargetAlias {
    fn default() -> Self {
        TargetAlias::None
    }
}

/// A band's type together with its level or detail position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandKind {
    Title,
    PageHeader,
    ColumnHeader,
    GroupHeader { level: usize },
    Detail { index: usize, target: TargetAlias },
    GroupFooter { level: usize },
    ColumnFooter,
    PageFooter,
    Summary,
}

impl BandKind {
    pub fn band_type(&self) -> BandType {
        match self {
            BandKind::Title => BandType::Title,
            BandKind::PageHeader => BandType::PageHeader,
            BandKind::ColumnHeader => BandType::ColumnHeader,
            BandKind::GroupHeader { .. } => BandType::GroupHeader,
            BandKind::Detail { .. } => BandType::Detail,
            BandKind::GroupFooter { .. } => BandType::GroupFooter,
            BandKind::ColumnFooter => BandType::ColumnFooter,
            BandKind::PageFooter => BandType::PageFooter,
            BandKind::Summary => BandType::Summary,
        }
    }

    /// Group level for group headers and footers.
    pub fn level(&self) -> Option<usize> {
        match self {
            BandKind::GroupHeader { level } | BandKind::GroupFooter { level } => Some(*level),
            _ => None,
        }
    }

    /// Position among the detail bands.
    pub fn detail_index(&self) -> Option<usize> {
        match self {
            BandKind::Detail { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for BandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandKind::GroupHeader { level } => write!(f, "GroupHeader({})", level),
            BandKind::GroupFooter { level } => write!(f, "GroupFooter({})", level),
            BandKind::Detail { index, .. } => write!(f, "Detail({})", index),
            other => write!(f, "{}", other.band_type()),
        }
    }
}

// ============================================================================
// BAND SETTINGS
// ============================================================================

/// Placement flags of a band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandSettings {
    /// Force a page break before this band.
    #[serde(default)]
    pub start_new_page: bool,

    /// Force a column break before this band.
    #[serde(default)]
    pub start_new_column: bool,

    /// Group headers only: print again at the top of every page the group spans.
    #[serde(default)]
    pub reprint_on_page_break: bool,

    /// Minimum space (in page units) that must remain below this band.
    /// Passed to the pagination oracle; the engine does not measure anything.
    #[serde(default)]
    pub min_distance_from_bottom: f64,

    /// The next page break after this band restarts page numbering at 1.
    #[serde(default)]
    pub reset_page_numbering: bool,
}

// ============================================================================
// BAND
// ============================================================================

/// A renderable element inside a band. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub kind: String,
    /// Expression the renderer resolves for this element, if any.
    #[serde(default)]
    pub source: Option<String>,
}

impl Element {
    pub fn new(name: &str, kind: &str) -> Self {
        Element {
            name: name.to_string(),
            kind: kind.to_string(),
            source: None,
        }
    }
}

/// A typed section of the report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub kind: BandKind,

    /// Elements in drawing order, passed through to the renderer.
    #[serde(default)]
    pub elements: Vec<Element>,

    /// Evaluated just before the band is emitted.
    #[serde(default)]
    pub on_entry: Option<ExpressionRef>,

    /// Evaluated just after the band is emitted.
    #[serde(default)]
    pub on_exit: Option<ExpressionRef>,

    #[serde(default)]
    pub settings: BandSettings,
}

impl Band {
    pub fn new(kind: BandKind) -> Self {
        Band {
            kind,
            elements: Vec::new(),
            on_entry: None,
            on_exit: None,
            settings: BandSettings::default(),
        }
    }

    pub fn title() -> Self {
        Band::new(BandKind::Title)
    }

    pub fn summary() -> Self {
        Band::new(BandKind::Summary)
    }

    pub fn group_header(level: usize) -> Self {
        Band::new(BandKind::GroupHeader { level })
    }

    pub fn group_footer(level: usize) -> Self {
        Band::new(BandKind::GroupFooter { level })
    }

    pub fn detail(index: usize) -> Self {
        Band::new(BandKind::Detail { index, target: TargetAlias::None })
    }

    pub fn detail_for(index: usize, target: TargetAlias) -> Self {
        Band::new(BandKind::Detail { index, target })
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_on_entry(mut self, expression: ExpressionRef) -> Self {
        self.on_entry = Some(expression);
        self
    }

    pub fn with_on_exit(mut self, expression: ExpressionRef) -> Self {
        self.on_exit = Some(expression);
        self
    }

    pub fn with_settings(mut self, settings: BandSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn band_type(&self) -> BandType {
        self.kind.band_type()
    }
}
