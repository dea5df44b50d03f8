//! FILENAME: report-model/src/validate.rs
//! PURPOSE: Validates a report definition and builds its index-addressed band tree.
//! CONTEXT: Definitions arrive already validated by the DSL layer, but the
//! engine re-checks every invariant before a run so that a broken definition
//! fails as a whole instead of producing a partial report.

use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};
use crate::aliases::AliasGraph;
use crate::band::{BandKind, BandType, TargetAlias};
use crate::definition::{ReportDefinition, DRIVING_ALIAS, MAX_GROUP_LEVELS};
use crate::error::DefinitionError;
use crate::variable::VariableScope;

/// Per-level band slots. Most reports nest only a few levels deep.
pub type LevelSlots = SmallVec<[Option<usize>; 8]>;

/// How a detail band obtains its rows, resolved against the declared relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// Once per driving record.
    PerRecord,
    /// Once per driving record, reusing it as the row.
    Driving,
    /// Once per child row of a relation.
    Relation { alias: String, required: bool },
}

/// A detail band with its resolved target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSlot {
    /// Position among the detail bands.
    pub index: usize,
    /// Index into `ReportDefinition::bands`.
    pub band: usize,
    pub target: ResolvedTarget,
}

/// Read-only lookup structure over a validated definition.
/// All band references are indices into `ReportDefinition::bands`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTree {
    title: Option<usize>,
    page_header: Option<usize>,
    column_header: Option<usize>,
    column_footer: Option<usize>,
    page_footer: Option<usize>,
    summary: Option<usize>,
    group_headers: LevelSlots,
    group_footers: LevelSlots,
    details: Vec<DetailSlot>,
}

impl BandTree {
    /// Looks up the band of a singleton type (Title, Summary, page/column frame).
    /// Group and detail bands are looked up by level or index instead.
    pub fn band(&self, band_type: BandType) -> Option<usize> {
        match band_type {
            BandType::Title => self.title,
            BandType::PageHeader => self.page_header,
            BandType::ColumnHeader => self.column_header,
            BandType::ColumnFooter => self.column_footer,
            BandType::PageFooter => self.page_footer,
            BandType::Summary => self.summary,
            BandType::GroupHeader | BandType::GroupFooter | BandType::Detail => None,
        }
    }

    /// Resolves any band kind to its definition index, if the report declares one.
    pub fn band_for(&self, kind: &BandKind) -> Option<usize> {
        match kind {
            BandKind::GroupHeader { level } => self.group_header(*level),
            BandKind::GroupFooter { level } => self.group_footer(*level),
            BandKind::Detail { index, .. } => self.details.get(*index).map(|d| d.band),
            other => self.band(other.band_type()),
        }
    }

    /// Number of declared group levels.
    pub fn level_count(&self) -> usize {
        self.group_headers.len()
    }

    pub fn group_header(&self, level: usize) -> Option<usize> {
        self.group_headers.get(level).copied().flatten()
    }

    pub fn group_footer(&self, level: usize) -> Option<usize> {
        self.group_footers.get(level).copied().flatten()
    }

    /// Detail bands in declared order.
    pub fn details(&self) -> &[DetailSlot] {
        &self.details
    }
}

impl ReportDefinition {
    /// Checks every band-tree invariant and returns the lookup tree.
    pub fn validate(&self) -> Result<BandTree, DefinitionError> {
        let level_count = self.groups.len();
        if level_count > MAX_GROUP_LEVELS {
            return Err(DefinitionError::TooManyGroupLevels {
                count: level_count,
                max: MAX_GROUP_LEVELS,
            });
        }
        for (expected, group) in self.groups.iter().enumerate() {
            if group.level != expected {
                return Err(DefinitionError::GroupLevelGap {
                    expected,
                    found: group.level,
                });
            }
        }

        let mut tree = BandTree {
            title: None,
            page_header: None,
            column_header: None,
            column_footer: None,
            page_footer: None,
            summary: None,
            group_headers: smallvec![None; level_count],
            group_footers: smallvec![None; level_count],
            details: Vec::new(),
        };

        let mut detail_bands: Vec<(usize, usize, &TargetAlias)> = Vec::new();

        for (band_index, band) in self.bands.iter().enumerate() {
            match &band.kind {
                BandKind::GroupHeader { level } | BandKind::GroupFooter { level } => {
                    let band_type = band.band_type();
                    let slots = if band_type == BandType::GroupHeader {
                        &mut tree.group_headers
                    } else {
                        &mut tree.group_footers
                    };
                    let slot = slots.get_mut(*level).ok_or(DefinitionError::UnknownGroupLevel {
                        band: band_type,
                        level: *level,
                    })?;
                    if slot.is_some() {
                        return Err(DefinitionError::DuplicateGroupBand {
                            band: band_type,
                            level: *level,
                        });
                    }
                    *slot = Some(band_index);
                }
                BandKind::Detail { index, target } => {
                    detail_bands.push((*index, band_index, target));
                }
                singleton => {
                    let slot = match singleton.band_type() {
                        BandType::Title => &mut tree.title,
                        BandType::PageHeader => &mut tree.page_header,
                        BandType::ColumnHeader => &mut tree.column_header,
                        BandType::ColumnFooter => &mut tree.column_footer,
                        BandType::PageFooter => &mut tree.page_footer,
                        _ => &mut tree.summary,
                    };
                    if slot.is_some() {
                        return Err(DefinitionError::DuplicateBand(singleton.band_type()));
                    }
                    *slot = Some(band_index);
                }
            }
        }

        let aliases = self.validate_relations()?;

        // Detail bands: contiguous indices, then target resolution
        detail_bands.sort_by_key(|(index, _, _)| *index);
        for (expected, (index, band_index, target)) in detail_bands.into_iter().enumerate() {
            if index != expected {
                return Err(DefinitionError::DetailIndexGap {
                    expected,
                    found: index,
                });
            }
            let target = self.resolve_target(index, target, &aliases)?;
            tree.details.push(DetailSlot {
                index,
                band: band_index,
                target,
            });
        }

        self.validate_variables(&tree)?;

        Ok(tree)
    }

    fn validate_relations(&self) -> Result<AliasGraph, DefinitionError> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for relation in &self.relations {
            if relation.name == DRIVING_ALIAS {
                return Err(DefinitionError::ReservedRelationName(relation.name.clone()));
            }
            if !seen.insert(relation.name.as_str()) {
                return Err(DefinitionError::DuplicateRelation(relation.name.clone()));
            }
        }
        for relation in &self.relations {
            if let Some(source) = relation.source.as_deref() {
                if source != DRIVING_ALIAS && !seen.contains(source) {
                    return Err(DefinitionError::UnknownRelationSource {
                        relation: relation.name.clone(),
                        parent: source.to_string(),
                    });
                }
            }
        }
        Ok(AliasGraph::from_relations(&self.relations))
    }

    fn resolve_target(
        &self,
        index: usize,
        target: &TargetAlias,
        aliases: &AliasGraph,
    ) -> Result<ResolvedTarget, DefinitionError> {
        match target {
            TargetAlias::None => Ok(ResolvedTarget::PerRecord),
            TargetAlias::Driving => {
                if index != 0 {
                    return Err(DefinitionError::DrivingAliasNotFirst { index });
                }
                Ok(ResolvedTarget::Driving)
            }
            TargetAlias::Relation(alias) if alias == DRIVING_ALIAS => {
                self.resolve_target(index, &TargetAlias::Driving, aliases)
            }
            TargetAlias::Relation(alias) => {
                if !aliases.contains(alias) {
                    return Err(DefinitionError::UnknownRelation {
                        index,
                        alias: alias.clone(),
                    });
                }
                if let Some(cycle) = aliases.find_cycle(alias) {
                    return Err(DefinitionError::TargetAliasCycle(cycle));
                }
                let required = self.relation(alias).map_or(false, |r| r.required);
                Ok(ResolvedTarget::Relation {
                    alias: alias.clone(),
                    required,
                })
            }
        }
    }

    fn validate_variables(&self, tree: &BandTree) -> Result<(), DefinitionError> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for variable in &self.variables {
            if !seen.insert(variable.name.as_str()) {
                return Err(DefinitionError::DuplicateVariable(variable.name.clone()));
            }
            let scope_exists = match variable.scope {
                VariableScope::Detail(index) => index < tree.details.len(),
                VariableScope::Group(level) => level < tree.level_count(),
                VariableScope::Page | VariableScope::Report => true,
            };
            if !scope_exists {
                return Err(DefinitionError::UnknownVariableScope {
                    name: variable.name.clone(),
                    scope: variable.scope,
                });
            }
        }
        Ok(())
    }
}
