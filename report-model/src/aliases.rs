//! FILENAME: report-model/src/aliases.rs
//! PURPOSE: Tracks which relation each relation is derived from.
//! CONTEXT: Detail bands name a relation as their target alias. A relation
//! may in turn be derived from another relation. Following those links must
//! always end at the driving source; a chain that loops back on itself makes
//! the detail iteration undefined and is rejected at validation time.
//!
//! TERMINOLOGY:
//! - Source: the relation a relation is derived from. If `lines` is derived
//!   from `orders`, then `orders` is the source of `lines`.
//! - Root: a relation without a source (derived from the driving record).

use rustc_hash::{FxHashMap, FxHashSet};
use crate::definition::RelationDefinition;
use crate::error::AliasCycleError;

/// Directed graph of relation -> source links.
#[derive(Debug, Default)]
pub struct AliasGraph {
    /// For each relation, the relation it is derived from (if any).
    sources: FxHashMap<String, String>,

    /// Every declared relation name, roots included.
    known: FxHashSet<String>,
}

impl AliasGraph {
    /// Creates a new, empty alias graph.
    pub fn new() -> Self {
        AliasGraph {
            sources: FxHashMap::default(),
            known: FxHashSet::default(),
        }
    }

    /// Builds the graph from declared relations.
    pub fn from_relations(relations: &[RelationDefinition]) -> Self {
        let mut graph = AliasGraph::new();
        for relation in relations {
            graph.add_relation(&relation.name, relation.source.as_deref());
        }
        graph
    }

    /// Declares a relation, replacing any previous source link.
    pub fn add_relation(&mut self, name: &str, source: Option<&str>) {
        self.known.insert(name.to_string());
        match source {
            Some(src) => {
                self.sources.insert(name.to_string(), src.to_string());
            }
            None => {
                self.sources.remove(name);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// Returns the direct source of a relation.
    pub fn source_of(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(String::as_str)
    }

    /// Follows source links from `start` and returns the first loop found.
    ///
    /// The returned path starts and ends with the same relation name, e.g.
    /// `["a", "b", "a"]`. A chain that ends at a root (or at an undeclared
    /// name) has no loop.
    pub fn find_cycle(&self, start: &str) -> Option<AliasCycleError> {
        let mut path: Vec<&str> = vec![start];
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        visited.insert(start);

        let mut current = start;
        while let Some(next) = self.source_of(current) {
            if visited.contains(next) {
                // Trim the lead-in so the path shows only the loop itself
                let loop_start = path.iter().position(|n| *n == next).unwrap_or(0);
                let mut cycle_path: Vec<String> =
                    path[loop_start..].iter().map(|s| s.to_string()).collect();
                cycle_path.push(next.to_string());
                return Some(AliasCycleError { cycle_path });
            }
            visited.insert(next);
            path.push(next);
            current = next;
        }

        None
    }
}
