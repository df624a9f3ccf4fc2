//! Entity reconciliation: per-name create-or-reuse decisions.
//!
//! The mapper compares import-side names against entities already known
//! to the destination store. Matching is exact and case-insensitive; no
//! partial, prefix or edit-distance matching is ever performed. Mapping
//! never fails; in the worst case every name is marked for creation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::ParsedProgramAssignment;

/// An entity already known to the destination store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExistingEntity {
    pub id: i64,
    pub name: String,
}

/// One create-or-reuse decision for an import-side name.
///
/// Exactly one of two states holds: a positive `mapped_id` with
/// `create == false`, or `mapped_id == 0` with `create == true`. There
/// is no third state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EntityMapping {
    pub name: String,
    pub mapped_id: i64,
    pub mapped_name: String,
    pub create: bool,
}

/// Map import-side names against existing destination entities, in input
/// order.
///
/// An exact case-insensitive match yields the matched ID and name with
/// `create = false`; a miss yields `mapped_id = 0` with `create = true`.
/// When the existing list contains case-variant duplicate names, the
/// first occurrence wins.
pub fn map_entities(names: &[String], existing: &[ExistingEntity]) -> Vec<EntityMapping> {
    let mut lookup: HashMap<String, &ExistingEntity> = HashMap::new();
    for entity in existing {
        lookup.entry(entity.name.to_lowercase()).or_insert(entity);
    }

    names
        .iter()
        .map(|name| match lookup.get(&name.to_lowercase()) {
            Some(entity) => {
                tracing::debug!("Mapped '{}' to existing entity {}", name, entity.id);
                EntityMapping {
                    name: name.clone(),
                    mapped_id: entity.id,
                    mapped_name: entity.name.clone(),
                    create: false,
                }
            }
            None => {
                tracing::debug!("No match for '{}', marked for creation", name);
                EntityMapping {
                    name: name.clone(),
                    mapped_id: 0,
                    mapped_name: String::new(),
                    create: true,
                }
            }
        })
        .collect()
}

/// Collect every exercise name referenced transitively by the given
/// programs' prescribed sets and progression rules, case-insensitively
/// de-duplicated, in first-seen order.
///
/// This lets exercises that already exist in the destination, but are
/// only referenced (not re-declared) by an imported program, still
/// resolve during mapping.
pub fn program_exercise_names(assignments: &[ParsedProgramAssignment]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    let mut add = |name: &str| {
        if !name.is_empty() && seen.insert(name.to_lowercase()) {
            names.push(name.to_string());
        }
    };

    for assignment in assignments {
        for set in &assignment.program.prescribed_sets {
            add(&set.exercise);
        }
        for rule in &assignment.program.progression_rules {
            add(&rule.exercise);
        }
    }

    names
}

/// Union two mapping lists without duplicating entries for the same name
/// (case-insensitive comparison).
///
/// Entries of `base` are kept as-is; only genuinely new names from
/// `extra` are appended, in `extra`'s order. Merging a list with itself
/// is a no-op.
pub fn merge_mappings(base: Vec<EntityMapping>, extra: Vec<EntityMapping>) -> Vec<EntityMapping> {
    let mut seen: HashSet<String> = base.iter().map(|m| m.name.to_lowercase()).collect();
    let mut merged = base;
    for mapping in extra {
        if seen.insert(mapping.name.to_lowercase()) {
            merged.push(mapping);
        }
    }
    merged
}
