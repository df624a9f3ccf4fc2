//! Per-import-session mapping state.
//!
//! A [`MappingState`] is created once an upload is parsed, mutated only
//! by building or merging mapping entries during the review phase, and
//! consumed read-only by the external apply step. Nothing is shared
//! across sessions; a new upload starts a fresh state.

use serde::{Deserialize, Serialize};

use crate::json_import::DEFAULT_WEIGHT_UNIT;
use crate::mapping::{
    map_entities, merge_mappings, program_exercise_names, EntityMapping, ExistingEntity,
};
use crate::types::{ImportFormat, ParsedFile};

/// Aggregate of all mapping decisions for one upload, plus the retained
/// parsed file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MappingState {
    pub format: ImportFormat,
    pub weight_unit: String,
    pub exercises: Vec<EntityMapping>,
    pub equipment: Vec<EntityMapping>,
    pub programs: Vec<EntityMapping>,
    pub parsed: ParsedFile,
}

/// Reuse/create counts for one mappable category
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub reuse: usize,
    pub create: usize,
}

/// Per-category counts for review output
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingSummary {
    pub exercises: CategorySummary,
    pub equipment: CategorySummary,
    pub programs: CategorySummary,
}

impl MappingState {
    /// Wrap a freshly parsed upload, with empty mapping lists
    pub fn new(format: ImportFormat, parsed: ParsedFile) -> Self {
        let weight_unit = parsed
            .weight_unit
            .clone()
            .unwrap_or_else(|| DEFAULT_WEIGHT_UNIT.to_string());
        Self {
            format,
            weight_unit,
            exercises: Vec::new(),
            equipment: Vec::new(),
            programs: Vec::new(),
            parsed,
        }
    }

    /// Build all three mapping lists against the caller-supplied snapshot
    /// of existing destination entities.
    ///
    /// The exercise list covers both declared exercises and exercises
    /// referenced only by imported programs.
    pub fn build_mappings(
        &mut self,
        existing_exercises: &[ExistingEntity],
        existing_equipment: &[ExistingEntity],
        existing_programs: &[ExistingEntity],
    ) {
        let declared: Vec<String> = self
            .parsed
            .exercises
            .iter()
            .map(|e| e.name.clone())
            .collect();
        let referenced = program_exercise_names(&self.parsed.program_assignments);

        self.exercises = merge_mappings(
            map_entities(&declared, existing_exercises),
            map_entities(&referenced, existing_exercises),
        );

        let equipment_names: Vec<String> = self
            .parsed
            .equipment
            .iter()
            .map(|e| e.name.clone())
            .collect();
        self.equipment = map_entities(&equipment_names, existing_equipment);

        let program_names: Vec<String> = self
            .parsed
            .program_assignments
            .iter()
            .map(|a| a.program.name.clone())
            .collect();
        self.programs = map_entities(&program_names, existing_programs);

        let summary = self.summary();
        tracing::info!(
            "Built mappings: {} exercises ({} new), {} equipment ({} new), {} programs ({} new)",
            self.exercises.len(),
            summary.exercises.create,
            self.equipment.len(),
            summary.equipment.create,
            self.programs.len(),
            summary.programs.create
        );
    }

    /// Merge additional exercise mappings into the session
    pub fn merge_exercises(&mut self, extra: Vec<EntityMapping>) {
        self.exercises = merge_mappings(std::mem::take(&mut self.exercises), extra);
    }

    /// Merge additional equipment mappings into the session
    pub fn merge_equipment(&mut self, extra: Vec<EntityMapping>) {
        self.equipment = merge_mappings(std::mem::take(&mut self.equipment), extra);
    }

    /// Merge additional program mappings into the session
    pub fn merge_programs(&mut self, extra: Vec<EntityMapping>) {
        self.programs = merge_mappings(std::mem::take(&mut self.programs), extra);
    }

    /// Resolve an exercise name to its mapped destination ID
    pub fn resolve_exercise(&self, name: &str) -> i64 {
        resolve(&self.exercises, name)
    }

    /// Resolve an equipment name to its mapped destination ID
    pub fn resolve_equipment(&self, name: &str) -> i64 {
        resolve(&self.equipment, name)
    }

    /// Resolve a program name to its mapped destination ID
    pub fn resolve_program(&self, name: &str) -> i64 {
        resolve(&self.programs, name)
    }

    /// Reuse/create counts per category, for review output
    pub fn summary(&self) -> MappingSummary {
        MappingSummary {
            exercises: summarize(&self.exercises),
            equipment: summarize(&self.equipment),
            programs: summarize(&self.programs),
        }
    }
}

/// Case-insensitive name → destination ID lookup.
///
/// An unmapped name resolves to 0, the sentinel meaning "do not write
/// this reference" — never a valid destination ID.
fn resolve(mappings: &[EntityMapping], name: &str) -> i64 {
    let folded = name.to_lowercase();
    mappings
        .iter()
        .find(|m| m.name.to_lowercase() == folded)
        .map(|m| m.mapped_id)
        .unwrap_or(0)
}

fn summarize(mappings: &[EntityMapping]) -> CategorySummary {
    let create = mappings.iter().filter(|m| m.create).count();
    CategorySummary {
        reuse: mappings.len() - create,
        create,
    }
}
