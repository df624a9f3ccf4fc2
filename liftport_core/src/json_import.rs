//! JSON parsers for the native per-athlete export and the catalog dialect.
//!
//! The native format decodes a full export (profile, equipment,
//! assignments, training maxes, body weights, workouts, programs); the
//! catalog format is a narrower, athlete-independent document of
//! definitions. Both feed the same downstream mapping path.

use serde::Deserialize;

use crate::types::*;
use crate::{Error, Result};

/// Weight unit assumed when an export carries none
pub const DEFAULT_WEIGHT_UNIT: &str = "lbs";

// ============================================================================
// Native Export
// ============================================================================

/// Wire layout of the native per-athlete export
#[derive(Debug, Deserialize)]
struct NativeExport {
    #[serde(default)]
    version: String,
    #[serde(default)]
    weight_unit: Option<String>,
    #[serde(default)]
    profile: Option<ParsedProfile>,
    #[serde(default)]
    exercises: Vec<ParsedExercise>,
    #[serde(default)]
    equipment: Vec<ParsedEquipment>,
    #[serde(default)]
    athlete_equipment: Vec<String>,
    #[serde(default)]
    exercise_assignments: Vec<String>,
    #[serde(default)]
    training_maxes: Vec<ParsedTrainingMax>,
    #[serde(default)]
    body_weights: Vec<ParsedBodyWeight>,
    #[serde(default)]
    workouts: Vec<ParsedWorkout>,
    #[serde(default)]
    program_assignments: Vec<ParsedProgramAssignment>,
}

/// Parse a native JSON export.
///
/// The top-level `version` field is the format's only mandatory
/// discriminator; a missing `weight_unit` defaults to `"lbs"` and sets
/// missing an explicit `rep_type` default to `"reps"`.
pub fn parse_native(data: &[u8]) -> Result<ParsedFile> {
    const FORMAT: &str = "native";

    let export: NativeExport = serde_json::from_slice(data).map_err(|e| Error::Decode {
        format: FORMAT,
        source: e.into(),
    })?;

    if export.version.is_empty() {
        return Err(Error::Schema {
            format: FORMAT,
            field: "version",
        });
    }

    // Fold workouts through the date-keyed collector so at most one
    // workout per distinct date holds for this format too.
    let mut workouts = WorkoutCollector::new();
    for workout in export.workouts {
        if let Some(ref notes) = workout.notes {
            workouts.note(&workout.date, notes);
        }
        for set in workout.sets {
            workouts.push_set(&workout.date, set);
        }
    }

    let parsed = ParsedFile {
        exercises: export.exercises,
        equipment: export.equipment,
        workouts: workouts.into_workouts(),
        body_weights: export.body_weights,
        training_maxes: export.training_maxes,
        profile: export.profile,
        weight_unit: Some(
            export
                .weight_unit
                .unwrap_or_else(|| DEFAULT_WEIGHT_UNIT.to_string()),
        ),
        athlete_equipment: export.athlete_equipment,
        exercise_assignments: export.exercise_assignments,
        program_assignments: export.program_assignments,
    };

    tracing::info!(
        "Parsed native export v{}: {} exercises, {} workouts, {} programs",
        export.version,
        parsed.exercises.len(),
        parsed.workouts.len(),
        parsed.program_assignments.len()
    );
    Ok(parsed)
}

// ============================================================================
// Catalog Export
// ============================================================================

/// Wire layout of the catalog document
#[derive(Debug, Deserialize)]
struct CatalogExport {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    equipment: Vec<ParsedEquipment>,
    #[serde(default)]
    exercises: Vec<ParsedExercise>,
    #[serde(default)]
    programs: Vec<ParsedProgram>,
}

/// Parse a catalog JSON document.
///
/// Hard-fails unless the top-level `type` field is literally `"catalog"`.
pub fn parse_catalog(data: &[u8]) -> Result<ParsedFile> {
    const FORMAT: &str = "catalog";

    let export: CatalogExport = serde_json::from_slice(data).map_err(|e| Error::Decode {
        format: FORMAT,
        source: e.into(),
    })?;

    if export.kind != "catalog" {
        return Err(Error::Schema {
            format: FORMAT,
            field: "type",
        });
    }

    // Templates ride in the same assignment container the native format
    // uses, without start-date or activation fields.
    let program_assignments = export
        .programs
        .into_iter()
        .map(|program| ParsedProgramAssignment {
            program,
            start_date: None,
            active: false,
        })
        .collect::<Vec<_>>();

    let parsed = ParsedFile {
        exercises: export.exercises,
        equipment: export.equipment,
        program_assignments,
        ..Default::default()
    };

    tracing::info!(
        "Parsed catalog: {} exercises, {} equipment, {} programs",
        parsed.exercises.len(),
        parsed.equipment.len(),
        parsed.program_assignments.len()
    );
    Ok(parsed)
}
