//! Canonical intermediate representation for imported workout data.
//!
//! Every format parser produces a [`ParsedFile`]. All entity references
//! inside a parsed file are by name (string), never by destination ID;
//! IDs are assigned only during mapping and apply.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Import Formats
// ============================================================================

/// Source format of an uploaded file
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportFormat {
    Native,
    Catalog,
    StrongCsv,
    HevyCsv,
    Unknown,
}

impl ImportFormat {
    /// Short name used in errors and log output
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportFormat::Native => "native",
            ImportFormat::Catalog => "catalog",
            ImportFormat::StrongCsv => "strong_csv",
            ImportFormat::HevyCsv => "hevy_csv",
            ImportFormat::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Rep Types
// ============================================================================

// How a set's numeric `reps` field is interpreted. Known wire values;
// unknown values pass through unmodified, so the field stays a string.
pub const REP_TYPE_REPS: &str = "reps";
pub const REP_TYPE_EACH_SIDE: &str = "each_side";
pub const REP_TYPE_SECONDS: &str = "seconds";
pub const REP_TYPE_DISTANCE: &str = "distance";

pub(crate) fn default_rep_type() -> String {
    REP_TYPE_REPS.to_string()
}

// ============================================================================
// Entity Types
// ============================================================================

/// An exercise definition
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedExercise {
    pub name: String,
    #[serde(default)]
    pub tier: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rest_seconds: Option<i64>,
    /// Equipment references, by name
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// A piece of equipment
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedEquipment {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One performed set within a workout
///
/// `weight` is retained only when it parsed strictly positive; zero or
/// negative weight is indistinguishable from "not provided". A
/// duration-based hold carries its seconds in `reps`, discriminated only
/// by `rep_type`. Both are inherited wire conventions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedSet {
    /// Exercise reference, by name
    pub exercise: String,
    /// 1-based position within the workout
    pub set_number: i64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: i64,
    #[serde(default = "default_rep_type")]
    pub rep_type: String,
    #[serde(default)]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A workout: all sets performed on one date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedWorkout {
    /// Normalized `YYYY-MM-DD` date
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sets: Vec<ParsedSet>,
}

/// A body-weight entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedBodyWeight {
    pub date: String,
    pub weight: f64,
}

/// A training-max entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedTrainingMax {
    /// Exercise reference, by name
    pub exercise: String,
    pub weight: f64,
    #[serde(default)]
    pub date: Option<String>,
}

/// Athlete profile carried by the native export
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedProfile {
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// Program Types
// ============================================================================

/// One prescribed set within a program template
///
/// `reps = None` means AMRAP. `percentage` (of training max) and absolute
/// `weight` are optional; absent is distinct from present-and-zero.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedPrescribedSet {
    /// Exercise reference, by name
    pub exercise: String,
    pub week: i64,
    pub day: i64,
    pub set_number: i64,
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default = "default_rep_type")]
    pub rep_type: String,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// A weight-progression rule attached to a program template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedProgressionRule {
    /// Exercise reference, by name
    pub exercise: String,
    #[serde(default)]
    pub increment: Option<f64>,
    #[serde(default)]
    pub interval_weeks: Option<i64>,
}

/// A program template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedProgram {
    pub name: String,
    pub weeks: i64,
    pub days_per_week: i64,
    /// Whether the program repeats after its last week
    #[serde(default, rename = "loop")]
    pub loops: bool,
    #[serde(default)]
    pub prescribed_sets: Vec<ParsedPrescribedSet>,
    #[serde(default)]
    pub progression_rules: Vec<ParsedProgressionRule>,
}

/// A program assignment wrapping one template
///
/// The catalog format produces assignments without start-date or
/// activation; those fields are native-only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParsedProgramAssignment {
    pub program: ParsedProgram,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub active: bool,
}

// ============================================================================
// Parsed File
// ============================================================================

/// The canonical intermediate representation for one uploaded document
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedFile {
    #[serde(default)]
    pub exercises: Vec<ParsedExercise>,
    #[serde(default)]
    pub equipment: Vec<ParsedEquipment>,
    #[serde(default)]
    pub workouts: Vec<ParsedWorkout>,
    #[serde(default)]
    pub body_weights: Vec<ParsedBodyWeight>,
    #[serde(default)]
    pub training_maxes: Vec<ParsedTrainingMax>,
    #[serde(default)]
    pub profile: Option<ParsedProfile>,
    #[serde(default)]
    pub weight_unit: Option<String>,
    /// Equipment the athlete owns, by name
    #[serde(default)]
    pub athlete_equipment: Vec<String>,
    /// Exercises assigned to the athlete, by name
    #[serde(default)]
    pub exercise_assignments: Vec<String>,
    #[serde(default)]
    pub program_assignments: Vec<ParsedProgramAssignment>,
}

// ============================================================================
// Workout Collector
// ============================================================================

/// Insertion-ordered workout builder keyed by normalized date.
///
/// A plain hash map does not guarantee iteration order, so the map is
/// paired with an ordered key list. At most one workout exists per
/// distinct date; sets are appended in first-encountered order and the
/// final workout list follows first-appearance order of dates, not
/// calendar order.
#[derive(Debug, Default)]
pub struct WorkoutCollector {
    by_date: HashMap<String, ParsedWorkout>,
    order: Vec<String>,
}

impl WorkoutCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the workout for a date
    fn workout_mut(&mut self, date: &str) -> &mut ParsedWorkout {
        if !self.by_date.contains_key(date) {
            self.order.push(date.to_string());
        }
        self.by_date
            .entry(date.to_string())
            .or_insert_with(|| ParsedWorkout {
                date: date.to_string(),
                notes: None,
                sets: Vec::new(),
            })
    }

    /// Record workout notes for a date; the first non-empty value wins
    pub fn note(&mut self, date: &str, notes: &str) {
        if notes.is_empty() {
            return;
        }
        let workout = self.workout_mut(date);
        if workout.notes.is_none() {
            workout.notes = Some(notes.to_string());
        }
    }

    /// Append a set to the workout for a date
    pub fn push_set(&mut self, date: &str, set: ParsedSet) {
        self.workout_mut(date).sets.push(set);
    }

    /// Count of sets already recorded for a date, for auto-numbering
    pub fn set_count(&self, date: &str) -> usize {
        self.by_date.get(date).map(|w| w.sets.len()).unwrap_or(0)
    }

    /// Drain into the final workout list, in first-appearance date order
    pub fn into_workouts(self) -> Vec<ParsedWorkout> {
        let WorkoutCollector { mut by_date, order } = self;
        order.iter().filter_map(|d| by_date.remove(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(exercise: &str, number: i64) -> ParsedSet {
        ParsedSet {
            exercise: exercise.into(),
            set_number: number,
            weight: None,
            reps: 5,
            rep_type: REP_TYPE_REPS.into(),
            rpe: None,
            notes: None,
        }
    }

    #[test]
    fn test_collector_one_workout_per_date() {
        let mut collector = WorkoutCollector::new();
        collector.push_set("2024-01-15", set("Bench Press", 1));
        collector.push_set("2024-01-15", set("Squat", 2));

        let workouts = collector.into_workouts();
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].sets.len(), 2);
    }

    #[test]
    fn test_collector_preserves_first_seen_date_order() {
        let mut collector = WorkoutCollector::new();
        collector.push_set("2024-02-01", set("Squat", 1));
        collector.push_set("2024-01-15", set("Bench Press", 1));
        collector.push_set("2024-02-01", set("Squat", 2));

        let workouts = collector.into_workouts();
        assert_eq!(workouts.len(), 2);
        // First-appearance order, not calendar order
        assert_eq!(workouts[0].date, "2024-02-01");
        assert_eq!(workouts[1].date, "2024-01-15");
    }

    #[test]
    fn test_collector_first_note_wins() {
        let mut collector = WorkoutCollector::new();
        collector.note("2024-01-15", "morning session");
        collector.note("2024-01-15", "ignored later note");

        let workouts = collector.into_workouts();
        assert_eq!(workouts[0].notes.as_deref(), Some("morning session"));
    }

    #[test]
    fn test_collector_empty_note_ignored() {
        let mut collector = WorkoutCollector::new();
        collector.note("2024-01-15", "");
        collector.push_set("2024-01-15", set("Squat", 1));

        let workouts = collector.into_workouts();
        assert_eq!(workouts[0].notes, None);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ImportFormat::StrongCsv.as_str(), "strong_csv");
        assert_eq!(ImportFormat::Native.to_string(), "native");
    }

    #[test]
    fn test_parsed_set_defaults_on_deserialize() {
        let json = r#"{"exercise": "Plank", "set_number": 1}"#;
        let set: ParsedSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.rep_type, REP_TYPE_REPS);
        assert_eq!(set.reps, 0);
        assert_eq!(set.weight, None);
    }
}
