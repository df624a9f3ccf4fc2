//! CSV dialect parsers for Strong and Hevy exports.
//!
//! Both dialects share one algorithm: build a header-name → column-index
//! map, then fold data rows into a first-seen-order exercise list and a
//! date-keyed workout list. File-level problems (no data rows, missing
//! required column, malformed CSV) are hard errors; row-level anomalies
//! (blank date or exercise, unparsable weight/RPE) degrade silently so a
//! single bad line does not block a large export.

use std::collections::{HashMap, HashSet};

use csv::StringRecord;

use crate::dates::normalize_date;
use crate::types::*;
use crate::{Error, Result};

/// Literal marker prepended to the notes of Hevy warmup sets
const WARMUP_MARKER: &str = "[warmup]";

// ============================================================================
// Shared Machinery
// ============================================================================

/// Header-name → column-index lookup built from the header row.
///
/// Column order in the file is irrelevant; unknown extra columns are
/// ignored. A duplicated header name keeps its first column.
struct ColumnMap(HashMap<String, usize>);

impl ColumnMap {
    fn new(header: &StringRecord) -> Self {
        let mut map = HashMap::new();
        for (idx, name) in header.iter().enumerate() {
            map.entry(name.trim().to_string()).or_insert(idx);
        }
        ColumnMap(map)
    }

    /// Fetch a trimmed cell value; a missing column, short row or blank
    /// cell all yield None.
    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let idx = *self.0.get(column)?;
        let value = record.get(idx)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn require(&self, format: &'static str, column: &'static str) -> Result<()> {
        if self.0.contains_key(column) {
            Ok(())
        } else {
            Err(Error::Schema {
                format,
                field: column,
            })
        }
    }
}

/// First-seen-order exercise list, de-duplicated by exact name
#[derive(Default)]
struct ExerciseCollector {
    seen: HashSet<String>,
    exercises: Vec<ParsedExercise>,
}

impl ExerciseCollector {
    fn add(&mut self, name: &str) {
        if self.seen.insert(name.to_string()) {
            self.exercises.push(ParsedExercise {
                name: name.to_string(),
                ..Default::default()
            });
        }
    }
}

/// Read the whole buffer as CSV with lenient quote/row handling.
///
/// Fewer than two rows total (header plus at least one data row) is a
/// hard empty-data error.
fn read_records(format: &'static str, data: &[u8]) -> Result<Vec<StringRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::Decode {
            format,
            source: e.into(),
        })?;
        records.push(record);
    }

    if records.len() < 2 {
        return Err(Error::EmptyData { format });
    }
    Ok(records)
}

/// Assemble a set from raw cell values, applying the shared lenient rules:
/// weight is kept only when it parses strictly positive, zero reps promote
/// to a seconds-based set when a positive duration is present, and RPE is
/// kept only inside [1, 10].
fn build_set(
    exercise: &str,
    set_number: i64,
    weight: Option<&str>,
    reps: Option<&str>,
    seconds: Option<&str>,
    rpe: Option<&str>,
    notes: Option<String>,
) -> ParsedSet {
    let weight = weight
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|w| *w > 0.0);

    let mut reps = reps.and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
    let mut rep_type = REP_TYPE_REPS.to_string();

    if reps == 0 {
        if let Some(duration) = seconds.and_then(|v| v.parse::<i64>().ok()) {
            if duration > 0 {
                reps = duration;
                rep_type = REP_TYPE_SECONDS.to_string();
            }
        }
    }

    let rpe = rpe
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|r| (1.0..=10.0).contains(r));

    ParsedSet {
        exercise: exercise.to_string(),
        set_number,
        weight,
        reps,
        rep_type,
        rpe,
        notes,
    }
}

// ============================================================================
// Strong CSV
// ============================================================================

/// Parse a Strong app CSV export
pub fn parse_strong(data: &[u8]) -> Result<ParsedFile> {
    const FORMAT: &str = "strong_csv";

    let records = read_records(FORMAT, data)?;
    let columns = ColumnMap::new(&records[0]);
    columns.require(FORMAT, "Date")?;
    columns.require(FORMAT, "Exercise Name")?;

    let mut exercises = ExerciseCollector::default();
    let mut workouts = WorkoutCollector::new();
    let mut skipped = 0usize;

    for record in &records[1..] {
        let (date, exercise) = match (
            columns.get(record, "Date"),
            columns.get(record, "Exercise Name"),
        ) {
            (Some(date), Some(exercise)) => (date, exercise),
            // Tolerates trailing/incomplete rows
            _ => {
                skipped += 1;
                continue;
            }
        };

        let date = normalize_date(date);
        exercises.add(exercise);

        if let Some(notes) = columns.get(record, "Workout Notes") {
            workouts.note(&date, notes);
        }

        // Strong's Set Order is already 1-based
        let set_number = match columns
            .get(record, "Set Order")
            .and_then(|v| v.parse::<i64>().ok())
        {
            Some(n) => n,
            None => workouts.set_count(&date) as i64 + 1,
        };

        let set = build_set(
            exercise,
            set_number,
            columns.get(record, "Weight"),
            columns.get(record, "Reps"),
            columns.get(record, "Seconds"),
            columns.get(record, "RPE"),
            columns.get(record, "Notes").map(str::to_string),
        );
        workouts.push_set(&date, set);
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} incomplete rows in {} import", skipped, FORMAT);
    }

    let parsed = ParsedFile {
        exercises: exercises.exercises,
        workouts: workouts.into_workouts(),
        ..Default::default()
    };
    tracing::info!(
        "Parsed {}: {} exercises, {} workouts",
        FORMAT,
        parsed.exercises.len(),
        parsed.workouts.len()
    );
    Ok(parsed)
}

// ============================================================================
// Hevy CSV
// ============================================================================

/// Parse a Hevy app CSV export
pub fn parse_hevy(data: &[u8]) -> Result<ParsedFile> {
    const FORMAT: &str = "hevy_csv";

    let records = read_records(FORMAT, data)?;
    let columns = ColumnMap::new(&records[0]);
    columns.require(FORMAT, "start_time")?;
    columns.require(FORMAT, "exercise_title")?;

    let mut exercises = ExerciseCollector::default();
    let mut workouts = WorkoutCollector::new();
    let mut skipped = 0usize;

    for record in &records[1..] {
        let (date, exercise) = match (
            columns.get(record, "start_time"),
            columns.get(record, "exercise_title"),
        ) {
            (Some(date), Some(exercise)) => (date, exercise),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let date = normalize_date(date);
        exercises.add(exercise);

        if let Some(description) = columns.get(record, "description") {
            workouts.note(&date, description);
        }

        // Hevy's set_index is 0-based
        let set_number = match columns
            .get(record, "set_index")
            .and_then(|v| v.parse::<i64>().ok())
        {
            Some(n) => n + 1,
            None => workouts.set_count(&date) as i64 + 1,
        };

        let notes = hevy_set_notes(
            columns.get(record, "set_type"),
            columns.get(record, "exercise_notes"),
        );

        let set = build_set(
            exercise,
            set_number,
            columns.get(record, "weight_lbs"),
            columns.get(record, "reps"),
            columns.get(record, "duration_seconds"),
            columns.get(record, "rpe"),
            notes,
        );
        workouts.push_set(&date, set);
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} incomplete rows in {} import", skipped, FORMAT);
    }

    let parsed = ParsedFile {
        exercises: exercises.exercises,
        workouts: workouts.into_workouts(),
        ..Default::default()
    };
    tracing::info!(
        "Parsed {}: {} exercises, {} workouts",
        FORMAT,
        parsed.exercises.len(),
        parsed.workouts.len()
    );
    Ok(parsed)
}

/// Compose per-set notes: a warmup set gets the literal marker first,
/// with any exercise-level note appended after it, space-joined.
fn hevy_set_notes(set_type: Option<&str>, exercise_notes: Option<&str>) -> Option<String> {
    let warmup = set_type == Some("warmup");
    match (warmup, exercise_notes) {
        (true, Some(notes)) => Some(format!("{} {}", WARMUP_MARKER, notes)),
        (true, None) => Some(WARMUP_MARKER.to_string()),
        (false, Some(notes)) => Some(notes.to_string()),
        (false, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_only_is_empty_data() {
        let data = b"Date,Exercise Name,Set Order,Weight,Reps\n";
        let result = parse_strong(data);
        assert!(matches!(
            result,
            Err(Error::EmptyData {
                format: "strong_csv"
            })
        ));
    }

    #[test]
    fn test_missing_required_column_names_it() {
        let data = b"Workout Name,Exercise Name,Set Order\nA,Bench Press,1\n";
        match parse_strong(data) {
            Err(Error::Schema { format, field }) => {
                assert_eq!(format, "strong_csv");
                assert_eq!(field, "Date");
            }
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_hevy_missing_required_column() {
        let data = b"title,exercise_title,set_index\nPush Day,Bench Press,0\n";
        match parse_hevy(data) {
            Err(Error::Schema { format, field }) => {
                assert_eq!(format, "hevy_csv");
                assert_eq!(field, "start_time");
            }
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_date_or_exercise_skips_row() {
        let data = b"Date,Exercise Name,Reps\n\
            2024-01-15,Bench Press,5\n\
            ,Squat,3\n\
            2024-01-15,,3\n";
        let parsed = parse_strong(data).unwrap();
        assert_eq!(parsed.exercises.len(), 1);
        assert_eq!(parsed.workouts.len(), 1);
        assert_eq!(parsed.workouts[0].sets.len(), 1);
    }

    #[test]
    fn test_column_order_is_irrelevant() {
        let data = b"Reps,Exercise Name,Date,Weight\n5,Bench Press,2024-01-15,135\n";
        let parsed = parse_strong(data).unwrap();
        assert_eq!(parsed.workouts[0].sets[0].weight, Some(135.0));
        assert_eq!(parsed.workouts[0].sets[0].reps, 5);
    }

    #[test]
    fn test_two_rows_same_date_auto_numbered() {
        let data = b"Date,Exercise Name,Reps\n\
            2024-01-15,Bench Press,5\n\
            2024-01-15,Squat,3\n";
        let parsed = parse_strong(data).unwrap();
        assert_eq!(parsed.workouts.len(), 1);
        let sets = &parsed.workouts[0].sets;
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].set_number, 1);
        assert_eq!(sets[1].set_number, 2);
    }

    #[test]
    fn test_exercise_dedup_is_case_sensitive_first_seen() {
        let data = b"Date,Exercise Name,Reps\n\
            2024-01-15,Bench Press,5\n\
            2024-01-15,bench press,5\n\
            2024-01-16,Bench Press,5\n";
        let parsed = parse_strong(data).unwrap();
        let names: Vec<_> = parsed.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bench Press", "bench press"]);
    }

    #[test]
    fn test_hevy_set_index_is_zero_based() {
        let data = b"start_time,exercise_title,set_index,reps\n\
            15 Jan 2024,Bench Press,0,5\n";
        let parsed = parse_hevy(data).unwrap();
        assert_eq!(parsed.workouts[0].sets[0].set_number, 1);
    }

    #[test]
    fn test_zero_reps_with_duration_promotes_to_seconds() {
        let data = b"Date,Exercise Name,Reps,Seconds\n\
            2024-01-15,Plank,0,45\n";
        let parsed = parse_strong(data).unwrap();
        let set = &parsed.workouts[0].sets[0];
        assert_eq!(set.reps, 45);
        assert_eq!(set.rep_type, REP_TYPE_SECONDS);
    }

    #[test]
    fn test_positive_reps_ignore_duration() {
        let data = b"Date,Exercise Name,Reps,Seconds\n\
            2024-01-15,Bench Press,5,45\n";
        let parsed = parse_strong(data).unwrap();
        let set = &parsed.workouts[0].sets[0];
        assert_eq!(set.reps, 5);
        assert_eq!(set.rep_type, REP_TYPE_REPS);
    }

    #[test]
    fn test_weight_kept_only_when_strictly_positive() {
        let data = b"Date,Exercise Name,Reps,Weight\n\
            2024-01-15,Bench Press,5,135\n\
            2024-01-15,Bench Press,5,0\n\
            2024-01-15,Bench Press,5,-10\n\
            2024-01-15,Bench Press,5,heavy\n";
        let parsed = parse_strong(data).unwrap();
        let sets = &parsed.workouts[0].sets;
        assert_eq!(sets[0].weight, Some(135.0));
        assert_eq!(sets[1].weight, None);
        assert_eq!(sets[2].weight, None);
        assert_eq!(sets[3].weight, None);
    }

    #[test]
    fn test_rpe_bounds_inclusive() {
        let data = b"Date,Exercise Name,Reps,RPE\n\
            2024-01-15,Squat,5,0.5\n\
            2024-01-15,Squat,5,11\n\
            2024-01-15,Squat,5,1\n\
            2024-01-15,Squat,5,10\n";
        let parsed = parse_strong(data).unwrap();
        let sets = &parsed.workouts[0].sets;
        assert_eq!(sets[0].rpe, None);
        assert_eq!(sets[1].rpe, None);
        assert_eq!(sets[2].rpe, Some(1.0));
        assert_eq!(sets[3].rpe, Some(10.0));
    }

    #[test]
    fn test_hevy_warmup_marker() {
        let data = b"start_time,exercise_title,set_index,set_type,reps,exercise_notes\n\
            15 Jan 2024,Bench Press,0,warmup,5,\n\
            15 Jan 2024,Bench Press,1,warmup,5,slow tempo\n\
            15 Jan 2024,Bench Press,2,normal,5,slow tempo\n\
            15 Jan 2024,Bench Press,3,normal,5,\n";
        let parsed = parse_hevy(data).unwrap();
        let sets = &parsed.workouts[0].sets;
        assert_eq!(sets[0].notes.as_deref(), Some("[warmup]"));
        assert_eq!(sets[1].notes.as_deref(), Some("[warmup] slow tempo"));
        assert_eq!(sets[2].notes.as_deref(), Some("slow tempo"));
        assert_eq!(sets[3].notes, None);
    }

    #[test]
    fn test_first_workout_note_wins() {
        let data = b"Date,Exercise Name,Reps,Workout Notes\n\
            2024-01-15,Bench Press,5,felt strong\n\
            2024-01-15,Squat,3,ignored\n";
        let parsed = parse_strong(data).unwrap();
        assert_eq!(parsed.workouts[0].notes.as_deref(), Some("felt strong"));
    }

    #[test]
    fn test_workouts_in_first_seen_date_order() {
        let data = b"Date,Exercise Name,Reps\n\
            2024-02-01,Squat,5\n\
            2024-01-15,Bench Press,5\n";
        let parsed = parse_strong(data).unwrap();
        assert_eq!(parsed.workouts[0].date, "2024-02-01");
        assert_eq!(parsed.workouts[1].date, "2024-01-15");
    }

    #[test]
    fn test_end_to_end_strong_export() {
        let data = b"Date,Workout Name,Exercise Name,Set Order,Weight,Reps,RPE\n\
            2024-01-15 08:00:00,Morning,Bench Press,1,135,5,\n\
            2024-01-15 08:00:00,Morning,Bench Press,2,155,5,\n\
            2024-01-15 08:00:00,Morning,Squat,1,225,3,8\n";
        let parsed = parse_strong(data).unwrap();

        assert_eq!(parsed.exercises.len(), 2);
        assert_eq!(parsed.workouts.len(), 1);

        let workout = &parsed.workouts[0];
        assert_eq!(workout.date, "2024-01-15");
        assert_eq!(workout.sets.len(), 3);

        let squat = workout
            .sets
            .iter()
            .find(|s| s.exercise == "Squat")
            .unwrap();
        assert_eq!(squat.rpe, Some(8.0));
        assert_eq!(squat.weight, Some(225.0));
    }

    #[test]
    fn test_malformed_csv_is_decode_error() {
        // Invalid UTF-8 trips the underlying reader
        let mut data = b"Date,Exercise Name,Reps\n".to_vec();
        data.extend_from_slice(&[0xFF, 0xFE]);
        data.extend_from_slice(b",Bench Press,5\n");
        match parse_strong(&data) {
            Err(Error::Decode { format, .. }) => assert_eq!(format, "strong_csv"),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }
}
