#![forbid(unsafe_code)]

//! Import and reconciliation core for the Liftport system.
//!
//! This crate provides:
//! - Content-based format detection for uploaded workout exports
//! - Parsers for four formats (native JSON, catalog JSON, Strong CSV, Hevy CSV)
//! - A canonical intermediate representation referencing entities by name
//! - Entity mapping (create-or-reuse decisions against existing entities)
//! - Per-session mapping state with name → destination-ID resolution
//!
//! The pipeline is pure: detection, parsing and mapping perform no I/O,
//! and re-running them over unchanged inputs yields identical decisions.

pub mod types;
pub mod error;
pub mod dates;
pub mod detect;
pub mod csv_import;
pub mod json_import;
pub mod mapping;
pub mod state;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use dates::normalize_date;
pub use detect::{detect_format, parse_upload};
pub use json_import::DEFAULT_WEIGHT_UNIT;
pub use mapping::{
    map_entities, merge_mappings, program_exercise_names, EntityMapping, ExistingEntity,
};
pub use state::{CategorySummary, MappingState, MappingSummary};
pub use config::Config;
