//! Content-based format detection for uploaded files.
//!
//! Formats are always detected from content, never trusted from a
//! transport-level content-type hint. An unrecognized buffer is a
//! terminal classification failure; no guessing beyond these rules.

use crate::{csv_import, json_import, Error, ImportFormat, ParsedFile, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Window inspected for the JSON catalog discriminator substrings
const SNIFF_WINDOW: usize = 200;

/// Header names that identify a Strong app CSV export
const STRONG_MARKERS: &[&str] = &["Exercise Name", "Set Order", "Weight", "Reps"];

/// Header names that identify a Hevy app CSV export
const HEVY_MARKERS: &[&str] = &["exercise_title", "set_index", "weight_lbs", "reps"];

/// Strip a leading UTF-8 BOM if present
fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// Classify a raw byte buffer into one of the known import formats.
///
/// The JSON dialect sniff is substring-based (`"type"` and `"catalog"`
/// within the first 200 bytes) rather than a full structural decode;
/// false positives are theoretically possible when unrelated leading
/// content contains both substrings.
pub fn detect_format(data: &[u8]) -> ImportFormat {
    let data = strip_bom(data);
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let data = &data[start..];

    if data.first() == Some(&b'{') {
        let window = String::from_utf8_lossy(&data[..data.len().min(SNIFF_WINDOW)]);
        if window.contains("\"type\"") && window.contains("\"catalog\"") {
            return ImportFormat::Catalog;
        }
        return ImportFormat::Native;
    }

    let line_end = data
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(data.len());
    let header = String::from_utf8_lossy(&data[..line_end]);

    if STRONG_MARKERS.iter().all(|m| header.contains(m)) {
        return ImportFormat::StrongCsv;
    }
    if HEVY_MARKERS.iter().all(|m| header.contains(m)) {
        return ImportFormat::HevyCsv;
    }

    ImportFormat::Unknown
}

/// Detect the format of an uploaded file and parse it in one step.
///
/// Returns the detected format together with the parsed file, or
/// [`Error::Format`] when the buffer matches no known format.
pub fn parse_upload(data: &[u8]) -> Result<(ImportFormat, ParsedFile)> {
    let format = detect_format(data);
    tracing::info!("Detected import format: {}", format);

    let data = strip_bom(data);
    let parsed = match format {
        ImportFormat::Native => json_import::parse_native(data)?,
        ImportFormat::Catalog => json_import::parse_catalog(data)?,
        ImportFormat::StrongCsv => csv_import::parse_strong(data)?,
        ImportFormat::HevyCsv => csv_import::parse_hevy(data)?,
        ImportFormat::Unknown => return Err(Error::Format),
    };

    Ok((format, parsed))
}
