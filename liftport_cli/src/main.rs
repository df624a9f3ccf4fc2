use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use liftport_core::*;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "liftport")]
#[command(about = "Workout export import and reconciliation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the format of an export file
    Detect {
        /// Export file to classify
        file: PathBuf,
    },

    /// Parse an export file into the canonical representation
    Parse {
        /// Export file to parse
        file: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Also store the result as a pending-import record
        #[arg(long)]
        store: bool,
    },

    /// Produce create-or-reuse mapping decisions for an export file
    Map {
        /// Export file to parse and map
        file: PathBuf,

        /// JSON snapshot of existing destination entities
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Existing-entity snapshot supplied by the operator
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    exercises: Vec<ExistingEntity>,
    #[serde(default)]
    equipment: Vec<ExistingEntity>,
    #[serde(default)]
    programs: Vec<ExistingEntity>,
}

/// Review-facing mapping output: the three decision lists plus counts
#[derive(Serialize)]
struct MapOutput<'a> {
    format: ImportFormat,
    weight_unit: &'a str,
    exercises: &'a [EntityMapping],
    equipment: &'a [EntityMapping],
    programs: &'a [EntityMapping],
    summary: MappingSummary,
}

fn main() -> Result<()> {
    // Initialize logging
    liftport_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Detect { file } => cmd_detect(&file),
        Commands::Parse {
            file,
            pretty,
            store,
        } => cmd_parse(&file, pretty, store, &data_dir),
        Commands::Map {
            file,
            snapshot,
            pretty,
        } => cmd_map(&file, snapshot.as_deref(), pretty, &config),
    }
}

fn cmd_detect(file: &Path) -> Result<()> {
    let data = fs::read(file)?;
    let format = detect_format(&data);
    println!("{}", format);

    if format == ImportFormat::Unknown {
        return Err(Error::Format);
    }
    Ok(())
}

fn cmd_parse(file: &Path, pretty: bool, store: bool, data_dir: &Path) -> Result<()> {
    let data = fs::read(file)?;
    let (format, parsed) = parse_upload(&data)?;
    tracing::info!("Parsed {:?} as {}", file, format);

    let json = render_json(&parsed, pretty)?;
    println!("{}", json);

    if store {
        let pending_dir = data_dir.join("pending");
        fs::create_dir_all(&pending_dir)?;

        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        let out_path = pending_dir.join(format!("{}.json", stem));
        fs::write(&out_path, &json)?;
        tracing::info!("Stored pending import at {:?}", out_path);
    }

    Ok(())
}

fn cmd_map(file: &Path, snapshot: Option<&Path>, pretty: bool, config: &Config) -> Result<()> {
    let data = fs::read(file)?;
    let (format, parsed) = parse_upload(&data)?;
    let snapshot = load_snapshot(snapshot)?;

    let mut state = MappingState::new(format, parsed);
    if state.parsed.weight_unit.is_none() {
        // CSV uploads carry no unit tag; fall back to the configured unit
        state.weight_unit = config.import.default_weight_unit.clone();
    }
    state.build_mappings(&snapshot.exercises, &snapshot.equipment, &snapshot.programs);

    let output = MapOutput {
        format: state.format,
        weight_unit: &state.weight_unit,
        exercises: &state.exercises,
        equipment: &state.equipment,
        programs: &state.programs,
        summary: state.summary(),
    };

    let json = render_json(&output, pretty)?;
    println!("{}", json);
    Ok(())
}

fn load_snapshot(path: Option<&Path>) -> Result<Snapshot> {
    let Some(path) = path else {
        return Ok(Snapshot::default());
    };
    let contents = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&contents)?;
    tracing::info!(
        "Loaded snapshot: {} exercises, {} equipment, {} programs",
        snapshot.exercises.len(),
        snapshot.equipment.len(),
        snapshot.programs.len()
    );
    Ok(snapshot)
}

fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
