use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use takeoff_core::{
    calculate_for_label, export_takeoffs_csv_string, CsvExportConfig, EngineConfig, Point2D,
    ScaleSpec, SessionCommand, TakeoffItem, TakeoffSession, ARCHITECTURAL_SCALES,
    DEFAULT_SCALE_LABEL,
};

#[derive(Debug, Parser)]
#[command(name = "takeoff-cli")]
#[command(about = "Plan takeoff measurement CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a drawing scale label.
    Scale {
        #[arg(value_name = "LABEL")]
        label: String,
    },
    /// List common architectural scales.
    Presets,
    /// Compute a quantity from page-space points.
    Measure {
        /// Takeoff type: linear, area or count.
        #[arg(long)]
        kind: String,
        #[arg(long, default_value = DEFAULT_SCALE_LABEL)]
        scale: String,
        /// Page-space point, repeatable.
        #[arg(
            long = "point",
            value_name = "X,Y",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        points: Vec<Point2D>,
    },
    /// Replay a JSON script of session commands and print committed takeoffs.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Include takeoffs that were never committed.
        #[arg(long)]
        all: bool,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct MeasureOutput {
    kind: String,
    scale: String,
    feet_per_point: f64,
    point_count: usize,
    quantity: f64,
    unit: String,
    display: String,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Scale { label } => {
            run_scale(&label);
            Ok(())
        }
        Commands::Presets => {
            for (label, inches_per_foot) in ARCHITECTURAL_SCALES {
                println!("{label}\t{inches_per_foot}");
            }
            Ok(())
        }
        Commands::Measure { kind, scale, points } => run_measure(&kind, &scale, &points),
        Commands::Replay { script, format, config, all } => {
            run_replay(&script, format, config.as_deref(), all)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Install the stderr log subscriber, filtered by `RUST_LOG`
pub fn init_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

fn run_scale(label: &str) {
    let scale = ScaleSpec::parse(label);
    println!("scale: {}", scale.label());
    println!("inches_per_foot: {:.6}", scale.inches_per_foot());
    println!("feet_per_point: {:.6}", scale.feet_per_point());
}

fn run_measure(kind: &str, scale_label: &str, points: &[Point2D]) -> Result<()> {
    let scale = ScaleSpec::parse(scale_label);
    let result = calculate_for_label(points, kind, &scale);

    let payload = MeasureOutput {
        kind: kind.to_string(),
        scale: scale.label().to_string(),
        feet_per_point: scale.feet_per_point(),
        point_count: points.len(),
        display: result.display(),
        quantity: result.quantity,
        unit: result.unit,
    };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");
    Ok(())
}

fn run_replay(
    script: &Path,
    format: OutputFormat,
    config_path: Option<&Path>,
    include_uncommitted: bool,
) -> Result<()> {
    ensure_file_exists(script)?;

    let config = match config_path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let bytes = fs::read(script)
        .with_context(|| format!("failed to read script {}", script.display()))?;
    let commands: Vec<SessionCommand> =
        serde_json::from_slice(&bytes).context("failed to parse session script")?;

    let mut session = TakeoffSession::new(&config);
    for (index, command) in commands.into_iter().enumerate() {
        session
            .apply(command)
            .with_context(|| format!("command {} failed", index + 1))?;
    }

    let takeoffs: Vec<&TakeoffItem> = session
        .takeoffs()
        .filter(|item| include_uncommitted || item.is_committed())
        .collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&takeoffs)?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            let export_config = CsvExportConfig {
                include_uncommitted,
                ..Default::default()
            };
            let csv = export_takeoffs_csv_string(&takeoffs, &export_config)?;
            print!("{csv}");
        }
    }

    Ok(())
}

fn parse_point(text: &str) -> Result<Point2D, String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{text}`"))?;
    let x = x
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("invalid x coordinate `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("invalid y coordinate `{y}`: {error}"))?;
    Ok(Point2D::new(x, y))
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_point_accepts_negative_and_spaces() {
        assert_eq!(parse_point("-12.5, 4").unwrap(), Point2D::new(-12.5, 4.0));
        assert!(parse_point("12").is_err());
        assert!(parse_point("a,1").is_err());
    }
}
