//! stormfield CLI - build storm movement vector fields from track tables
//!
//! Usage:
//!   stormfield-cli field <tracks.csv> [--cell-size <deg>] [--output <file>]
//!   stormfield-cli segments <tracks.csv> [--output <file>]
//!
//! Reads a best-track style CSV (name, year, month, day, hour, lat, long, ...),
//! runs the gridding pipeline and writes the glyph table (or the intermediate
//! segment table) as CSV or JSON.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stormfield::{
    FieldConfig, FieldResult, build_tracks, build_vector_field, compute_segments,
    load_track_points_from_path,
    output::{write_glyphs_csv, write_glyphs_json, write_segments_csv},
};

#[derive(Parser)]
#[command(name = "stormfield-cli")]
#[command(about = "Gridded vector fields of storm movement", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate tracks into a gridded vector field
    Field {
        /// CSV file with one row per storm observation
        input: PathBuf,

        /// JSON configuration file (flags below override its values)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Grid cell size in degrees
        #[arg(long)]
        cell_size: Option<f64>,

        /// Shortest arrow length in meters
        #[arg(long)]
        min_length: Option<f64>,

        /// Longest arrow length in meters
        #[arg(long)]
        max_length: Option<f64>,

        /// Azimuth colour bin width in degrees
        #[arg(long)]
        bucket_width: Option<f64>,

        /// First season to include
        #[arg(long)]
        from_year: Option<i32>,

        /// Last season to include
        #[arg(long)]
        to_year: Option<i32>,

        /// Keep only storms whose peak wind reaches this value (knots)
        #[arg(long)]
        min_peak_wind: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the per-segment bearing and length table
    Segments {
        /// CSV file with one row per storm observation
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let outcome = match cli.command {
        Commands::Field {
            input,
            config,
            cell_size,
            min_length,
            max_length,
            bucket_width,
            from_year,
            to_year,
            min_peak_wind,
            format,
            output,
        } => resolve_config(
            config.as_deref(),
            cell_size,
            min_length,
            max_length,
            bucket_width,
            from_year,
            to_year,
            min_peak_wind,
        )
        .and_then(|config| run_field(&input, &config, format, output.as_deref())),
        Commands::Segments { input, output } => run_segments(&input, output.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Merge the optional config file with command line overrides.
#[allow(clippy::too_many_arguments)]
fn resolve_config(
    path: Option<&Path>,
    cell_size: Option<f64>,
    min_length: Option<f64>,
    max_length: Option<f64>,
    bucket_width: Option<f64>,
    from_year: Option<i32>,
    to_year: Option<i32>,
    min_peak_wind: Option<f64>,
) -> stormfield::Result<FieldConfig> {
    let mut config = match path {
        Some(p) => FieldConfig::from_json_file(p)?,
        None => FieldConfig::default(),
    };

    if let Some(v) = cell_size {
        config.cell_size_degrees = v;
    }
    if let Some(v) = min_length {
        config.min_display_length = v;
    }
    if let Some(v) = max_length {
        config.max_display_length = v;
    }
    if let Some(v) = bucket_width {
        config.bucket_width_degrees = v;
    }
    if from_year.is_some() || to_year.is_some() {
        let (first, last) = config.filter.years.unwrap_or((i32::MIN, i32::MAX));
        config.filter.years = Some((from_year.unwrap_or(first), to_year.unwrap_or(last)));
    }
    if min_peak_wind.is_some() {
        config.filter.min_peak_wind = min_peak_wind;
    }

    config.validate()?;
    Ok(config)
}

fn open_output(path: Option<&Path>) -> stormfield::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run_field(
    input: &Path,
    config: &FieldConfig,
    format: Format,
    output: Option<&Path>,
) -> stormfield::Result<()> {
    let points = load_track_points_from_path(input)?;
    let result = build_vector_field(&points, config)?;
    print_summary(&result, config);

    let mut writer = open_output(output)?;
    match format {
        Format::Csv => write_glyphs_csv(&result.glyphs, &mut writer)?,
        Format::Json => write_glyphs_json(&result.glyphs, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn run_segments(input: &Path, output: Option<&Path>) -> stormfield::Result<()> {
    let points = load_track_points_from_path(input)?;
    let set = build_tracks(&points);
    let table = compute_segments(&set.tracks);

    log::info!(
        "Segments: {} ({} degenerate), total {:.0} km",
        table.segments.len(),
        table.degenerate,
        table.total_length() / 1000.0
    );

    let mut writer = open_output(output)?;
    write_segments_csv(&table.segments, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn print_summary(result: &FieldResult, config: &FieldConfig) {
    let s = &result.stats;
    log::info!("{}", "=".repeat(60));
    log::info!(
        "Tracks: {} built, {} skipped (<2 points), {} filtered out",
        s.tracks,
        s.skipped_tracks,
        s.filtered_tracks
    );
    log::info!(
        "Segments: {} ({} degenerate dropped)",
        s.segments,
        s.degenerate_segments
    );
    log::info!(
        "Grid: {} x {} cells of {} deg",
        s.grid_cols,
        s.grid_rows,
        config.cell_size_degrees
    );
    log::info!(
        "Cells: {} with length, {} with azimuth, {} undefined mean, {} glyphs",
        s.aggregation.cells_with_length,
        s.aggregation.cells_with_azimuth,
        s.aggregation.undefined_mean_cells,
        s.glyphs
    );
    if result.is_empty() {
        log::warn!("No grid cell qualified; glyph table is empty");
    }
    log::info!("{}", "=".repeat(60));
}
