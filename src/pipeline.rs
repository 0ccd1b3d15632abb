//! End-to-end pipeline: points -> tracks -> segments -> grid -> cells -> glyphs.
//!
//! Every parameter is carried by [`FieldConfig`]; nothing is read from global
//! state, so the same input and configuration always give the same output.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregationStats, CellAggregate, aggregate_cells};
use crate::error::{FieldError, Result};
use crate::field::{AzimuthBuckets, VectorGlyph, project_field};
use crate::grid::Grid;
use crate::segments::compute_segments;
use crate::tracks::{Track, TrackFilter, build_tracks};
use crate::TrackPoint;

/// Configuration for vector field generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Grid cell size in degrees.
    /// Default: 5.0
    pub cell_size_degrees: f64,

    /// Arrow length for the cell with the smallest summed length, meters.
    /// Default: 50 000
    pub min_display_length: f64,

    /// Arrow length for the cell with the largest summed length, meters.
    /// Default: 500 000
    pub max_display_length: f64,

    /// Width of azimuth colour bins in degrees.
    /// Default: 30.0
    pub bucket_width_degrees: f64,

    /// Whole-track selection applied before segment construction.
    pub filter: TrackFilter,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            cell_size_degrees: 5.0,
            min_display_length: 50_000.0,
            max_display_length: 500_000.0,
            bucket_width_degrees: 30.0,
            filter: TrackFilter::default(),
        }
    }
}

impl FieldConfig {
    /// Check that all parameters are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size_degrees.is_finite() || self.cell_size_degrees <= 0.0 {
            return Err(FieldError::InvalidConfig(format!(
                "cell_size_degrees must be positive, got {}",
                self.cell_size_degrees
            )));
        }
        if !self.min_display_length.is_finite()
            || !self.max_display_length.is_finite()
            || self.min_display_length < 0.0
            || self.min_display_length > self.max_display_length
        {
            return Err(FieldError::InvalidConfig(format!(
                "display length range [{}, {}] is invalid",
                self.min_display_length, self.max_display_length
            )));
        }
        AzimuthBuckets::new(self.bucket_width_degrees)?;
        if let Some((first, last)) = self.filter.years {
            if first > last {
                return Err(FieldError::InvalidConfig(format!(
                    "year range {}..={} is empty",
                    first, last
                )));
            }
        }
        if let Some(wind) = self.filter.min_peak_wind {
            if !wind.is_finite() {
                return Err(FieldError::InvalidConfig(format!(
                    "min_peak_wind must be finite, got {}",
                    wind
                )));
            }
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: FieldConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub points: usize,
    pub tracks: usize,
    /// Tracks dropped for having fewer than two points
    pub skipped_tracks: usize,
    /// Tracks removed by the track filter
    pub filtered_tracks: usize,
    pub segments: usize,
    pub degenerate_segments: usize,
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub aggregation: AggregationStats,
    pub glyphs: usize,
}

/// Output of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct FieldResult {
    /// One glyph per qualifying cell, in ascending cell id order
    pub glyphs: Vec<VectorGlyph>,
    /// The qualifying cell records the glyphs were projected from
    pub cells: Vec<CellAggregate>,
    pub stats: PipelineStats,
}

impl FieldResult {
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Build a vector field from a flat point table.
///
/// Tracks with fewer than two points are skipped with a warning, then the
/// configured [`TrackFilter`] is applied. An input with no usable segments
/// yields an empty result rather than an error.
pub fn build_vector_field(points: &[TrackPoint], config: &FieldConfig) -> Result<FieldResult> {
    config.validate()?;

    let set = build_tracks(points);
    let skipped_tracks = set.skipped.len();
    let built = set.tracks.len();
    let tracks = config.filter.apply(set.tracks);

    let mut result = build_vector_field_from_tracks(&tracks, config)?;
    result.stats.points = points.len();
    result.stats.skipped_tracks = skipped_tracks;
    result.stats.filtered_tracks = built - tracks.len();
    Ok(result)
}

/// Build a vector field from already assembled tracks.
///
/// The track filter in `config` is not applied here.
pub fn build_vector_field_from_tracks(tracks: &[Track], config: &FieldConfig) -> Result<FieldResult> {
    config.validate()?;

    let table = compute_segments(tracks);
    let mut stats = PipelineStats {
        points: tracks.iter().map(|t| t.points.len()).sum(),
        tracks: tracks.len(),
        segments: table.segments.len(),
        degenerate_segments: table.degenerate,
        ..PipelineStats::default()
    };

    let Some(bounds) = table.bounds() else {
        info!("[Pipeline] No segments to aggregate, returning empty field");
        return Ok(FieldResult {
            stats,
            ..FieldResult::default()
        });
    };

    let grid = Grid::covering(&bounds, config.cell_size_degrees)?;
    stats.grid_rows = grid.rows();
    stats.grid_cols = grid.cols();

    let aggregation = aggregate_cells(&grid, &table.segments);
    stats.aggregation = aggregation.stats;

    let buckets = AzimuthBuckets::new(config.bucket_width_degrees)?;
    let glyphs = project_field(
        &aggregation.cells,
        (config.min_display_length, config.max_display_length),
        &buckets,
    );
    stats.glyphs = glyphs.len();

    info!(
        "[Pipeline] {} tracks -> {} segments -> {} glyphs",
        stats.tracks, stats.segments, stats.glyphs
    );

    Ok(FieldResult {
        glyphs,
        cells: aggregation.cells,
        stats,
    })
}
