//! Grid aggregation: clipped segment length and circular mean azimuth per cell.
//!
//! Two independent summaries are computed and then inner-joined by cell id:
//!
//! 1. **Length** - every segment is clipped against the cells it overlaps and
//!    each clipped piece contributes its share of the segment's rhumb length.
//! 2. **Azimuth** - each segment's (unclipped) centroid is located in a cell and
//!    the cell's azimuths are averaged with a circular mean.
//!
//! Only cells with both a length and a defined mean azimuth reach the output.

use std::collections::BTreeMap;

use geo::{Coord, Rect};
use log::{debug, info};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::FieldError;
use crate::geo_utils::circular_mean_bearing;
use crate::grid::{Grid, GridCell};
use crate::segments::Segment;

/// Final per-cell record: present only when both summaries exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellAggregate {
    pub cell_id: u32,
    pub centroid: Coord<f64>,
    /// Sum of clipped segment lengths in meters
    pub summed_length: f64,
    /// Circular mean of azimuths of segments whose centroid lies in the cell
    pub mean_azimuth: f64,
    /// Number of azimuths averaged
    pub azimuth_count: usize,
}

/// Outer-joined per-cell summary before the inner-join filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSummary {
    pub cell_id: u32,
    pub summed_length: Option<f64>,
    pub mean_azimuth: Option<f64>,
    pub azimuth_count: usize,
}

/// Counters describing one aggregation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregationStats {
    pub cells_with_length: usize,
    pub cells_with_azimuth: usize,
    /// Cells whose azimuths cancel out (undefined circular mean)
    pub undefined_mean_cells: usize,
    pub qualifying_cells: usize,
}

/// Result of aggregating a segment table over a grid.
#[derive(Debug, Clone, Default)]
pub struct GridAggregation {
    /// Qualifying cells in ascending id order
    pub cells: Vec<CellAggregate>,
    pub stats: AggregationStats,
}

/// Clip the line `start -> end` to a cell (Liang-Barsky).
///
/// Returns the parametric interval `(t0, t1)` of the part inside the cell, or
/// `None` when the overlap has zero length. Edges follow the half-open cell
/// rule: a line running exactly along the east or north edge belongs to the
/// neighbouring cell, not this one.
pub fn clip_segment(rect: &Rect<f64>, start: Coord<f64>, end: Coord<f64>) -> Option<(f64, f64)> {
    let min = rect.min();
    let max = rect.max();
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    // (p, q, closed): inside when p * t <= q; a parallel line with q == 0
    // lies on the edge and is inside only for closed (west/south) edges
    let checks = [
        (-dx, start.x - min.x, true),
        (dx, max.x - start.x, false),
        (-dy, start.y - min.y, true),
        (dy, max.y - start.y, false),
    ];

    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q, closed) in checks {
        if p == 0.0 {
            if q < 0.0 || (q == 0.0 && !closed) {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    (t1 > t0).then_some((t0, t1))
}

/// Fraction of a segment (by parameter) that falls inside a cell.
///
/// Segments crossing the antimeridian are clipped part by part.
pub fn clip_fraction(cell: &GridCell, segment: &Segment) -> Option<f64> {
    let fraction: f64 = segment
        .parts()
        .iter()
        .filter_map(|(line, share)| {
            clip_segment(&cell.rect, line.start, line.end).map(|(t0, t1)| (t1 - t0) * share)
        })
        .sum();
    (fraction > 0.0).then_some(fraction)
}

/// Split one segment across the grid: `(cell_id, clipped_length)` pairs in id order.
///
/// The clipped lengths sum to the segment length.
pub fn split_segment(grid: &Grid, segment: &Segment) -> Vec<(u32, f64)> {
    let parts = segment.parts();
    let mut candidates: Vec<u32> = parts
        .iter()
        .flat_map(|(line, _)| grid.cells_intersecting(line.start, line.end))
        .map(|cell| cell.id)
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    candidates
        .into_iter()
        .filter_map(|id| {
            let cell = grid.cell(id)?;
            clip_fraction(cell, segment).map(|f| (id, f * segment.length))
        })
        .collect()
}

/// Sum clipped segment lengths per cell. Cells with no length are absent.
pub fn aggregate_lengths(grid: &Grid, segments: &[Segment]) -> BTreeMap<u32, f64> {
    #[cfg(feature = "parallel")]
    let pieces: Vec<Vec<(u32, f64)>> = segments
        .par_iter()
        .map(|s| split_segment(grid, s))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let pieces: Vec<Vec<(u32, f64)>> = segments.iter().map(|s| split_segment(grid, s)).collect();

    // Sequential fold keeps the summation order fixed
    let mut lengths = BTreeMap::new();
    for (cell_id, length) in pieces.into_iter().flatten() {
        *lengths.entry(cell_id).or_insert(0.0) += length;
    }
    lengths
}

/// Collect segment azimuths per cell by locating each segment centroid.
pub fn aggregate_azimuths(grid: &Grid, segments: &[Segment]) -> BTreeMap<u32, Vec<f64>> {
    let mut azimuths: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for segment in segments {
        match grid.locate(segment.centroid) {
            Some(cell) => azimuths.entry(cell.id).or_default().push(segment.azimuth),
            None => debug!(
                "[Aggregate] Centroid of {} #{} is outside the grid",
                segment.track_id, segment.index
            ),
        }
    }
    azimuths
}

/// Outer join of both summaries, in ascending cell id order.
pub fn summarize_cells(grid: &Grid, segments: &[Segment]) -> Vec<CellSummary> {
    let lengths = aggregate_lengths(grid, segments);
    let azimuths = aggregate_azimuths(grid, segments);

    let mut ids: Vec<u32> = lengths.keys().chain(azimuths.keys()).copied().collect();
    ids.sort_unstable();
    ids.dedup();

    ids.into_iter()
        .map(|cell_id| {
            let samples = azimuths.get(&cell_id).map(Vec::as_slice).unwrap_or(&[]);
            CellSummary {
                cell_id,
                summed_length: lengths.get(&cell_id).copied(),
                mean_azimuth: circular_mean_bearing(samples),
                azimuth_count: samples.len(),
            }
        })
        .collect()
}

/// Aggregate segments over the grid and keep cells with both length and azimuth.
pub fn aggregate_cells(grid: &Grid, segments: &[Segment]) -> GridAggregation {
    let summaries = summarize_cells(grid, segments);
    let mut result = GridAggregation::default();

    for summary in summaries {
        if summary.summed_length.is_some() {
            result.stats.cells_with_length += 1;
        }
        if summary.azimuth_count > 0 {
            result.stats.cells_with_azimuth += 1;
            if summary.mean_azimuth.is_none() {
                result.stats.undefined_mean_cells += 1;
                debug!(
                    "[Aggregate] Excluding cell: {}",
                    FieldError::UndefinedCircularMean {
                        cell_id: summary.cell_id,
                        sample_count: summary.azimuth_count,
                    }
                );
            }
        }

        let (Some(summed_length), Some(mean_azimuth)) =
            (summary.summed_length, summary.mean_azimuth)
        else {
            continue;
        };
        let Some(cell) = grid.cell(summary.cell_id) else {
            continue;
        };

        result.cells.push(CellAggregate {
            cell_id: summary.cell_id,
            centroid: cell.centroid(),
            summed_length,
            mean_azimuth,
            azimuth_count: summary.azimuth_count,
        });
    }
    result.stats.qualifying_cells = result.cells.len();

    info!(
        "[Aggregate] {} cells with length, {} with azimuth, {} qualifying ({} undefined means)",
        result.stats.cells_with_length,
        result.stats.cells_with_azimuth,
        result.stats.qualifying_cells,
        result.stats.undefined_mean_cells
    );
    result
}
