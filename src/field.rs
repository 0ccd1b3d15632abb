//! Vector field projection: one arrow glyph per qualifying grid cell.
//!
//! Arrow lengths are the cells' summed lengths min-max rescaled into a display
//! range for the current batch, so the same cell can get a different arrow
//! length in a different run. The unscaled summed length is kept on the glyph
//! for line-width style categorisation.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::aggregate::CellAggregate;
use crate::error::{FieldError, Result};
use crate::geo_utils::{normalize_bearing, normalize_longitude, rhumb_destination, unwrap_longitude};

/// A renderable arrow for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorGlyph {
    pub cell_id: u32,
    /// Arrow origin (cell centroid), longitude in `[-180, 180)`
    pub lon0: f64,
    pub lat0: f64,
    /// Arrow tip; longitude is kept within 180 degrees of `lon0`
    pub lon1: f64,
    pub lat1: f64,
    /// Summed clipped track length in the cell, meters (unscaled)
    pub length: f64,
    /// Arrow length after rescaling, meters
    pub display_length: f64,
    /// Mean azimuth, degrees in `[0, 360)`
    pub azimuth: f64,
    pub azimuth_bucket: u32,
}

impl VectorGlyph {
    pub fn origin(&self) -> Coord<f64> {
        Coord {
            x: self.lon0,
            y: self.lat0,
        }
    }

    pub fn destination(&self) -> Coord<f64> {
        Coord {
            x: self.lon1,
            y: self.lat1,
        }
    }
}

/// Fixed-width azimuth bins over `[0, 360)` for discrete colour mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthBuckets {
    width: f64,
}

impl AzimuthBuckets {
    /// Create bins of `width` degrees; the last bin is narrower when
    /// `width` does not divide 360.
    pub fn new(width: f64) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 || width > 360.0 {
            return Err(FieldError::InvalidConfig(format!(
                "azimuth bucket width must be in (0, 360], got {}",
                width
            )));
        }
        Ok(Self { width })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Number of bins covering `[0, 360)`.
    pub fn count(&self) -> u32 {
        (360.0 / self.width).ceil() as u32
    }

    /// Bin index of an azimuth.
    pub fn bucket(&self, azimuth: f64) -> u32 {
        azimuth_bucket(azimuth, self.width).min(self.count() - 1)
    }

    /// Human readable bin range, e.g. `"[30,60)"`.
    pub fn label(&self, bucket: u32) -> String {
        let lo = bucket as f64 * self.width;
        let hi = (lo + self.width).min(360.0);
        format!("[{},{})", lo, hi)
    }
}

/// Bin index of an azimuth for bins of `width` degrees.
///
/// # Example
/// ```
/// use stormfield::field::azimuth_bucket;
/// assert_eq!(azimuth_bucket(0.0, 30.0), 0);
/// assert_eq!(azimuth_bucket(45.0, 30.0), 1);
/// assert_eq!(azimuth_bucket(359.9, 30.0), 11);
/// ```
pub fn azimuth_bucket(azimuth: f64, width: f64) -> u32 {
    (normalize_bearing(azimuth) / width).floor() as u32
}

/// Min-max rescale `values` into `[min_len, max_len]`.
///
/// When all values are equal every output is the midpoint of the range.
pub fn rescale_lengths(values: &[f64], min_len: f64, max_len: f64) -> Vec<f64> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;

    values
        .iter()
        .map(|v| {
            if span > 0.0 {
                min_len + (v - lo) / span * (max_len - min_len)
            } else {
                (min_len + max_len) / 2.0
            }
        })
        .collect()
}

/// Project each cell's mean azimuth from its centroid into an arrow glyph.
///
/// `display_range` is the `(min, max)` arrow length in meters. The arrow tip is
/// found by travelling the rescaled length along the rhumb line of the mean
/// azimuth, matching the bearing formula used for segments.
pub fn project_field(
    cells: &[CellAggregate],
    display_range: (f64, f64),
    buckets: &AzimuthBuckets,
) -> Vec<VectorGlyph> {
    let lengths: Vec<f64> = cells.iter().map(|c| c.summed_length).collect();
    let display = rescale_lengths(&lengths, display_range.0, display_range.1);

    cells
        .iter()
        .zip(display)
        .map(|(cell, display_length)| {
            let origin = Coord {
                x: normalize_longitude(cell.centroid.x),
                y: cell.centroid.y,
            };
            let tip = rhumb_destination(origin, cell.mean_azimuth, display_length);

            VectorGlyph {
                cell_id: cell.cell_id,
                lon0: origin.x,
                lat0: origin.y,
                lon1: unwrap_longitude(origin.x, tip.x),
                lat1: tip.y,
                length: cell.summed_length,
                display_length,
                azimuth: cell.mean_azimuth,
                azimuth_bucket: buckets.bucket(cell.mean_azimuth),
            }
        })
        .collect()
}
