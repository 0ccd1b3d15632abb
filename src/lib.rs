//! # Storm Field
//!
//! Gridded vector fields of storm movement from trajectory point tables.
//!
//! This library provides:
//! - Storm track loading from CSV point tables (name, year, time, position, intensity)
//! - Track assembly and rhumb-line segment geometry (bearing, length, centroid)
//! - Regular grid generation with an R-tree cell index
//! - Per-cell aggregation: clipped segment length and circular mean azimuth
//! - Vector glyph projection for rendering arrows per grid cell
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel segment computation and clipping with rayon
//! - **`synthetic`** - Synthetic storm track generator for tests and benchmarks
//! - **`cli`** - Build the `stormfield-cli` binary
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use stormfield::{build_vector_field, FieldConfig, TrackId, TrackPoint};
//!
//! let t0 = NaiveDate::from_ymd_opt(2020, 9, 1)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//! let id = TrackId::new("LAURA", 2020);
//! let points = vec![
//!     TrackPoint::new(id.clone(), -80.0, 20.0, t0),
//!     TrackPoint::new(id.clone(), -80.5, 21.0, t0 + chrono::Duration::hours(6)),
//!     TrackPoint::new(id, -81.0, 22.0, t0 + chrono::Duration::hours(12)),
//! ];
//!
//! let result = build_vector_field(&points, &FieldConfig::default()).unwrap();
//! for glyph in &result.glyphs {
//!     println!("cell {} -> {:.0} deg, {:.0} m", glyph.cell_id, glyph.azimuth, glyph.length);
//! }
//! ```

use chrono::NaiveDateTime;
use geo::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

// Unified error handling
pub mod error;
pub use error::{FieldError, OptionExt, Result};

// Geographic utilities (rhumb formulas, circular statistics, bounds)
pub mod geo_utils;

// CSV trajectory loading and validation
pub mod loader;
pub use loader::{StormRecord, load_track_points, load_track_points_from_path};

// Track assembly from point tables
pub mod tracks;
pub use tracks::{Track, TrackFilter, TrackSet, build_tracks};

// Segment geometry (rhumb bearing and length)
pub mod segments;
pub use segments::{Segment, SegmentTable, compute_segments, segments_for_track};

// Regular grid generation with R-tree cell index
pub mod grid;
pub use grid::{Grid, GridCell};

// Per-cell length and azimuth aggregation
pub mod aggregate;
pub use aggregate::{AggregationStats, CellAggregate, GridAggregation, aggregate_cells};

// Vector glyph projection
pub mod field;
pub use field::{AzimuthBuckets, VectorGlyph, project_field};

// End-to-end pipeline and configuration
pub mod pipeline;
pub use pipeline::{
    FieldConfig, FieldResult, PipelineStats, build_vector_field, build_vector_field_from_tracks,
};

// Table output (CSV / JSON)
pub mod output;

// Synthetic storm tracks for stress testing and benchmarking
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// Unique identifier of a storm track, built from the storm name and year.
///
/// Storm names are recycled across seasons, so the year is part of the key.
///
/// # Example
/// ```
/// use stormfield::TrackId;
/// let id = TrackId::new("Alberto", 1982);
/// assert_eq!(id.as_str(), "ALBERTO-1982");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a track identifier from a storm name and season year.
    pub fn new(name: &str, year: i32) -> Self {
        Self(format!("{}-{}", name.trim().to_uppercase(), year))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Season year encoded in the identifier.
    pub fn year(&self) -> Option<i32> {
        self.0.rsplit_once('-').and_then(|(_, y)| y.parse().ok())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single observation of a storm: position, time and optional intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub track_id: TrackId,
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    pub timestamp: NaiveDateTime,
    /// Maximum sustained wind in knots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<f64>,
    /// Central pressure in millibars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    /// Storm classification (e.g. "hurricane", "tropical storm")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Saffir-Simpson category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<u8>,
}

impl TrackPoint {
    /// Create a track point without intensity attributes.
    pub fn new(track_id: TrackId, longitude: f64, latitude: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            track_id,
            longitude,
            latitude,
            timestamp,
            wind: None,
            pressure: None,
            status: None,
            category: None,
        }
    }

    /// Attach a wind speed (knots).
    pub fn with_wind(mut self, wind: f64) -> Self {
        self.wind = Some(wind);
        self
    }

    /// Position as a geo coordinate (`x` = longitude, `y` = latitude).
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Axis-aligned extent in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from coordinates (`x` = longitude, `y` = latitude).
    pub fn from_coords<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coord<f64>>,
    {
        let mut iter = coords.into_iter().peekable();
        iter.peek()?;

        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for c in iter {
            min_lat = min_lat.min(c.y);
            max_lat = max_lat.max(c.y);
            min_lng = min_lng.min(c.x);
            max_lng = max_lng.max(c.x);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center of the bounds as a coordinate.
    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min_lng + self.max_lng) / 2.0,
            y: (self.min_lat + self.max_lat) / 2.0,
        }
    }

    /// East-west extent in degrees.
    pub fn width(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// North-south extent in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Smallest bounds containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }
}
