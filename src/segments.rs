//! Segment geometry: rhumb bearing, length and centroid for each pair of
//! consecutive track points.

use chrono::NaiveDateTime;
use geo::{Coord, Line};
use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{FieldError, Result};
use crate::geo_utils::{
    midpoint, normalize_longitude, rhumb_bearing, rhumb_distance, unwrap_longitude,
};
use crate::tracks::Track;
use crate::{Bounds, TrackId, TrackPoint};

/// A straight move between two consecutive observations of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub track_id: TrackId,
    /// Position within the track (0 = first pair of points)
    pub index: usize,
    /// Start position, longitude in `[-180, 180)`
    pub start: Coord<f64>,
    /// End position; longitude is unwrapped to lie within 180 degrees of `start`,
    /// so it leaves `[-180, 180)` when the segment crosses the antimeridian
    pub end: Coord<f64>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Rhumb bearing from start to end, degrees in `[0, 360)`
    pub azimuth: f64,
    /// Rhumb distance in meters
    pub length: f64,
    /// Arithmetic midpoint of the endpoints, longitude in `[-180, 180)`
    pub centroid: Coord<f64>,
}

impl Segment {
    /// Build the segment between two consecutive points.
    ///
    /// Fails with [`FieldError::DegenerateSegment`] when the points coincide,
    /// since the bearing is then undefined.
    pub fn between(index: usize, from: &TrackPoint, to: &TrackPoint) -> Result<Self> {
        let degenerate = || FieldError::DegenerateSegment {
            track_id: from.track_id.clone(),
            index,
        };

        let length = rhumb_distance(from.coord(), to.coord());
        if !length.is_finite() || length <= 0.0 {
            return Err(degenerate());
        }
        let azimuth = rhumb_bearing(from.coord(), to.coord()).ok_or_else(degenerate)?;

        let start = Coord {
            x: normalize_longitude(from.longitude),
            y: from.latitude,
        };
        let end = Coord {
            x: unwrap_longitude(start.x, to.longitude),
            y: to.latitude,
        };

        Ok(Self {
            track_id: from.track_id.clone(),
            index,
            start,
            end,
            start_time: from.timestamp,
            end_time: to.timestamp,
            azimuth,
            length,
            centroid: normalize_centroid(midpoint(start, end)),
        })
    }

    /// The segment as a line in the lon/lat plane (end longitude unwrapped).
    pub fn line(&self) -> Line<f64> {
        Line::new(self.start, self.end)
    }

    /// The segment cut at the antimeridian into lines within `[-180, 180]`.
    ///
    /// Each part comes with its share of the segment (parametric fraction);
    /// shares sum to one. A segment that does not cross yields itself.
    pub fn parts(&self) -> Vec<(Line<f64>, f64)> {
        let seam = if self.end.x > 180.0 {
            180.0
        } else if self.end.x < -180.0 {
            -180.0
        } else {
            return vec![(self.line(), 1.0)];
        };

        let t = (seam - self.start.x) / (self.end.x - self.start.x);
        let y = self.start.y + t * (self.end.y - self.start.y);
        let turn = 360.0 * f64::signum(seam);

        [
            (Line::new(self.start, Coord { x: seam, y }), t),
            (
                Line::new(
                    Coord { x: seam - turn, y },
                    Coord {
                        x: self.end.x - turn,
                        y: self.end.y,
                    },
                ),
                1.0 - t,
            ),
        ]
        .into_iter()
        .filter(|(_, share)| *share > 0.0)
        .collect()
    }
}

fn normalize_centroid(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: normalize_longitude(c.x),
        y: c.y,
    }
}

/// All segments of one track, with degenerate pairs removed.
///
/// Returns the segments and the number of degenerate pairs dropped.
pub fn segments_for_track(track: &Track) -> (Vec<Segment>, usize) {
    let mut segments = Vec::with_capacity(track.points.len().saturating_sub(1));
    let mut degenerate = 0;

    for (i, pair) in track.points.windows(2).enumerate() {
        match Segment::between(i, &pair[0], &pair[1]) {
            Ok(segment) => segments.push(segment),
            Err(err) => {
                debug!("[Segments] Dropping {}", err);
                degenerate += 1;
            }
        }
    }

    (segments, degenerate)
}

/// Segments of all tracks, flattened in track order.
#[derive(Debug, Clone, Default)]
pub struct SegmentTable {
    pub segments: Vec<Segment>,
    /// Number of zero-length pairs excluded from the table
    pub degenerate: usize,
}

impl SegmentTable {
    /// Extent covered by all segments, with crossings cut at the antimeridian.
    pub fn bounds(&self) -> Option<Bounds> {
        let coords: Vec<Coord<f64>> = self
            .segments
            .iter()
            .flat_map(Segment::parts)
            .flat_map(|(line, _)| [line.start, line.end])
            .collect();
        Bounds::from_coords(&coords)
    }

    /// Total rhumb length of all segments in meters.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}

/// Compute segments for every track.
///
/// With the `parallel` feature tracks are processed concurrently; the output
/// order is the same as the sequential build.
pub fn compute_segments(tracks: &[Track]) -> SegmentTable {
    #[cfg(feature = "parallel")]
    let per_track: Vec<(Vec<Segment>, usize)> = tracks.par_iter().map(segments_for_track).collect();

    #[cfg(not(feature = "parallel"))]
    let per_track: Vec<(Vec<Segment>, usize)> = tracks.iter().map(segments_for_track).collect();

    let mut table = SegmentTable::default();
    for (segments, degenerate) in per_track {
        table.segments.extend(segments);
        table.degenerate += degenerate;
    }

    info!(
        "[Segments] Computed {} segments from {} tracks ({} degenerate)",
        table.segments.len(),
        tracks.len(),
        table.degenerate
    );
    table
}
