//! Track assembly: group a flat point table into ordered storm tracks.

use std::collections::HashMap;

use geo::{Coord, LineString};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::{Bounds, TrackId, TrackPoint};

/// Minimum number of points for a track to produce segments.
pub const MIN_TRACK_POINTS: usize = 2;

/// An ordered sequence of observations of one storm.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    /// Points in input order (assumed chronological)
    pub points: Vec<TrackPoint>,
}

impl Track {
    /// The track as a polyline in lon/lat.
    pub fn line_string(&self) -> LineString<f64> {
        LineString::new(self.points.iter().map(TrackPoint::coord).collect())
    }

    /// Highest recorded wind speed, if any point carries one.
    pub fn peak_wind(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|p| p.wind)
            .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let coords: Vec<Coord<f64>> = self.points.iter().map(TrackPoint::coord).collect();
        Bounds::from_coords(&coords)
    }
}

/// Result of track assembly.
#[derive(Debug, Default)]
pub struct TrackSet {
    /// Tracks with at least [`MIN_TRACK_POINTS`] points, in first-appearance order
    pub tracks: Vec<Track>,
    /// Tracks that were dropped, as [`FieldError::InsufficientPoints`]
    pub skipped: Vec<FieldError>,
}

impl TrackSet {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Group points by track id in a single pass, keeping input order.
///
/// Tracks are emitted in order of first appearance; points within a track
/// keep their relative input order (no re-sorting by timestamp). Tracks with
/// fewer than two points are skipped with a warning.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use stormfield::{build_tracks, TrackId, TrackPoint};
///
/// let t = NaiveDate::from_ymd_opt(1992, 8, 24).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let andrew = TrackId::new("Andrew", 1992);
/// let points = vec![
///     TrackPoint::new(andrew.clone(), -80.3, 25.5, t),
///     TrackPoint::new(TrackId::new("Bonnie", 1992), -60.0, 30.0, t),
///     TrackPoint::new(andrew, -81.5, 25.6, t),
/// ];
///
/// let set = build_tracks(&points);
/// assert_eq!(set.tracks.len(), 1);
/// assert_eq!(set.skipped.len(), 1);
/// ```
pub fn build_tracks(points: &[TrackPoint]) -> TrackSet {
    let mut index: HashMap<&TrackId, usize> = HashMap::new();
    let mut grouped: Vec<Track> = Vec::new();

    for point in points {
        let slot = *index.entry(&point.track_id).or_insert_with(|| {
            grouped.push(Track {
                id: point.track_id.clone(),
                points: Vec::new(),
            });
            grouped.len() - 1
        });
        grouped[slot].points.push(point.clone());
    }

    let mut set = TrackSet::default();
    for track in grouped {
        let count = track.points.len();
        if count < MIN_TRACK_POINTS {
            let err = FieldError::InsufficientPoints {
                track_id: track.id,
                point_count: count,
                minimum_required: MIN_TRACK_POINTS,
            };
            warn!("[Tracks] Skipping {}", err);
            set.skipped.push(err);
            continue;
        }
        set.tracks.push(track);
    }

    info!(
        "[Tracks] Built {} tracks from {} points ({} skipped)",
        set.tracks.len(),
        points.len(),
        set.skipped.len()
    );
    set
}

/// Whole-track selection by season and intensity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackFilter {
    /// Inclusive season range `(first, last)`
    pub years: Option<(i32, i32)>,
    /// Keep only tracks whose peak wind reaches this value (knots)
    pub min_peak_wind: Option<f64>,
}

impl TrackFilter {
    pub fn is_empty(&self) -> bool {
        self.years.is_none() && self.min_peak_wind.is_none()
    }

    /// Check whether a track passes the filter.
    pub fn accepts(&self, track: &Track) -> bool {
        if let Some((first, last)) = self.years {
            match track.id.year() {
                Some(y) if (first..=last).contains(&y) => {}
                _ => return false,
            }
        }
        if let Some(min_wind) = self.min_peak_wind {
            if track.peak_wind().is_none_or(|w| w < min_wind) {
                return false;
            }
        }
        true
    }

    /// Keep the tracks that pass the filter, preserving order.
    pub fn apply(&self, tracks: Vec<Track>) -> Vec<Track> {
        if self.is_empty() {
            return tracks;
        }
        let before = tracks.len();
        let kept: Vec<Track> = tracks.into_iter().filter(|t| self.accepts(t)).collect();
        info!("[Tracks] Filter kept {} of {} tracks", kept.len(), before);
        kept
    }
}
