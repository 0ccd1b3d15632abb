//! Geographic utilities: rhumb-line formulas and circular statistics.
//!
//! All bearings are compass bearings in degrees (0 = north, 90 = east),
//! normalized to `[0, 360)`. Distances are meters on the mean-radius sphere
//! used by [`geo::Rhumb`].

use geo::{Bearing, Coord, Destination, Distance, Point, Rhumb};

/// Resultant length (per sample) below which a circular mean is undefined.
pub const MIN_RESULTANT_LENGTH: f64 = 1e-9;

/// Rhumb-line bearing from `from` to `to`.
///
/// Returns `None` when the two positions coincide and the bearing is undefined.
///
/// # Example
/// ```
/// use geo::Coord;
/// use stormfield::geo_utils::rhumb_bearing;
///
/// let north = rhumb_bearing(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
/// assert!(north.unwrap().abs() < 1e-9);
/// ```
pub fn rhumb_bearing(from: Coord<f64>, to: Coord<f64>) -> Option<f64> {
    if rhumb_distance(from, to) <= 0.0 {
        return None;
    }
    let bearing = Rhumb::bearing(Point::from(from), Point::from(to));
    bearing.is_finite().then(|| normalize_bearing(bearing))
}

/// Rhumb-line distance in meters.
pub fn rhumb_distance(from: Coord<f64>, to: Coord<f64>) -> f64 {
    Rhumb::distance(Point::from(from), Point::from(to))
}

/// Point reached by travelling `distance` meters from `origin` at a constant `bearing`.
pub fn rhumb_destination(origin: Coord<f64>, bearing: f64, distance: f64) -> Coord<f64> {
    Rhumb::destination(Point::from(origin), bearing, distance).0
}

/// Normalize a bearing to `[0, 360)`.
pub fn normalize_bearing(bearing: f64) -> f64 {
    let b = bearing.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if b >= 360.0 { 0.0 } else { b }
}

/// Normalize a longitude to `[-180, 180)`.
pub fn normalize_longitude(longitude: f64) -> f64 {
    // In-range values are returned untouched to keep them bit-exact
    if (-180.0..180.0).contains(&longitude) {
        return longitude;
    }
    let lng = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if lng >= 180.0 { -180.0 } else { lng }
}

/// Shift `longitude` by whole turns so it lies within 180 degrees of `reference`.
///
/// Used to keep a segment crossing the antimeridian continuous in the
/// lon/lat plane (e.g. 179 followed by -179 becomes 179 followed by 181).
pub fn unwrap_longitude(reference: f64, longitude: f64) -> f64 {
    let delta = (longitude - reference + 180.0).rem_euclid(360.0) - 180.0;
    reference + delta
}

/// Smallest absolute difference between two bearings, in `[0, 180]`.
pub fn bearing_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Arithmetic midpoint of two coordinates.
pub fn midpoint(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}

/// Sum of unit vectors for a set of compass bearings, as `(east, north)`.
fn resultant(bearings: &[f64]) -> (f64, f64) {
    bearings.iter().fold((0.0, 0.0), |(east, north), b| {
        let rad = b.to_radians();
        (east + rad.sin(), north + rad.cos())
    })
}

/// Mean resultant length of a set of bearings, in `[0, 1]`.
///
/// 1.0 means all bearings agree; values near 0.0 mean they cancel out.
/// Returns 0.0 for an empty slice.
pub fn mean_resultant_length(bearings: &[f64]) -> f64 {
    if bearings.is_empty() {
        return 0.0;
    }
    let (east, north) = resultant(bearings);
    east.hypot(north) / bearings.len() as f64
}

/// Circular mean of compass bearings.
///
/// Each bearing is treated as a unit vector `(sin b, cos b)`; the mean is the
/// direction of their sum. Returns `None` for an empty slice or when the
/// vectors cancel out (see [`MIN_RESULTANT_LENGTH`]).
///
/// # Example
/// ```
/// use stormfield::geo_utils::circular_mean_bearing;
///
/// let mean = circular_mean_bearing(&[2.0, 359.0]).unwrap();
/// assert!((mean - 0.5).abs() < 1e-9);
/// assert!(circular_mean_bearing(&[0.0, 90.0, 180.0, 270.0]).is_none());
/// ```
pub fn circular_mean_bearing(bearings: &[f64]) -> Option<f64> {
    if mean_resultant_length(bearings) < MIN_RESULTANT_LENGTH {
        return None;
    }
    let (east, north) = resultant(bearings);
    Some(normalize_bearing(east.atan2(north).to_degrees()))
}
