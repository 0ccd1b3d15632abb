//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use stormfield::{TrackId, TrackPoint};

/// One degree of arc on the mean-radius sphere, in meters.
pub const METERS_PER_DEGREE: f64 = 111_195.08;

pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2004, 9, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Points of one track from `(lon, lat)` pairs, 6 hours apart.
pub fn track_points(name: &str, year: i32, coords: &[(f64, f64)]) -> Vec<TrackPoint> {
    let id = TrackId::new(name, year);
    coords
        .iter()
        .enumerate()
        .map(|(i, (lon, lat))| {
            TrackPoint::new(id.clone(), *lon, *lat, t0() + Duration::hours(6 * i as i64))
        })
        .collect()
}

pub fn point(lon: f64, lat: f64) -> TrackPoint {
    TrackPoint::new(TrackId::new("TEST", 2000), lon, lat, t0())
}
