//! Tests for geo_utils module

mod common;

use common::{METERS_PER_DEGREE, approx_eq};
use geo::Coord;
use stormfield::geo_utils::*;

fn c(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

#[test]
fn test_rhumb_bearing_cardinal_directions() {
    let origin = c(0.0, 0.0);
    assert!(approx_eq(rhumb_bearing(origin, c(0.0, 1.0)).unwrap(), 0.0, 1e-9));
    assert!(approx_eq(rhumb_bearing(origin, c(1.0, 0.0)).unwrap(), 90.0, 1e-9));
    assert!(approx_eq(rhumb_bearing(origin, c(0.0, -1.0)).unwrap(), 180.0, 1e-9));
    assert!(approx_eq(rhumb_bearing(origin, c(-1.0, 0.0)).unwrap(), 270.0, 1e-9));
}

#[test]
fn test_rhumb_bearing_same_point_undefined() {
    let p = c(-75.5, 25.0);
    assert!(rhumb_bearing(p, p).is_none());
}

#[test]
fn test_rhumb_bearing_across_antimeridian() {
    // The short way from 179.5E to 179.5W is due east
    let bearing = rhumb_bearing(c(179.5, 10.0), c(-179.5, 10.0)).unwrap();
    assert!(approx_eq(bearing, 90.0, 1e-6));
}

#[test]
fn test_rhumb_distance_one_degree() {
    let d = rhumb_distance(c(0.0, 0.0), c(0.0, 1.0));
    assert!(approx_eq(d, METERS_PER_DEGREE, 1.0));

    // Along a parallel the distance shrinks with cos(latitude)
    let d60 = rhumb_distance(c(0.0, 60.0), c(1.0, 60.0));
    assert!(approx_eq(d60, METERS_PER_DEGREE * 0.5, 1.0));
}

#[test]
fn test_bearing_round_trip() {
    let origin = c(-60.0, 20.0);
    for bearing in [0.0, 30.0, 45.0, 90.0, 135.0, 200.0, 270.0, 315.0, 359.0] {
        let dest = rhumb_destination(origin, bearing, 500_000.0);
        let back = rhumb_bearing(origin, dest).unwrap();
        assert!(
            bearing_difference(back, bearing) < 1e-6,
            "bearing {} came back as {}",
            bearing,
            back
        );
        assert!(approx_eq(rhumb_distance(origin, dest), 500_000.0, 1e-2));
    }
}

#[test]
fn test_circular_mean_wraps_around_north() {
    let mean = circular_mean_bearing(&[2.0, 359.0]).unwrap();
    assert!(approx_eq(mean, 0.5, 1e-9), "got {}", mean);
    assert!(!approx_eq(mean, 180.5, 1.0));
}

#[test]
fn test_circular_mean_symmetric_pair() {
    let mean = circular_mean_bearing(&[350.0, 10.0]).unwrap();
    assert!(bearing_difference(mean, 0.0) < 1e-9);
}

#[test]
fn test_circular_mean_north_and_east() {
    let mean = circular_mean_bearing(&[0.0, 0.0, 90.0, 90.0]).unwrap();
    assert!(approx_eq(mean, 45.0, 1e-9));
}

#[test]
fn test_circular_mean_uniform_cancel_is_undefined() {
    assert!(circular_mean_bearing(&[0.0, 90.0, 180.0, 270.0]).is_none());
    assert!(circular_mean_bearing(&[45.0, 225.0]).is_none());
    assert!(circular_mean_bearing(&[]).is_none());
}

#[test]
fn test_circular_mean_range() {
    let mean = circular_mean_bearing(&[300.0, 320.0]).unwrap();
    assert!(approx_eq(mean, 310.0, 1e-9));
    assert!((0.0..360.0).contains(&mean));
}

#[test]
fn test_mean_resultant_length() {
    assert!(approx_eq(mean_resultant_length(&[10.0, 10.0, 10.0]), 1.0, 1e-12));
    assert!(mean_resultant_length(&[0.0, 180.0]) < 1e-12);
    assert_eq!(mean_resultant_length(&[]), 0.0);
}

#[test]
fn test_normalize_longitude() {
    assert_eq!(normalize_longitude(180.0), -180.0);
    assert!(approx_eq(normalize_longitude(181.5), -178.5, 1e-12));
    assert!(approx_eq(normalize_longitude(-190.0), 170.0, 1e-12));
    assert!(approx_eq(normalize_longitude(45.0), 45.0, 1e-12));
}

#[test]
fn test_unwrap_longitude() {
    assert!(approx_eq(unwrap_longitude(179.0, -179.0), 181.0, 1e-12));
    assert!(approx_eq(unwrap_longitude(-179.0, 179.0), -181.0, 1e-12));
    assert!(approx_eq(unwrap_longitude(10.0, 20.0), 20.0, 1e-12));
}

#[test]
fn test_bearing_difference() {
    assert!(approx_eq(bearing_difference(350.0, 10.0), 20.0, 1e-12));
    assert!(approx_eq(bearing_difference(90.0, 270.0), 180.0, 1e-12));
    assert_eq!(bearing_difference(42.0, 42.0), 0.0);
}

#[test]
fn test_midpoint() {
    let m = midpoint(c(-80.0, 20.0), c(-82.0, 24.0));
    assert_eq!(m, c(-81.0, 22.0));
}
