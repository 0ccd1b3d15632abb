//! Tests for vector glyph projection

mod common;

use common::approx_eq;
use geo::Coord;
use stormfield::field::{azimuth_bucket, rescale_lengths};
use stormfield::geo_utils::{bearing_difference, rhumb_bearing, rhumb_distance};
use stormfield::{AzimuthBuckets, CellAggregate, FieldError, project_field};

fn cell(cell_id: u32, x: f64, y: f64, summed_length: f64, mean_azimuth: f64) -> CellAggregate {
    CellAggregate {
        cell_id,
        centroid: Coord { x, y },
        summed_length,
        mean_azimuth,
        azimuth_count: 1,
    }
}

#[test]
fn test_rescale_min_max() {
    let scaled = rescale_lengths(&[10.0, 20.0, 30.0], 1.0, 3.0);
    assert_eq!(scaled, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_rescale_equal_values_use_midpoint() {
    let scaled = rescale_lengths(&[42.0, 42.0], 100.0, 300.0);
    assert_eq!(scaled, vec![200.0, 200.0]);

    let single = rescale_lengths(&[7.0], 0.0, 10.0);
    assert_eq!(single, vec![5.0]);

    assert!(rescale_lengths(&[], 0.0, 10.0).is_empty());
}

#[test]
fn test_azimuth_bucket_boundaries() {
    assert_eq!(azimuth_bucket(0.0, 30.0), 0);
    assert_eq!(azimuth_bucket(29.999, 30.0), 0);
    assert_eq!(azimuth_bucket(30.0, 30.0), 1);
    assert_eq!(azimuth_bucket(359.9, 30.0), 11);
    // Wrapped input
    assert_eq!(azimuth_bucket(-10.0, 30.0), 11);
}

#[test]
fn test_buckets_uneven_width() {
    let buckets = AzimuthBuckets::new(50.0).unwrap();
    assert_eq!(buckets.count(), 8);
    assert_eq!(buckets.bucket(355.0), 7);
    assert_eq!(buckets.label(0), "[0,50)");
    assert_eq!(buckets.label(7), "[350,360)");
}

#[test]
fn test_single_bucket() {
    let buckets = AzimuthBuckets::new(360.0).unwrap();
    assert_eq!(buckets.count(), 1);
    assert_eq!(buckets.bucket(359.0), 0);
}

#[test]
fn test_invalid_bucket_width() {
    for width in [0.0, -30.0, 400.0, f64::NAN] {
        assert!(matches!(
            AzimuthBuckets::new(width),
            Err(FieldError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_project_field_geometry() {
    let cells = vec![
        cell(0, -82.5, 22.5, 1_000.0, 45.0),
        cell(3, -77.5, 27.5, 3_000.0, 300.0),
    ];
    let buckets = AzimuthBuckets::new(30.0).unwrap();
    let glyphs = project_field(&cells, (50_000.0, 500_000.0), &buckets);

    assert_eq!(glyphs.len(), 2);
    assert_eq!(glyphs[0].cell_id, 0);
    assert_eq!(glyphs[0].origin(), Coord { x: -82.5, y: 22.5 });
    assert_eq!(glyphs[0].display_length, 50_000.0);
    assert_eq!(glyphs[1].display_length, 500_000.0);
    assert_eq!(glyphs[0].length, 1_000.0);
    assert_eq!(glyphs[0].azimuth_bucket, 1);
    assert_eq!(glyphs[1].azimuth_bucket, 10);

    for glyph in &glyphs {
        let back = rhumb_bearing(glyph.origin(), glyph.destination()).unwrap();
        assert!(bearing_difference(back, glyph.azimuth) < 1e-6);
        let travelled = rhumb_distance(glyph.origin(), glyph.destination());
        assert!(approx_eq(travelled, glyph.display_length, 1e-2));
    }
}

#[test]
fn test_project_field_near_antimeridian() {
    let cells = vec![cell(0, 179.0, -15.0, 10.0, 90.0)];
    let buckets = AzimuthBuckets::new(45.0).unwrap();
    let glyphs = project_field(&cells, (400_000.0, 400_000.0), &buckets);

    let glyph = &glyphs[0];
    assert_eq!(glyph.lon0, 179.0);
    // Tip stays east of the origin rather than jumping to -177
    assert!(glyph.lon1 > 180.0, "lon1 = {}", glyph.lon1);
    assert!(approx_eq(glyph.lat1, -15.0, 1e-9));
}

#[test]
fn test_project_field_normalizes_origin() {
    // Centroid of a cell past the antimeridian in unwrapped coordinates
    let cells = vec![cell(0, 182.5, 10.0, 10.0, 0.0)];
    let buckets = AzimuthBuckets::new(30.0).unwrap();
    let glyphs = project_field(&cells, (1_000.0, 2_000.0), &buckets);
    assert!(approx_eq(glyphs[0].lon0, -177.5, 1e-9));
    assert!(approx_eq(glyphs[0].lon1, -177.5, 1e-9));
    assert!(glyphs[0].lat1 > 10.0);
}

#[test]
fn test_project_empty() {
    let buckets = AzimuthBuckets::new(30.0).unwrap();
    assert!(project_field(&[], (0.0, 1.0), &buckets).is_empty());
}
