//! Synthetic storm track generator for stress testing and benchmarking.
//!
//! Generates seasons of storm tracks with known steering patterns, providing
//! ground truth for the direction of the resulting vector field.
//!
//! Feature-gated behind `synthetic`; not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use stormfield::synthetic::{SyntheticStormScenario, TrackPattern};
//!
//! let scenario = SyntheticStormScenario {
//!     genesis_lon: -40.0,
//!     genesis_lat: 12.0,
//!     genesis_spread_degrees: 5.0,
//!     season: 2001,
//!     storm_count: 20,
//!     points_per_storm: 24,
//!     step_meters: 120_000.0,
//!     pattern: TrackPattern::Straight { heading: 290.0 },
//!     position_noise_meters: 5_000.0,
//!     seed: 42,
//! };
//!
//! let dataset = scenario.generate();
//! assert_eq!(dataset.storm_count(), 20);
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime};
use geo::Coord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::io::Write;

use crate::error::Result;
use crate::geo_utils::{normalize_bearing, normalize_longitude, rhumb_destination};
use crate::{TrackId, TrackPoint};

// ============================================================================
// Types
// ============================================================================

/// Steering pattern for generated tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackPattern {
    /// Constant heading with minor wobble.
    Straight { heading: f64 },
    /// Westward drift turning north then north-east (classic Atlantic recurvature).
    Recurving,
    /// Random walk heading (max ~15deg change per step).
    Meandering,
}

/// Metadata about a generated dataset.
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    /// Total observations across all storms.
    pub total_points: usize,
    /// Number of consecutive point pairs.
    pub total_segments: usize,
}

/// A generated season of storm observations.
pub struct SyntheticStormSet {
    /// Observations, grouped by storm and in time order.
    pub points: Vec<TrackPoint>,
    /// Initial heading of each storm (ground truth for straight patterns).
    pub initial_headings: Vec<(TrackId, f64)>,
    pub metadata: DatasetMetadata,
}

/// Scenario configuration for generating synthetic storms.
#[derive(Debug, Clone)]
pub struct SyntheticStormScenario {
    /// Centre of the genesis region (degrees).
    pub genesis_lon: f64,
    pub genesis_lat: f64,
    /// Half-width of the genesis box in degrees.
    pub genesis_spread_degrees: f64,
    /// Season year for all storms.
    pub season: i32,
    pub storm_count: usize,
    /// Observations per storm (6-hourly).
    pub points_per_storm: usize,
    /// Mean distance travelled between observations.
    pub step_meters: f64,
    pub pattern: TrackPattern,
    /// Position noise standard deviation in meters.
    pub position_noise_meters: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

// ============================================================================
// Coordinate Helpers
// ============================================================================

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Observation interval.
const STEP_HOURS: i64 = 6;

/// Storms are stopped before reaching polar latitudes.
const MAX_ABS_LATITUDE: f64 = 70.0;

fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg_lng = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lng.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg_lng
}

/// Standard normal sample (Box-Muller).
fn gaussian(rng: &mut StdRng) -> (f64, f64) {
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.r#gen();
    let r = (-2.0 * u1.ln()).sqrt();
    (r * (2.0 * PI * u2).cos(), r * (2.0 * PI * u2).sin())
}

// ============================================================================
// Track Generation
// ============================================================================

/// Heading for step `i` of `n` under a pattern.
fn next_heading(pattern: TrackPattern, current: f64, i: usize, n: usize, rng: &mut StdRng) -> f64 {
    let heading = match pattern {
        TrackPattern::Straight { heading } => heading + rng.gen_range(-2.0..2.0),
        TrackPattern::Recurving => {
            // 285deg (WNW) sweeping clockwise to 45deg (NE) over the track
            let progress = i as f64 / n.max(1) as f64;
            285.0 + 120.0 * progress + rng.gen_range(-5.0..5.0)
        }
        TrackPattern::Meandering => current + rng.gen_range(-15.0..15.0),
    };
    normalize_bearing(heading)
}

fn generate_storm(
    scenario: &SyntheticStormScenario,
    storm_index: usize,
    rng: &mut StdRng,
) -> (TrackId, f64, Vec<TrackPoint>) {
    let id = TrackId::new(&format!("SYN{:03}", storm_index), scenario.season);

    let spread = scenario.genesis_spread_degrees;
    let mut position = Coord {
        x: normalize_longitude(scenario.genesis_lon + rng.gen_range(-spread..=spread)),
        y: (scenario.genesis_lat + rng.gen_range(-spread..=spread))
            .clamp(-MAX_ABS_LATITUDE, MAX_ABS_LATITUDE),
    };

    let start_day = rng.gen_range(0..120);
    let mut time: NaiveDateTime = NaiveDate::from_ymd_opt(scenario.season, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
        + Duration::days(start_day);

    let peak_wind: f64 = rng.gen_range(40.0..140.0);
    let n = scenario.points_per_storm;
    let mut heading = next_heading(scenario.pattern, rng.gen_range(0.0..360.0), 0, n, rng);
    let initial_heading = heading;

    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let (nx, ny) = gaussian(rng);
        let noisy = Coord {
            x: normalize_longitude(
                position.x + meters_to_deg_lng(nx * scenario.position_noise_meters, position.y),
            ),
            y: (position.y + meters_to_deg_lat(ny * scenario.position_noise_meters))
                .clamp(-90.0, 90.0),
        };

        let life = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
        let wind = (20.0 + (peak_wind - 20.0) * (PI * life).sin()).round();

        points.push(TrackPoint::new(id.clone(), noisy.x, noisy.y, time).with_wind(wind));

        let step = scenario.step_meters * rng.gen_range(0.7..1.3);
        let next = rhumb_destination(position, heading, step);
        if !next.y.is_finite() || next.y.abs() > MAX_ABS_LATITUDE {
            break;
        }
        position = Coord {
            x: normalize_longitude(next.x),
            y: next.y,
        };
        time += Duration::hours(STEP_HOURS);
        heading = next_heading(scenario.pattern, heading, i + 1, n, rng);
    }

    (id, initial_heading, points)
}

// ============================================================================
// Scenario Implementation
// ============================================================================

impl SyntheticStormScenario {
    /// Generate a complete synthetic season from this scenario.
    pub fn generate(&self) -> SyntheticStormSet {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut points = Vec::with_capacity(self.storm_count * self.points_per_storm);
        let mut initial_headings = Vec::with_capacity(self.storm_count);
        let mut total_segments = 0;

        for storm_index in 0..self.storm_count {
            let (id, heading, storm_points) = generate_storm(self, storm_index, &mut rng);
            total_segments += storm_points.len().saturating_sub(1);
            initial_headings.push((id, heading));
            points.extend(storm_points);
        }

        SyntheticStormSet {
            metadata: DatasetMetadata {
                total_points: points.len(),
                total_segments,
            },
            points,
            initial_headings,
        }
    }
}

impl SyntheticStormSet {
    pub fn storm_count(&self) -> usize {
        self.initial_headings.len()
    }

    /// Write the observations in the CSV layout accepted by the loader.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["name", "year", "timestamp", "lat", "long", "wind"])?;
        for p in &self.points {
            let (name, year) = p
                .track_id
                .as_str()
                .rsplit_once('-')
                .unwrap_or((p.track_id.as_str(), ""));
            csv_writer.write_record([
                name.to_string(),
                year.to_string(),
                p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                p.latitude.to_string(),
                p.longitude.to_string(),
                p.wind.map(|w| w.to_string()).unwrap_or_default(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// Predefined Scenarios
// ============================================================================

impl SyntheticStormScenario {
    /// 60 recurving storms from the Main Development Region. Baseline benchmark.
    pub fn atlantic_season() -> Self {
        Self {
            genesis_lon: -45.0,
            genesis_lat: 13.0,
            genesis_spread_degrees: 10.0,
            season: 2005,
            storm_count: 60,
            points_per_storm: 40,
            step_meters: 120_000.0,
            pattern: TrackPattern::Recurving,
            position_noise_meters: 10_000.0,
            seed: 42,
        }
    }

    /// Westward storms starting just east of the antimeridian.
    pub fn antimeridian_crossing() -> Self {
        Self {
            genesis_lon: -172.0,
            genesis_lat: 15.0,
            genesis_spread_degrees: 2.0,
            season: 2015,
            storm_count: 10,
            points_per_storm: 20,
            step_meters: 150_000.0,
            pattern: TrackPattern::Straight { heading: 270.0 },
            position_noise_meters: 0.0,
            seed: 43,
        }
    }

    /// Configurable scenario for benchmarks: N meandering storms.
    pub fn with_storm_count(count: usize) -> Self {
        Self {
            genesis_lon: -60.0,
            genesis_lat: 20.0,
            genesis_spread_degrees: 15.0,
            season: 2010,
            storm_count: count,
            points_per_storm: 40,
            step_meters: 120_000.0,
            pattern: TrackPattern::Meandering,
            position_noise_meters: 5_000.0,
            seed: count as u64 * 7919,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
