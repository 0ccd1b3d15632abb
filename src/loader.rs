//! Storm track point loading from CSV tables.
//!
//! The expected layout follows the common best-track exports: one row per
//! observation with `name`, `year`, either `month`/`day`/`hour` or a single
//! `timestamp` column, `lat` and `long` (aliases `lon`, `lng`, `longitude`),
//! and optional `status`, `category`, `wind` and `pressure` columns.
//! Unknown columns are ignored. `NA` or empty intensity values are treated
//! as missing.
//!
//! Loading is all-or-nothing: the first malformed row aborts with
//! [`FieldError::InvalidRecord`] naming the line.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, OptionExt, Result};
use crate::{TrackId, TrackPoint};

const MAX_CATEGORY: f64 = 5.0;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// One raw row of a storm track table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormRecord {
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "long", alias = "lng", alias = "longitude")]
    pub lon: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub wind: Option<String>,
    #[serde(default)]
    pub pressure: Option<String>,
}

impl StormRecord {
    /// Validate the row and convert it into a [`TrackPoint`].
    ///
    /// `line` is the 1-based line number used in error messages.
    pub fn into_point(self, line: u64) -> Result<TrackPoint> {
        if self.name.trim().is_empty() {
            return Err(invalid(line, "empty storm name"));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(invalid(line, &format!("latitude {} out of range", self.lat)));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(invalid(line, &format!("longitude {} out of range", self.lon)));
        }

        let timestamp = self.timestamp(line)?;
        let wind = parse_optional_number(self.wind.as_deref(), line, "wind")?;
        let pressure = parse_optional_number(self.pressure.as_deref(), line, "pressure")?;
        let category = parse_category(self.category.as_deref(), line)?;
        let status = self
            .status
            .map(|s| s.trim().to_string())
            .filter(|s| !is_missing(s));

        Ok(TrackPoint {
            track_id: TrackId::new(&self.name, self.year),
            longitude: self.lon,
            latitude: self.lat,
            timestamp,
            wind,
            pressure,
            status,
            category,
        })
    }

    fn timestamp(&self, line: u64) -> Result<NaiveDateTime> {
        if let Some(raw) = self.timestamp.as_deref().map(str::trim) {
            if !is_missing(raw) {
                return parse_timestamp(raw)
                    .ok_or_invalid_record(line, &format!("unrecognised timestamp '{}'", raw));
            }
        }

        let month = self
            .month
            .ok_or_invalid_record(line, "missing timestamp or month/day columns")?;
        let day = self
            .day
            .ok_or_invalid_record(line, "missing timestamp or month/day columns")?;
        NaiveDate::from_ymd_opt(self.year, month, day)
            .and_then(|d| d.and_hms_opt(self.hour.unwrap_or(0), 0, 0))
            .ok_or_invalid_record(
                line,
                &format!(
                    "invalid date {}-{}-{} hour {}",
                    self.year,
                    month,
                    day,
                    self.hour.unwrap_or(0)
                ),
            )
    }
}

fn invalid(line: u64, reason: &str) -> FieldError {
    FieldError::InvalidRecord {
        line,
        reason: reason.to_string(),
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("na") || value.eq_ignore_ascii_case("nan")
}

fn parse_optional_number(value: Option<&str>, line: u64, column: &str) -> Result<Option<f64>> {
    match value.map(str::trim) {
        None => Ok(None),
        Some(v) if is_missing(v) => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_invalid_record(line, &format!("non-numeric {} '{}'", column, v)),
    }
}

/// Saffir-Simpson category: a whole number from 0 to 5, or missing.
fn parse_category(value: Option<&str>, line: u64) -> Result<Option<u8>> {
    let Some(category) = parse_optional_number(value, line, "category")? else {
        return Ok(None);
    };
    if category.fract() != 0.0 || !(0.0..=MAX_CATEGORY).contains(&category) {
        return Err(invalid(
            line,
            &format!("category {} is not a whole number in 0..=5", category),
        ));
    }
    Ok(Some(category as u8))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Load and validate track points from any CSV reader.
///
/// Row order is preserved; tracks are assumed to be listed in time order.
///
/// # Example
/// ```
/// use stormfield::load_track_points;
///
/// let csv = "name,year,month,day,hour,lat,long,wind\n\
///            Amy,1975,6,27,0,27.5,-79.0,25\n\
///            Amy,1975,6,27,6,28.5,-79.0,25\n";
/// let points = load_track_points(csv.as_bytes()).unwrap();
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[0].track_id.as_str(), "AMY-1975");
/// ```
pub fn load_track_points<R: Read>(reader: R) -> Result<Vec<TrackPoint>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut points = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        let record: StormRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| invalid(line, &e.to_string()))?;
        points.push(record.into_point(line)?);
    }

    info!("[Loader] Loaded {} track points", points.len());
    Ok(points)
}

/// Load and validate track points from a CSV file.
pub fn load_track_points_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<TrackPoint>> {
    let file = File::open(path.as_ref())?;
    info!("[Loader] Reading {}", path.as_ref().display());
    load_track_points(BufReader::new(file))
}
