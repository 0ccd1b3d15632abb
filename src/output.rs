//! Table output for glyphs and segments.
//!
//! The glyph table is the hand-off to any renderer: one row per arrow with
//! `cell_id, lon0, lat0, lon1, lat1, length, display_length, azimuth, azimuth_bucket`.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::field::VectorGlyph;
use crate::segments::Segment;

/// Header of the glyph table, written even when there are no glyphs.
pub const GLYPH_COLUMNS: [&str; 9] = [
    "cell_id",
    "lon0",
    "lat0",
    "lon1",
    "lat1",
    "length",
    "display_length",
    "azimuth",
    "azimuth_bucket",
];

/// Flat row for the segment inspection table.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRow<'a> {
    pub track_id: &'a str,
    pub index: usize,
    pub start_time: String,
    pub end_time: String,
    pub lon0: f64,
    pub lat0: f64,
    pub lon1: f64,
    pub lat1: f64,
    pub centroid_lon: f64,
    pub centroid_lat: f64,
    pub azimuth: f64,
    pub length: f64,
}

impl<'a> From<&'a Segment> for SegmentRow<'a> {
    fn from(s: &'a Segment) -> Self {
        Self {
            track_id: s.track_id.as_str(),
            index: s.index,
            start_time: s.start_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end_time: s.end_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            lon0: s.start.x,
            lat0: s.start.y,
            lon1: s.end.x,
            lat1: s.end.y,
            centroid_lon: s.centroid.x,
            centroid_lat: s.centroid.y,
            azimuth: s.azimuth,
            length: s.length,
        }
    }
}

/// Write glyphs as CSV with a header row.
pub fn write_glyphs_csv<W: Write>(glyphs: &[VectorGlyph], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if glyphs.is_empty() {
        csv_writer.write_record(GLYPH_COLUMNS)?;
    }
    for glyph in glyphs {
        csv_writer.serialize(glyph)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write glyphs as a pretty-printed JSON array.
pub fn write_glyphs_json<W: Write>(glyphs: &[VectorGlyph], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, glyphs)?;
    Ok(())
}

/// Write the segment table as CSV with a header row.
pub fn write_segments_csv<W: Write>(segments: &[Segment], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for segment in segments {
        csv_writer.serialize(SegmentRow::from(segment))?;
    }
    csv_writer.flush()?;
    Ok(())
}
