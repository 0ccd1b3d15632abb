//! Unified error type for the storm field pipeline.

use thiserror::Error;

use crate::TrackId;

/// Errors raised while loading tracks or building a vector field.
///
/// Only load and configuration errors abort a run. Track and cell level
/// problems (`InsufficientPoints`, `DegenerateSegment`, `UndefinedCircularMean`)
/// are recorded and the offending item is skipped.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("track {track_id} has {point_count} points, at least {minimum_required} required")]
    InsufficientPoints {
        track_id: TrackId,
        point_count: usize,
        minimum_required: usize,
    },

    #[error("degenerate segment {index} in track {track_id}: endpoints coincide")]
    DegenerateSegment { track_id: TrackId, index: usize },

    #[error("circular mean undefined for cell {cell_id}: {sample_count} azimuths cancel out")]
    UndefinedCircularMean { cell_id: u32, sample_count: usize },

    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unable to read or write table: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FieldError>;

/// Convert missing values into pipeline errors.
pub trait OptionExt<T> {
    /// Map `None` to [`FieldError::InsufficientPoints`].
    fn ok_or_insufficient_points(
        self,
        track_id: &TrackId,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T>;

    /// Map `None` to [`FieldError::InvalidRecord`].
    fn ok_or_invalid_record(self, line: u64, reason: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient_points(
        self,
        track_id: &TrackId,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T> {
        self.ok_or_else(|| FieldError::InsufficientPoints {
            track_id: track_id.clone(),
            point_count,
            minimum_required,
        })
    }

    fn ok_or_invalid_record(self, line: u64, reason: &str) -> Result<T> {
        self.ok_or_else(|| FieldError::InvalidRecord {
            line,
            reason: reason.to_string(),
        })
    }
}
