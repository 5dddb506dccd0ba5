//! Clip time ranges and artifact naming.

use serde::Serialize;
use std::fmt;

use crate::error::{ModelError, ModelResult};
use crate::shot_type::ShotType;

/// Container extension for every extracted clip.
pub const CLIP_EXTENSION: &str = "mp4";

/// A validated `[start, end)` range in seconds within the source video,
/// rounded to whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipRange {
    start_secs: f64,
    end_secs: f64,
}

impl ClipRange {
    /// Create a range, rejecting non-finite values, negative starts and
    /// empty or inverted ranges.
    pub fn new(start_secs: f64, end_secs: f64) -> ModelResult<Self> {
        if !start_secs.is_finite() || !end_secs.is_finite() {
            return Err(ModelError::invalid_range(
                "start_time and end_time must be finite numbers",
            ));
        }

        if start_secs < 0.0 {
            return Err(ModelError::invalid_range(format!(
                "start_time must not be negative (got {})",
                start_secs
            )));
        }

        // Arguments and file names carry millisecond precision, so the range
        // is validated and stored at that precision.
        let start_ms = (start_secs * 1000.0).round();
        let end_ms = (end_secs * 1000.0).round();
        if end_ms <= start_ms {
            return Err(ModelError::invalid_range(format!(
                "end_time ({}) must be at least 1ms after start_time ({})",
                end_secs, start_secs
            )));
        }

        Ok(Self {
            start_secs: start_ms / 1000.0,
            end_secs: end_ms / 1000.0,
        })
    }

    pub fn start_secs(&self) -> f64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> f64 {
        self.end_secs
    }

    /// Clip length in seconds. Always at least one millisecond.
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

impl fmt::Display for ClipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s-{:.3}s", self.start_secs, self.end_secs)
    }
}

/// File name of the artifact for a label and range:
/// `<shot_type>_<start:.3>_<end:.3>.mp4`.
///
/// Identical label and range (to millisecond precision) map to the same name,
/// so a repeated request overwrites the earlier artifact.
pub fn artifact_file_name(shot_type: &ShotType, range: &ClipRange) -> String {
    format!(
        "{}_{:.3}_{:.3}.{}",
        shot_type,
        range.start_secs(),
        range.end_secs(),
        CLIP_EXTENSION
    )
}
