//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while running the transcoder.
///
/// A transcoder that runs to completion with a non-zero exit status is not an
/// error at this level; it is reported through `TranscodeOutput`.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found: {0}")]
    FfmpegNotFound(PathBuf),

    #[error("Failed to start FFmpeg: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
