//! FFmpeg CLI wrapper for clip extraction.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - The `Transcoder` seam used by the extraction pipeline
//! - An FFmpeg-backed transcoder with buffered output capture and a bounded wait

pub mod command;
pub mod error;
pub mod transcoder;

pub use command::{check_ffmpeg, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use transcoder::{FfmpegTranscoder, TranscodeJob, TranscodeOutput, Transcoder};
