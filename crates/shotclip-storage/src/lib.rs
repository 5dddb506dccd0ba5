//! Storage for shotclip.
//!
//! This crate provides:
//! - The clip store: one directory per shot type holding extracted clips
//! - Upload staging: per-request unique temporary files for transcoder input
//! - The clip archive: copies of clips in an S3-compatible bucket

pub mod archive;
pub mod error;
pub mod staging;
pub mod store;

pub use archive::{
    archive_key, ArchivedClip, ClipArchive, ObjectStore, S3Client, S3Config, ARCHIVE_PREFIX,
};
pub use error::{StorageError, StorageResult};
pub use staging::{StagedInput, StagingArea};
pub use store::{ArtifactState, ClipStore};
