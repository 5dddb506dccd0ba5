//! Upload staging.
//!
//! Uploaded videos are written to a temporary file that the transcoder reads
//! as its input. Every request gets its own file, so concurrent requests never
//! read or delete each other's input.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use shotclip_models::RequestId;

use crate::error::{StorageError, StorageResult};

const STAGING_PREFIX: &str = "shotclip-upload-";

/// Directory in which uploads are staged.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stage into the system temporary directory.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to a fresh, uniquely named file and fsync it.
    ///
    /// The file is durable on disk before this returns, so an external process
    /// opening the path sees the complete upload. If any step fails the
    /// partially written file is removed.
    pub async fn stage(&self, bytes: &[u8], request_id: &RequestId) -> StorageResult<StagedInput> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            StorageError::staging_failed(format!(
                "cannot create staging directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let dir = self.dir.clone();
        let prefix = format!("{}{}-", STAGING_PREFIX, request_id.file_tag());
        let named = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".mp4")
                .tempfile_in(&dir)
                .map_err(|e| {
                    StorageError::staging_failed(format!(
                        "cannot create staging file in {}: {}",
                        dir.display(),
                        e
                    ))
                })
        })
        .await
        .map_err(|e| StorageError::staging_failed(format!("staging task failed: {}", e)))??;

        let (file, path) = named.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        debug!(
            path = %path.display(),
            size_bytes = bytes.len(),
            "Staged upload"
        );

        Ok(StagedInput {
            path,
            size: bytes.len() as u64,
        })
    }
}

/// A staged upload on disk.
///
/// Call [`StagedInput::remove`] to delete it and observe failures; dropping it
/// without doing so still deletes the file on a best-effort basis.
#[derive(Debug)]
pub struct StagedInput {
    path: TempPath,
    size: u64,
}

impl StagedInput {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the staged upload in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Delete the staged file. A file that is already gone counts as removed.
    pub fn remove(self) -> StorageResult<()> {
        let path = self.path.to_path_buf();
        match self.path.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::CleanupFailed { path, source }),
        }
    }
}
