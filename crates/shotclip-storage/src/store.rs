//! Clip store: extracted clips on local disk, one directory per shot type.
//!
//! Layout: `<root>/<shot_type>/<shot_type>_<start>_<end>.mp4`. Directories are
//! created on demand and clips are never pruned.

use std::path::{Path, PathBuf};

use tracing::debug;

use shotclip_models::{artifact_file_name, ClipRange, ShotType};

use crate::error::{StorageError, StorageResult};

/// State of an expected artifact after the transcoder has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    /// Nothing exists at the artifact path.
    Missing,
    /// A zero-length file exists.
    Empty,
    /// A non-empty file exists.
    Ready { size: u64 },
}

/// Root of the clip directory tree.
#[derive(Debug, Clone)]
pub struct ClipStore {
    root: PathBuf,
}

impl ClipStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every clip for a shot type.
    pub fn label_dir(&self, shot_type: &ShotType) -> PathBuf {
        self.root.join(shot_type.as_str())
    }

    /// Deterministic path of the clip for a shot type and range.
    pub fn artifact_path(&self, shot_type: &ShotType, range: &ClipRange) -> PathBuf {
        self.label_dir(shot_type)
            .join(artifact_file_name(shot_type, range))
    }

    /// Create the shot type directory (and any missing parents). Idempotent and
    /// safe to race.
    pub async fn ensure_label_dir(&self, shot_type: &ShotType) -> StorageResult<PathBuf> {
        let dir = self.label_dir(shot_type);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::CreateDirFailed {
                path: dir.clone(),
                source,
            })?;
        debug!(dir = %dir.display(), "Clip directory ready");
        Ok(dir)
    }

    /// Inspect what the transcoder left at `path`.
    pub async fn inspect_artifact(&self, path: &Path) -> StorageResult<ArtifactState> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if !meta.is_file() => Ok(ArtifactState::Missing),
            Ok(meta) if meta.len() == 0 => Ok(ArtifactState::Empty),
            Ok(meta) => Ok(ArtifactState::Ready { size: meta.len() }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ArtifactState::Missing),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Verify the store root exists (creating it if needed) and accepts writes.
    pub async fn check_writable(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::not_writable(format!("{}: {}", self.root.display(), e)))?;

        let root = self.root.clone();
        tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".shotclip-probe-")
                .tempfile_in(&root)
                .map(drop)
                .map_err(|e| StorageError::not_writable(format!("{}: {}", root.display(), e)))
        })
        .await
        .map_err(|e| StorageError::not_writable(format!("probe task failed: {}", e)))?
    }
}
