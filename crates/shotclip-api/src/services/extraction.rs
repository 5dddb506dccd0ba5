//! Clip extraction pipeline.
//!
//! One linear pass per request:
//! 1. ensure the shot type directory exists in the clip store
//! 2. stage the upload to a per-request temp file (fsynced)
//! 3. run the transcoder against it, bounded by a concurrency limit
//! 4. check exit status, then that the artifact exists and is non-empty
//! 5. remove the staged upload, whatever happened in 3-4
//!
//! The artifact stays in the clip store; it is never cleaned up here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, Instrument};

use shotclip_media::{MediaError, TranscodeJob, Transcoder};
use shotclip_models::{artifact_file_name, ClipRange, ShotType};
use shotclip_storage::{ArtifactState, ClipStore, StagedInput, StagingArea, StorageError};

use crate::logging::RequestLogger;
use crate::metrics;

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Ways the pipeline can fail. The HTTP layer reports all of them as one
/// internal-failure category; the variants exist for logs and metrics.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The transcoder exited non-zero; carries its standard error verbatim.
    #[error("{stderr}")]
    TranscodeFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Output file was not created")]
    OutputMissing,

    #[error("Output file is empty")]
    OutputEmpty,

    #[error("Transcoder timed out after {0} seconds")]
    TimedOut(u64),

    /// Staging, directory creation or other I/O failed.
    #[error("{0}")]
    Unexpected(String),
}

impl ExtractionError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::TranscodeFailed { .. } => "transcode_failed",
            ExtractionError::OutputMissing => "output_missing",
            ExtractionError::OutputEmpty => "output_empty",
            ExtractionError::TimedOut(_) => "timed_out",
            ExtractionError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<StorageError> for ExtractionError {
    fn from(e: StorageError) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl From<MediaError> for ExtractionError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Timeout(secs) => Self::TimedOut(secs),
            other => Self::Unexpected(other.to_string()),
        }
    }
}

/// A validated extraction request.
#[derive(Debug, Clone)]
pub struct ClipRequest {
    /// Full uploaded video
    pub video: Bytes,
    pub range: ClipRange,
    pub shot_type: ShotType,
}

/// A clip that is on disk and ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedClip {
    pub path: PathBuf,
    /// Suggested download name, `<shot_type>_<start>_<end>.mp4`
    pub file_name: String,
    pub size: u64,
}

/// Orchestrates staging, transcoding and artifact validation.
#[derive(Clone)]
pub struct ClipExtractionService {
    store: ClipStore,
    staging: StagingArea,
    transcoder: Arc<dyn Transcoder>,
    permits: Arc<Semaphore>,
}

impl ClipExtractionService {
    /// Create the service. At most `max_concurrent_transcodes` transcoder
    /// processes run at once (minimum 1); further requests wait their turn.
    pub fn new(
        store: ClipStore,
        staging: StagingArea,
        transcoder: Arc<dyn Transcoder>,
        max_concurrent_transcodes: usize,
    ) -> Self {
        Self {
            store,
            staging,
            transcoder,
            permits: Arc::new(Semaphore::new(max_concurrent_transcodes.max(1))),
        }
    }

    pub fn store(&self) -> &ClipStore {
        &self.store
    }

    /// Run the full pipeline for one request.
    pub async fn extract_clip(
        &self,
        request: ClipRequest,
        log: &RequestLogger,
    ) -> ExtractionResult<ExtractedClip> {
        let started = Instant::now();
        log.log_start(&format!(
            "shot_type={} range={} upload_bytes={}",
            request.shot_type,
            request.range,
            request.video.len()
        ));

        let result = self
            .run(&request, log)
            .instrument(log.create_span())
            .await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(clip) => {
                metrics::record_clip_extracted();
                log.log_completion(&format!(
                    "{} ({} bytes) in {}ms",
                    clip.path.display(),
                    clip.size,
                    elapsed_ms
                ));
            }
            Err(e) => {
                metrics::record_extraction_failure(e.kind());
                log.log_error(&format!("{} failed after {}ms: {}", e.kind(), elapsed_ms, e));
            }
        }

        result
    }

    async fn run(&self, request: &ClipRequest, log: &RequestLogger) -> ExtractionResult<ExtractedClip> {
        let label_dir = self.store.ensure_label_dir(&request.shot_type).await?;
        log.log_progress(&format!("clip directory {}", label_dir.display()));

        let staged = self.staging.stage(&request.video, log.request_id()).await?;
        metrics::record_upload_bytes(staged.size());
        log.log_progress(&format!(
            "staged {} bytes at {}",
            staged.size(),
            staged.path().display()
        ));

        let result = self.transcode_staged(request, &staged, log).await;

        self.cleanup(staged, log);

        result
    }

    async fn transcode_staged(
        &self,
        request: &ClipRequest,
        staged: &StagedInput,
        log: &RequestLogger,
    ) -> ExtractionResult<ExtractedClip> {
        let output_path = self.store.artifact_path(&request.shot_type, &request.range);
        let job = TranscodeJob {
            input: staged.path().to_path_buf(),
            output: output_path.clone(),
            range: request.range,
            shot_type: request.shot_type.clone(),
        };

        let output = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| ExtractionError::Unexpected("transcoder pool is closed".to_string()))?;
            self.transcoder.transcode(&job).await?
        };

        metrics::record_transcode_duration(output.elapsed.as_secs_f64());
        info!(
            request_id = %log.request_id(),
            exit_code = ?output.exit_code,
            elapsed_ms = output.elapsed.as_millis() as u64,
            stdout = %output.stdout,
            stderr = %output.stderr,
            "Transcoder finished"
        );

        if !output.success() {
            return Err(ExtractionError::TranscodeFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        match self.store.inspect_artifact(&output_path).await? {
            ArtifactState::Missing => Err(ExtractionError::OutputMissing),
            ArtifactState::Empty => Err(ExtractionError::OutputEmpty),
            ArtifactState::Ready { size } => {
                log.log_progress(&format!("output file size: {} bytes", size));
                Ok(ExtractedClip {
                    path: output_path,
                    file_name: artifact_file_name(&request.shot_type, &request.range),
                    size,
                })
            }
        }
    }

    /// Remove the staged upload. Failures are logged and counted, never raised.
    fn cleanup(&self, staged: StagedInput, log: &RequestLogger) {
        let path = staged.path().to_path_buf();
        match staged.remove() {
            Ok(()) => log.log_progress(&format!("removed staged upload {}", path.display())),
            Err(e) => {
                metrics::record_staging_cleanup_failure();
                log.log_error(&format!("error deleting staged upload: {}", e));
            }
        }
    }
}
