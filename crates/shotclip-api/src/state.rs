//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use shotclip_media::{FfmpegTranscoder, Transcoder};
use shotclip_storage::{ClipArchive, ClipStore, S3Client, StagingArea};

use crate::config::ApiConfig;
use crate::services::ClipExtractionService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub extraction: ClipExtractionService,
    /// Clip archive bucket; `None` when no S3 credentials are configured
    pub archive: Option<ClipArchive>,
}

impl AppState {
    /// Create application state backed by the FFmpeg transcoder and, when
    /// the environment carries S3 settings, the clip archive.
    pub fn new(config: ApiConfig) -> Self {
        let transcoder = FfmpegTranscoder::new()
            .with_binary(config.ffmpeg_bin.clone())
            .with_timeout(config.transcode_timeout_secs);

        let state = Self::with_transcoder(config, Arc::new(transcoder));

        match S3Client::from_env() {
            Ok(client) => {
                info!("Clip archive enabled (bucket: {})", client.bucket());
                state.with_archive(ClipArchive::new(Arc::new(client)))
            }
            Err(e) => {
                warn!("Clip archive disabled: {}", e);
                state
            }
        }
    }

    /// Create application state with a caller-supplied transcoder and no archive.
    pub fn with_transcoder(config: ApiConfig, transcoder: Arc<dyn Transcoder>) -> Self {
        let store = ClipStore::new(config.clips_dir.clone());
        let staging = match &config.staging_dir {
            Some(dir) => StagingArea::new(dir.clone()),
            None => StagingArea::system(),
        };

        let extraction = ClipExtractionService::new(
            store,
            staging,
            transcoder,
            config.max_concurrent_transcodes,
        );

        Self {
            config,
            extraction,
            archive: None,
        }
    }

    pub fn with_archive(mut self, archive: ClipArchive) -> Self {
        self.archive = Some(archive);
        self
    }
}
