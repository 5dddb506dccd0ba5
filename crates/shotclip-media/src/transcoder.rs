//! Transcoder seam and the FFmpeg implementation.
//!
//! The pipeline only needs "run this transcode and tell me what happened", so
//! it depends on the [`Transcoder`] trait. [`FfmpegTranscoder`] shells out to
//! the real binary; tests substitute their own implementation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use shotclip_models::encoding::SHOT_TYPE_METADATA_KEY;
use shotclip_models::{ClipRange, EncodingConfig, ShotType};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// One clip extraction for the transcoder to perform.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    /// Staged source video
    pub input: PathBuf,
    /// Artifact path to write
    pub output: PathBuf,
    /// Time range to extract
    pub range: ClipRange,
    /// Label embedded as container metadata
    pub shot_type: ShotType,
}

impl TranscodeJob {
    /// Build the FFmpeg command for this job.
    ///
    /// Seeking happens after `-i` so the cut is frame accurate; the output is
    /// always overwritten.
    pub fn to_command(&self, encoding: &EncodingConfig) -> FfmpegCommand {
        FfmpegCommand::new(&self.input, &self.output)
            .start_at(self.range.start_secs())
            .duration(self.range.duration_secs())
            .video_codec(&encoding.codec)
            .preset(&encoding.preset)
            .audio_codec(&encoding.audio_codec)
            .metadata(SHOT_TYPE_METADATA_KEY, self.shot_type.as_str())
            .strict(&encoding.strictness)
            .overwrite(true)
    }
}

/// What a finished transcoder process reported.
#[derive(Debug, Clone, Default)]
pub struct TranscodeOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl TranscodeOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a transcode job to completion.
///
/// Returns `Ok` whenever the process ran, whatever its exit status. `Err` is
/// reserved for failing to run it at all or for exceeding the time limit.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, job: &TranscodeJob) -> MediaResult<TranscodeOutput>;
}

/// Transcoder that invokes the FFmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    timeout_secs: Option<u64>,
    encoding: EncodingConfig,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegTranscoder {
    /// Create a transcoder using `ffmpeg` from `PATH`, no time limit and the
    /// default encoding.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            timeout_secs: None,
            encoding: EncodingConfig::default(),
        }
    }

    /// Use a specific FFmpeg binary.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Kill the process and fail with `MediaError::Timeout` after `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, job: &TranscodeJob) -> MediaResult<TranscodeOutput> {
        let args = job.to_command(&self.encoding).build_args();
        debug!("Running FFmpeg: {} {}", self.binary.display(), args.join(" "));

        let started = Instant::now();

        // kill_on_drop makes dropping the wait future (on timeout) kill the child
        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::FfmpegNotFound(self.binary.clone())
                } else {
                    MediaError::SpawnFailed(e)
                }
            })?;

        let output = match self.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output()).await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!(
                            output = %job.output.display(),
                            "FFmpeg timed out after {} seconds, killing process", secs
                        );
                        return Err(MediaError::Timeout(secs));
                    }
                }
            }
            None => child.wait_with_output().await?,
        };

        Ok(TranscodeOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed: started.elapsed(),
        })
    }
}
