//! FFmpeg command builder.

use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg commands.
///
/// Arguments are emitted as `-i <input> <output args> -y|-n <output>`.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Frame-accurate start offset applied while decoding (after -i).
    pub fn start_at(self, seconds: f64) -> Self {
        self.output_arg("-ss").output_arg(format!("{:.3}", seconds))
    }

    /// Set output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Attach a container metadata tag.
    pub fn metadata(self, key: &str, value: &str) -> Self {
        self.output_arg("-metadata")
            .output_arg(format!("{}={}", key, value))
    }

    /// Set standards strictness (`-strict`).
    pub fn strict(self, level: impl Into<String>) -> Self {
        self.output_arg("-strict").output_arg(level)
    }

    /// Whether an existing output file is overwritten (`-y`) or refused (`-n`).
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());

        args.push(if self.overwrite { "-y" } else { "-n" }.to_string());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Resolve the FFmpeg binary, either a bare name looked up on `PATH` or an
/// explicit path.
pub fn check_ffmpeg(binary: impl AsRef<Path>) -> MediaResult<PathBuf> {
    let binary = binary.as_ref();
    which::which(binary).map_err(|_| MediaError::FfmpegNotFound(binary.to_path_buf()))
}
