//! API configuration.

use std::path::PathBuf;

/// Default browser origin allowed by CORS.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second per client IP
    pub rate_limit_rps: u32,
    /// Max request body size (the upload dominates this)
    pub max_body_size: usize,
    /// Root of the clip store
    pub clips_dir: PathBuf,
    /// Directory for staged uploads; `None` uses the system temp directory
    pub staging_dir: Option<PathBuf>,
    /// FFmpeg binary name or path
    pub ffmpeg_bin: PathBuf,
    /// Upper bound on a single transcoder run, in seconds
    pub transcode_timeout_secs: u64,
    /// Maximum transcoder processes running at once
    pub max_concurrent_transcodes: usize,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            rate_limit_rps: 10,
            max_body_size: 1024 * 1024 * 1024, // 1GB
            clips_dir: PathBuf::from("clips"),
            staging_dir: None,
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            transcode_timeout_secs: 600,
            max_concurrent_transcodes: 4,
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            clips_dir: std::env::var("CLIPS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.clips_dir),
            staging_dir: std::env::var("STAGING_DIR").ok().map(PathBuf::from),
            ffmpeg_bin: std::env::var("FFMPEG_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_bin),
            transcode_timeout_secs: std::env::var("TRANSCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.transcode_timeout_secs),
            max_concurrent_transcodes: std::env::var("MAX_CONCURRENT_TRANSCODES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrent_transcodes),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
