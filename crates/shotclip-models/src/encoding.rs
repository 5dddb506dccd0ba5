//! Clip encoding parameters.

/// Video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Encoding preset; clips favour turnaround over compression
pub const DEFAULT_PRESET: &str = "ultrafast";
/// Value passed to `-strict`
pub const DEFAULT_STRICTNESS: &str = "experimental";
/// Metadata key carrying the shot type label
pub const SHOT_TYPE_METADATA_KEY: &str = "shot_type";

/// Encoding configuration applied to every extracted clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    pub codec: String,

    /// Encoding preset (e.g., "ultrafast", "fast")
    pub preset: String,

    /// Audio codec
    pub audio_codec: String,

    /// Standards compliance level passed to `-strict`
    pub strictness: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            strictness: DEFAULT_STRICTNESS.to_string(),
        }
    }
}
