//! Shared data models for the shotclip service.
//!
//! This crate provides:
//! - Validated shot type labels and clip time ranges
//! - Deterministic artifact naming
//! - Request identifiers
//! - Fixed encoding parameters for extracted clips

pub mod clip;
pub mod encoding;
pub mod error;
pub mod request;
pub mod shot_type;

// Re-export common types
pub use clip::{artifact_file_name, ClipRange};
pub use encoding::EncodingConfig;
pub use error::{ModelError, ModelResult};
pub use request::RequestId;
pub use shot_type::ShotType;
