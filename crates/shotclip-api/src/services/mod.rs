//! Business logic services.

pub mod extraction;

pub use extraction::{
    ClipExtractionService, ClipRequest, ExtractedClip, ExtractionError, ExtractionResult,
};
