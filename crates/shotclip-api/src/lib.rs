//! Axum HTTP API server for clip extraction.
//!
//! This crate provides:
//! - `POST /api/extract-clip`: upload a video, get back the requested sub-clip
//! - `POST /api/upload`: copy a finished clip into the S3 clip archive
//! - The clip extraction pipeline (stage → transcode → validate → cleanup)
//! - CORS, rate limiting, security headers and request ids
//! - Prometheus metrics and health/readiness probes

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use logging::RequestLogger;
pub use routes::create_router;
pub use services::{ClipExtractionService, ClipRequest, ExtractedClip, ExtractionError};
pub use state::AppState;
