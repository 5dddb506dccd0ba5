//! Clip archive upload handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use shotclip_models::RequestId;
use shotclip_storage::StorageError;

use crate::error::{ApiError, ApiResult};
use crate::logging::RequestLogger;
use crate::metrics;
use crate::state::AppState;

/// Upload request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadClipRequest {
    /// Archive-relative name, e.g. `wide/interview_2-5.mp4`
    #[serde(default)]
    pub file_name: Option<String>,
    /// Base64 (standard alphabet, padded) clip bytes
    #[serde(default)]
    pub file_content: Option<String>,
}

/// Upload response body.
#[derive(Debug, Serialize)]
pub struct UploadClipResponse {
    pub message: String,
    pub key: String,
    pub size: u64,
}

/// Store a clip in the archive bucket at `clips/<fileName>`.
pub async fn upload_clip(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<UploadClipRequest>, JsonRejection>,
) -> ApiResult<Json<UploadClipResponse>> {
    let Json(payload) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::payload_too_large(rejection.body_text())
        } else {
            ApiError::bad_request(rejection.body_text())
        }
    })?;

    let (file_name, file_content) = match (payload.file_name, payload.file_content) {
        (Some(name), Some(content)) if !name.is_empty() && !content.is_empty() => (name, content),
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };

    let data = STANDARD
        .decode(file_content.trim())
        .map_err(|e| ApiError::bad_request(format!("fileContent is not valid base64: {}", e)))?;

    let archive = state
        .archive
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Clip archive is not configured"))?;

    let log = RequestLogger::new(&request_id, "upload_clip");
    log.log_start(&format!("file_name={} bytes={}", file_name, data.len()));

    match archive.upload(&file_name, data).await {
        Ok(archived) => {
            metrics::record_clip_archived(archived.size);
            log.log_completion(&format!("{} ({} bytes)", archived.key, archived.size));
            Ok(Json(UploadClipResponse {
                message: "Upload successful".to_string(),
                key: archived.key,
                size: archived.size,
            }))
        }
        Err(StorageError::InvalidKey(reason)) => Err(ApiError::bad_request(reason)),
        Err(e) => {
            metrics::record_archive_failure();
            log.log_error(&format!("archive upload failed: {}", e));
            Err(ApiError::ArchiveUploadFailed)
        }
    }
}
