//! Clip extraction handler.

use axum::body::{Body, Bytes};
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Extension;
use tokio_util::io::ReaderStream;
use tracing::warn;

use shotclip_models::{ClipRange, RequestId, ShotType};

use crate::error::{ApiError, ApiResult};
use crate::logging::RequestLogger;
use crate::services::ClipRequest;
use crate::state::AppState;

/// Raw multipart fields, before validation.
#[derive(Default)]
struct ClipForm {
    video: Option<Bytes>,
    start_time: Option<String>,
    end_time: Option<String>,
    shot_type: Option<String>,
}

impl ClipForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("Invalid multipart body", e))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "video" => {
                    form.video = Some(
                        field
                            .bytes()
                            .await
                            .map_err(|e| multipart_error("Failed to read video", e))?,
                    );
                }
                "start_time" | "end_time" | "shot_type" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| multipart_error(&format!("Failed to read {}", name), e))?;
                    match name.as_str() {
                        "start_time" => form.start_time = Some(value),
                        "end_time" => form.end_time = Some(value),
                        _ => form.shot_type = Some(value),
                    }
                }
                _ => {
                    // Unknown fields are drained and ignored
                    warn!(field = %name, "Ignoring unexpected multipart field");
                }
            }
        }

        Ok(form)
    }

    fn into_request(self) -> ApiResult<ClipRequest> {
        let video = self
            .video
            .ok_or_else(|| ApiError::bad_request("Missing field: video"))?;
        let start = parse_seconds("start_time", self.start_time)?;
        let end = parse_seconds("end_time", self.end_time)?;
        let shot_type = self
            .shot_type
            .ok_or_else(|| ApiError::bad_request("Missing field: shot_type"))?;

        Ok(ClipRequest {
            video,
            range: ClipRange::new(start, end)?,
            shot_type: ShotType::parse(&shot_type)?,
        })
    }
}

/// Body limit overruns surface as 413, any other multipart failure as 400.
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(format!("{}: {}", context, e.body_text()))
    } else {
        ApiError::bad_request(format!("{}: {}", context, e.body_text()))
    }
}

fn parse_seconds(field: &str, raw: Option<String>) -> ApiResult<f64> {
    let raw = raw.ok_or_else(|| ApiError::bad_request(format!("Missing field: {}", field)))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ApiError::bad_request(format!("{} must be a number of seconds", field)))
}

/// Extract a clip from an uploaded video.
///
/// Multipart fields: `video` (file), `start_time` and `end_time` (seconds),
/// `shot_type` (label). Responds with the encoded clip as an attachment.
pub async fn extract_clip(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let request = ClipForm::read(multipart).await?.into_request()?;

    let log = RequestLogger::new(&request_id, "extract_clip");
    let clip = state.extraction.extract_clip(request, &log).await?;

    let file = tokio::fs::File::open(&clip.path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to open clip: {}", e)))?;
    // Length of what is actually streamed, not the earlier inspection
    let content_length = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to stat clip: {}", e)))?
        .len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_LENGTH, content_length)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", clip.file_name),
        )
        .header("Cross-Origin-Resource-Policy", "cross-origin")
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}
