//! API integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tempfile::TempDir;
use tower::ServiceExt;

use shotclip_api::{create_router, ApiConfig, AppState};
use shotclip_media::{MediaResult, TranscodeJob, TranscodeOutput, Transcoder};
use shotclip_storage::{ClipArchive, ObjectStore, StorageError, StorageResult};

const BOUNDARY: &str = "shotclip-test-boundary";

/// Transcoder double: writes `output` to the job's output path (when set)
/// and exits with `exit_code`.
struct ScriptedTranscoder {
    output: Option<Vec<u8>>,
    exit_code: i32,
    stderr: String,
}

#[async_trait]
impl Transcoder for ScriptedTranscoder {
    async fn transcode(&self, job: &TranscodeJob) -> MediaResult<TranscodeOutput> {
        if let Some(bytes) = &self.output {
            tokio::fs::write(&job.output, bytes).await?;
        }
        Ok(TranscodeOutput {
            exit_code: Some(self.exit_code),
            stdout: String::new(),
            stderr: self.stderr.clone(),
            elapsed: std::time::Duration::from_millis(1),
        })
    }
}

/// Object store double: records writes, or fails every write when `fail` is set.
#[derive(Default)]
struct MemoryStore {
    objects: Mutex<Vec<(String, Vec<u8>, String)>>,
    fail: bool,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        if self.fail {
            return Err(StorageError::upload_failed("connection reset by peer"));
        }
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), data, content_type.to_string()));
        Ok(())
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        Ok(())
    }
}

struct TestApp {
    router: Router,
    clips: TempDir,
    staging: TempDir,
}

fn test_app(transcoder: ScriptedTranscoder) -> TestApp {
    let clips = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let config = ApiConfig {
        clips_dir: clips.path().to_path_buf(),
        staging_dir: Some(staging.path().to_path_buf()),
        metrics_enabled: false,
        ..ApiConfig::default()
    };

    let state = AppState::with_transcoder(config, Arc::new(transcoder));
    TestApp {
        router: create_router(state, None),
        clips,
        staging,
    }
}

fn test_config(clips: &TempDir, staging: &TempDir) -> ApiConfig {
    ApiConfig {
        clips_dir: clips.path().to_path_buf(),
        staging_dir: Some(staging.path().to_path_buf()),
        metrics_enabled: false,
        ..ApiConfig::default()
    }
}

fn archive_app(store: Arc<MemoryStore>) -> TestApp {
    let clips = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let config = test_config(&clips, &staging);
    let state = AppState::with_transcoder(config, Arc::new(succeeding(b"clip")))
        .with_archive(ClipArchive::new(store));
    TestApp {
        router: create_router(state, None),
        clips,
        staging,
    }
}

fn upload_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn succeeding(bytes: &[u8]) -> ScriptedTranscoder {
    ScriptedTranscoder {
        output: Some(bytes.to_vec()),
        exit_code: 0,
        stderr: String::new(),
    }
}

fn multipart_body(fields: &[(&str, &str)], video: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(video) = video {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"in.mp4\"\r\nContent-Type: video/mp4\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(video);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn extract_request(fields: &[(&str, &str)], video: Option<&[u8]>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/extract-clip")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, video)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn staging_is_empty(app: &TestApp) -> bool {
    std::fs::read_dir(app.staging.path()).unwrap().next().is_none()
}

#[tokio::test]
async fn test_extract_clip_returns_attachment() {
    let app = test_app(succeeding(b"encoded clip"));

    let response = app
        .router
        .clone()
        .oneshot(extract_request(
            &[("start_time", "2"), ("end_time", "5"), ("shot_type", "wide")],
            Some(b"source video bytes"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers[header::CONTENT_LENGTH], "12");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"wide_2.000_5.000.mp4\""
    );
    assert_eq!(headers["cross-origin-resource-policy"], "cross-origin");
    assert!(headers.contains_key("x-request-id"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"encoded clip");

    let artifact = app.clips.path().join("wide").join("wide_2.000_5.000.mp4");
    assert_eq!(std::fs::read(artifact).unwrap(), b"encoded clip");
    assert!(staging_is_empty(&app));
}

#[tokio::test]
async fn test_transcode_failure_reports_stderr() {
    let app = test_app(ScriptedTranscoder {
        output: None,
        exit_code: 1,
        stderr: "Invalid data found when processing input".to_string(),
    });

    let response = app
        .router
        .clone()
        .oneshot(extract_request(
            &[("start_time", "0"), ("end_time", "1"), ("shot_type", "close")],
            Some(b"not a video"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Invalid data found when processing input");
    assert!(staging_is_empty(&app));
}

#[tokio::test]
async fn test_missing_output_is_internal_error() {
    let app = test_app(ScriptedTranscoder {
        output: None,
        exit_code: 0,
        stderr: String::new(),
    });

    let response = app
        .router
        .clone()
        .oneshot(extract_request(
            &[("start_time", "0"), ("end_time", "1"), ("shot_type", "close")],
            Some(b"video"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "Output file was not created");
}

#[tokio::test]
async fn test_rejects_unsafe_shot_type() {
    let app = test_app(succeeding(b"clip"));

    let response = app
        .router
        .clone()
        .oneshot(extract_request(
            &[("start_time", "0"), ("end_time", "1"), ("shot_type", "../../etc")],
            Some(b"video"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["detail"].is_string());
    // Nothing escaped into or around the clip store
    assert!(std::fs::read_dir(app.clips.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_rejects_inverted_range() {
    let app = test_app(succeeding(b"clip"));

    let response = app
        .router
        .clone()
        .oneshot(extract_request(
            &[("start_time", "5"), ("end_time", "2"), ("shot_type", "wide")],
            Some(b"video"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejects_missing_video() {
    let app = test_app(succeeding(b"clip"));

    let response = app
        .router
        .clone()
        .oneshot(extract_request(
            &[("start_time", "0"), ("end_time", "1"), ("shot_type", "wide")],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("video"));
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend_origin() {
    let app = test_app(succeeding(b"clip"));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/extract-clip")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let app = test_app(succeeding(b"clip"));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/extract-clip")
                .header(header::ORIGIN, "http://evil.test")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(succeeding(b"clip"));

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app(succeeding(b"clip"));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("X-Request-ID", "trace-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-abc-123");
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let app = {
        let clips = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        let config = ApiConfig {
            clips_dir: clips.path().to_path_buf(),
            staging_dir: Some(staging.path().to_path_buf()),
            rate_limit_rps: 1,
            metrics_enabled: false,
            ..ApiConfig::default()
        };
        let state = AppState::with_transcoder(config, Arc::new(succeeding(b"clip")));
        TestApp {
            router: create_router(state, None),
            clips,
            staging,
        }
    };

    let mut statuses = Vec::new();
    for _ in 0..2 {
        let mut request = extract_request(
            &[("start_time", "0"), ("end_time", "1"), ("shot_type", "wide")],
            Some(b"video"),
        );
        request
            .headers_mut()
            .insert("X-Forwarded-For", "192.0.2.50".parse().unwrap());
        let response = app.router.clone().oneshot(request).await.unwrap();
        statuses.push(response.status());
    }

    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]);
}

#[tokio::test]
async fn test_oversized_chunked_upload_returns_413() {
    let clips = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let config = ApiConfig {
        max_body_size: 64,
        ..test_config(&clips, &staging)
    };
    let state = AppState::with_transcoder(config, Arc::new(succeeding(b"clip")));
    let router = create_router(state, None);

    // No Content-Length header, so the limit trips while the body is read
    let request = extract_request(
        &[("start_time", "0"), ("end_time", "1"), ("shot_type", "wide")],
        Some(&[0u8; 4096]),
    );
    assert!(!request.headers().contains_key(header::CONTENT_LENGTH));

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json_body(response).await["detail"].is_string());
    assert!(std::fs::read_dir(staging.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_upload_archives_clip_under_clips_prefix() {
    let store = Arc::new(MemoryStore::default());
    let app = archive_app(store.clone());

    let response = app
        .router
        .clone()
        .oneshot(upload_request(serde_json::json!({
            "fileName": "wide/interview_2-5.mp4",
            "fileContent": STANDARD.encode(b"encoded clip"),
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Upload successful");
    assert_eq!(body["key"], "clips/wide/interview_2-5.mp4");
    assert_eq!(body["size"], 12);

    let objects = store.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].0, "clips/wide/interview_2-5.mp4");
    assert_eq!(objects[0].1, b"encoded clip");
    assert_eq!(objects[0].2, "video/mp4");
}

#[tokio::test]
async fn test_upload_requires_both_fields() {
    let store = Arc::new(MemoryStore::default());
    let app = archive_app(store.clone());

    for body in [
        serde_json::json!({ "fileName": "wide/x.mp4" }),
        serde_json::json!({ "fileContent": STANDARD.encode(b"clip") }),
        serde_json::json!({ "fileName": "", "fileContent": STANDARD.encode(b"clip") }),
    ] {
        let response = app.router.clone().oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .contains("Missing required fields"));
    }
    assert!(store.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_bad_content_and_names() {
    let store = Arc::new(MemoryStore::default());
    let app = archive_app(store.clone());

    for body in [
        serde_json::json!({ "fileName": "wide/x.mp4", "fileContent": "not base64!" }),
        serde_json::json!({ "fileName": "../x.mp4", "fileContent": STANDARD.encode(b"clip") }),
    ] {
        let response = app.router.clone().oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert!(store.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_store_failure_hides_cause() {
    let app = archive_app(Arc::new(MemoryStore {
        fail: true,
        ..Default::default()
    }));

    let response = app
        .router
        .clone()
        .oneshot(upload_request(serde_json::json!({
            "fileName": "wide/x.mp4",
            "fileContent": STANDARD.encode(b"clip"),
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["detail"], "Failed to upload to S3");
}

#[tokio::test]
async fn test_upload_without_archive_is_unavailable() {
    let app = test_app(succeeding(b"clip"));

    let response = app
        .router
        .clone()
        .oneshot(upload_request(serde_json::json!({
            "fileName": "wide/x.mp4",
            "fileContent": STANDARD.encode(b"clip"),
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        json_body(response).await["detail"],
        "Service unavailable: Clip archive is not configured"
    );
}
