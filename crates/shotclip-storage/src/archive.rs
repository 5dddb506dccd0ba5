//! Clip archive: copies of extracted clips kept in an S3-compatible bucket.
//!
//! Objects are written under `clips/<file name>`, where the caller-chosen file
//! name usually carries its own shot type folder (`wide/interview_2-5.mp4`).

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Key prefix for every archived clip.
pub const ARCHIVE_PREFIX: &str = "clips";

/// Content type stored with every archived clip.
pub const CLIP_CONTENT_TYPE: &str = "video/mp4";

/// Longest accepted archive file name, in bytes.
pub const MAX_ARCHIVE_NAME_LEN: usize = 512;

/// Minimal object store surface the archive needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` at `key`, replacing any existing object.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Verify the bucket is reachable with the configured credentials.
    async fn check_connectivity(&self) -> StorageResult<()>;
}

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Custom endpoint (R2, MinIO); `None` uses the AWS endpoint for the region
    pub endpoint_url: Option<String>,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region
    pub region: String,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok().filter(|s| !s.is_empty()),
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("AWS_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("AWS_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("AWS_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("AWS_BUCKET_NAME not set"))?,
            region: std::env::var("AWS_REGION")
                .map_err(|_| StorageError::config_error("AWS_REGION not set"))?,
        })
    }
}

/// S3-compatible object store client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new client from configuration.
    pub fn new(config: S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "shotclip",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials);

        if let Some(endpoint_url) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket_name,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(S3Config::from_env()?))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        Ok(())
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("connectivity check failed: {}", e)))?;
        Ok(())
    }
}

/// Object key for an archive file name.
///
/// The name may contain `/` separated folders but no empty, `.` or `..`
/// segments, no leading `/`, no backslashes and no control characters.
pub fn archive_key(file_name: &str) -> StorageResult<String> {
    if file_name.is_empty() {
        return Err(StorageError::invalid_key("file name must not be empty"));
    }

    if file_name.len() > MAX_ARCHIVE_NAME_LEN {
        return Err(StorageError::invalid_key(format!(
            "file name must be at most {} bytes",
            MAX_ARCHIVE_NAME_LEN
        )));
    }

    if file_name.contains('\\') || file_name.chars().any(char::is_control) {
        return Err(StorageError::invalid_key(
            "file name contains a backslash or control character",
        ));
    }

    if file_name
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::invalid_key(format!(
            "file name has an empty or relative path segment: {}",
            file_name
        )));
    }

    Ok(format!("{}/{}", ARCHIVE_PREFIX, file_name))
}

/// A clip written to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedClip {
    pub key: String,
    pub size: u64,
}

/// Uploads clips to the object store under the archive prefix.
#[derive(Clone)]
pub struct ClipArchive {
    store: Arc<dyn ObjectStore>,
}

impl ClipArchive {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Store `data` as `clips/<file_name>` with an MP4 content type.
    pub async fn upload(&self, file_name: &str, data: Vec<u8>) -> StorageResult<ArchivedClip> {
        let key = archive_key(file_name)?;
        let size = data.len() as u64;

        self.store.put_object(&key, data, CLIP_CONTENT_TYPE).await?;

        info!(key = %key, size_bytes = size, "Archived clip");
        Ok(ArchivedClip { key, size })
    }

    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.store.check_connectivity().await
    }
}
