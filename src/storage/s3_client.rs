//! S3-compatible storage client
//!
//! Read-only access to the bucket holding downloadable documents and
//! article images.

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use chrono::DateTime;

use crate::config::StorageConfig;
use crate::error::{AppError, Result, StorageError};

use super::types::ObjectMetadata;

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from configuration
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "evcharge-content",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO and other S3-compatible services
            .build();

        let client = Client::from_conf(s3_config);

        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Ok(Self { client, bucket })
    }

    /// Get object metadata (HEAD request)
    pub async fn head_object(&self, key: &str) -> Result<ObjectMetadata> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    return AppError::Storage(StorageError::ObjectNotFound(key.to_string()));
                }
                let status = e.raw_response().map(|r| r.status().as_u16());
                map_sdk_error(key, "head object", status, e)
            })?;

        Ok(ObjectMetadata {
            key: key.to_string(),
            size: response.content_length().unwrap_or(0),
            last_modified: response
                .last_modified()
                .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
            content_type: response.content_type().map(|s| s.to_string()),
            etag: response.e_tag().map(|s| s.to_string()),
        })
    }

    /// Get object as a byte stream
    pub async fn get_object_stream(&self, key: &str) -> Result<ByteStream> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return AppError::Storage(StorageError::ObjectNotFound(key.to_string()));
                }
                let status = e.raw_response().map(|r| r.status().as_u16());
                map_sdk_error(key, "get object", status, e)
            })?;

        Ok(response.body)
    }
}

/// Classify errors the typed service error does not cover
fn map_sdk_error(
    key: &str,
    action: &str,
    status: Option<u16>,
    e: impl std::fmt::Display,
) -> AppError {
    let message = e.to_string();
    match status {
        Some(404) => AppError::Storage(StorageError::ObjectNotFound(key.to_string())),
        Some(403) => AppError::Storage(StorageError::AccessDenied(key.to_string())),
        _ if message.contains("NoSuchKey") => {
            AppError::Storage(StorageError::ObjectNotFound(key.to_string()))
        }
        _ if message.contains("AccessDenied") => {
            AppError::Storage(StorageError::AccessDenied(key.to_string()))
        }
        _ => AppError::Storage(StorageError::SdkError(format!(
            "Failed to {} {}: {}",
            action, key, message
        ))),
    }
}
