// crates/datagate-store-s3/src/store.rs
// ============================================================================
// Module: S3 Store Backend
// Description: S3 client construction, bounded reads, streams, and signing.
// Purpose: Serve dataset bytes and presigned GET URLs from object storage.
// Dependencies: datagate-core, datagate-config, aws-sdk-s3, tokio
// ============================================================================

//! ## Overview
//! [`S3ObjectStore`] builds one SDK client at process start from ambient
//! credentials plus the endpoint, region, and timeouts in
//! [`ObjectStoreConfig`]. Reads enforce caller-supplied size limits both
//! from the advertised content length and while draining the body, so a
//! lying backend cannot exhaust memory. Presigned GET URLs carry the SigV4
//! query signature and, when requested, a response content disposition that
//! names the saved file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use bytes::Bytes;
use datagate_config::ObjectStoreConfig;
use datagate_config::ObjectStoreProvider;
use datagate_core::MemoryObjectStore;
use datagate_core::ObjectBody;
use datagate_core::ObjectStore;
use datagate_core::ObjectStoreError;
use datagate_core::validate_object_key;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Depth of the chunk channel used for streamed reads.
const STREAM_CHANNEL_DEPTH: usize = 8;

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Builds the configured object store backend.
///
/// The provider is fixed at process start; request paths never branch on
/// the backend again.
///
/// # Errors
///
/// Returns [`ObjectStoreError`] when configuration is invalid or client
/// construction fails.
pub async fn build_object_store(
    config: &ObjectStoreConfig,
) -> Result<Arc<dyn ObjectStore>, ObjectStoreError> {
    config.validate().map_err(|err| ObjectStoreError::Configuration(err.to_string()))?;
    match config.provider {
        ObjectStoreProvider::S3 => Ok(Arc::new(S3ObjectStore::new(config).await?)),
        ObjectStoreProvider::Memory => Ok(Arc::new(MemoryObjectStore::new())),
    }
}

// ============================================================================
// SECTION: S3 Store
// ============================================================================

/// S3-compatible object store backend.
pub struct S3ObjectStore {
    /// Underlying S3 client.
    client: Client,
    /// Bucket name all keys resolve against.
    bucket: String,
}

impl S3ObjectStore {
    /// Builds a new S3-backed object store.
    ///
    /// Credentials resolve through the ambient provider chain (environment,
    /// profile, or instance metadata). R2 is reached by setting the account
    /// endpoint and region `auto`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Configuration`] when configuration is
    /// invalid.
    pub async fn new(config: &ObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        config.validate().map_err(|err| ObjectStoreError::Configuration(err.to_string()))?;
        let timeouts = TimeoutConfig::builder()
            .connect_timeout(config.connect_timeout())
            .operation_timeout(config.operation_timeout())
            .build();
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(timeouts);
        if let Some(region) = config.region.clone() {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint) = config.endpoint.clone() {
            loader = loader.endpoint_url(endpoint);
        }
        let shared_config = loader.load().await;
        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if config.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        Ok(Self {
            client: Client::from_conf(s3_builder.build()),
            bucket: config.bucket.clone(),
        })
    }
}

/// Maps a GetObject failure into an object-store error.
fn map_get_error<R>(key: &str, err: SdkError<GetObjectError, R>) -> ObjectStoreError {
    match err {
        SdkError::ServiceError(context) => {
            let service_err = context.err();
            if service_err.is_no_such_key() {
                ObjectStoreError::NotFound(key.to_string())
            } else {
                ObjectStoreError::Backend(format!("get {key}: {service_err}"))
            }
        }
        other => ObjectStoreError::Backend(format!("get {key}: {other}")),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str, max_bytes: usize) -> Result<Bytes, ObjectStoreError> {
        validate_object_key(key)?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| map_get_error(key, err))?;
        if let Some(length) = output.content_length() {
            let actual_bytes = usize::try_from(length).unwrap_or(usize::MAX);
            if actual_bytes > max_bytes {
                return Err(ObjectStoreError::TooLarge {
                    key: key.to_string(),
                    max_bytes,
                    actual_bytes,
                });
            }
        }
        let mut body = output.body;
        let mut buffer = Vec::new();
        let mut total_bytes = 0usize;
        while let Some(chunk) =
            body.try_next().await.map_err(|err| ObjectStoreError::Io(err.to_string()))?
        {
            total_bytes = total_bytes
                .checked_add(chunk.len())
                .ok_or_else(|| ObjectStoreError::Io("object size overflow".to_string()))?;
            if total_bytes > max_bytes {
                return Err(ObjectStoreError::TooLarge {
                    key: key.to_string(),
                    max_bytes,
                    actual_bytes: total_bytes,
                });
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(buffer))
    }

    async fn get_stream(&self, key: &str) -> Result<ObjectBody, ObjectStoreError> {
        validate_object_key(key)?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| map_get_error(key, err))?;
        let content_length =
            output.content_length().and_then(|length| u64::try_from(length).ok());
        let mut body = output.body;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_DEPTH);
        tokio::spawn(async move {
            loop {
                match body.try_next().await {
                    Ok(Some(chunk)) => {
                        if tx.send(Ok(chunk)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => return,
                    Err(err) => {
                        let _ = tx.send(Err(ObjectStoreError::Io(err.to_string()))).await;
                        return;
                    }
                }
            }
        });
        Ok(ObjectBody {
            content_length,
            chunks: ReceiverStream::new(rx),
        })
    }

    async fn sign_get(
        &self,
        key: &str,
        ttl: Duration,
        suggested_filename: Option<&str>,
    ) -> Result<String, ObjectStoreError> {
        validate_object_key(key)?;
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|err| ObjectStoreError::Configuration(err.to_string()))?;
        let mut request = self.client.get_object().bucket(&self.bucket).key(key);
        if let Some(filename) = suggested_filename {
            request = request
                .response_content_disposition(format!("attachment; filename=\"{filename}\""));
        }
        let presigned =
            request.presigned(presigning).await.map_err(|err| map_get_error(key, err))?;
        Ok(presigned.uri().to_string())
    }
}
