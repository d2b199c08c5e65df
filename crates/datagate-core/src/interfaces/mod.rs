// crates/datagate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Datagate Interfaces
// Description: Backend-agnostic object-store capability interface.
// Purpose: Define the storage contract used by the Datagate runtime.
// Dependencies: async-trait, bytes, thiserror, tokio-stream
// ============================================================================

//! ## Overview
//! The object store is the only external system Datagate talks to. The
//! [`ObjectStore`] trait covers bounded reads, streaming reads, and signed
//! GET URL issuance. Implementations are selected once at process start;
//! business logic never branches on the backend. All keys are validated at
//! this boundary before any backend call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio_stream::wrappers::ReceiverStream;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a single key segment.
const MAX_KEY_SEGMENT_LENGTH: usize = 255;
/// Maximum total key length, matching the S3 key limit.
const MAX_KEY_LENGTH: usize = 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Object-store errors for dataset storage.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// Invalid key or request input.
    #[error("object store invalid: {0}")]
    Invalid(String),
    /// Backend I/O failure.
    #[error("object store io error: {0}")]
    Io(String),
    /// Backend returned an error.
    #[error("object store backend error: {0}")]
    Backend(String),
    /// Requested object key does not exist.
    #[error("object not found: {0}")]
    NotFound(String),
    /// Object exceeds size limits.
    #[error("object too large: {key} ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Object key.
        key: String,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual size in bytes.
        actual_bytes: usize,
    },
    /// Credentials or signing configuration are broken.
    #[error("object store configuration error: {0}")]
    Configuration(String),
}

// ============================================================================
// SECTION: Streaming Body
// ============================================================================

/// Streaming object payload returned by [`ObjectStore::get_stream`].
#[derive(Debug)]
pub struct ObjectBody {
    /// Total payload length in bytes when the backend reports one.
    pub content_length: Option<u64>,
    /// Ordered chunk stream yielding the object payload.
    pub chunks: ReceiverStream<Result<Bytes, ObjectStoreError>>,
}

// ============================================================================
// SECTION: Object Store Capability
// ============================================================================

/// Read and sign capability over dataset object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads a whole object with a size limit.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the key is invalid, the object is
    /// missing or oversized, or the backend fails.
    async fn get(&self, key: &str, max_bytes: usize) -> Result<Bytes, ObjectStoreError>;

    /// Opens an object as an ordered chunk stream.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the key is invalid, the object is
    /// missing, or the backend fails. Errors after the first chunk surface
    /// through the stream itself.
    async fn get_stream(&self, key: &str) -> Result<ObjectBody, ObjectStoreError>;

    /// Issues a GET-only signed URL scoped to exactly one key.
    ///
    /// When `suggested_filename` is set, the URL instructs the client to save
    /// the payload under that name. Issuance does not verify the key exists.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Configuration`] when credentials or the
    /// signer are unusable, and other variants for invalid inputs.
    async fn sign_get(
        &self,
        key: &str,
        ttl: Duration,
        suggested_filename: Option<&str>,
    ) -> Result<String, ObjectStoreError>;
}

// ============================================================================
// SECTION: Key Validation
// ============================================================================

/// Validates an object key before any backend use.
///
/// Keys are relative, slash-separated, free of traversal segments, and
/// bounded in length. Backslashes are rejected outright.
///
/// # Errors
///
/// Returns [`ObjectStoreError::Invalid`] describing the first violation.
pub fn validate_object_key(key: &str) -> Result<(), ObjectStoreError> {
    if key.is_empty() {
        return Err(ObjectStoreError::Invalid("key must be set".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(ObjectStoreError::Invalid("key exceeds length limit".to_string()));
    }
    if key.contains('\\') {
        return Err(ObjectStoreError::Invalid("key must not contain backslashes".to_string()));
    }
    if key.starts_with('/') {
        return Err(ObjectStoreError::Invalid("key must be relative".to_string()));
    }
    for segment in key.split('/') {
        validate_segment(segment)?;
    }
    Ok(())
}

/// Validates a single key segment.
fn validate_segment(value: &str) -> Result<(), ObjectStoreError> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(ObjectStoreError::Invalid("key segment is invalid".to_string()));
    }
    if value.len() > MAX_KEY_SEGMENT_LENGTH {
        return Err(ObjectStoreError::Invalid("key segment exceeds length limit".to_string()));
    }
    Ok(())
}
