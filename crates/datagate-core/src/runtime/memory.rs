// crates/datagate-core/src/runtime/memory.rs
// ============================================================================
// Module: Datagate In-Memory Object Store
// Description: Map-backed object store for tests and local development.
// Purpose: Provide the second interchangeable store behind the capability trait.
// Dependencies: async-trait, bytes, tokio, tokio-stream
// ============================================================================

//! ## Overview
//! The memory store keeps objects in a map and mirrors the production
//! store's key validation and size limits so request paths behave
//! identically under test. Signed URLs are deterministic `memory:///` URIs;
//! like the production signer, issuance does not verify the key exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_stream::wrappers::ReceiverStream;

use crate::interfaces::ObjectBody;
use crate::interfaces::ObjectStore;
use crate::interfaces::ObjectStoreError;
use crate::interfaces::validate_object_key;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Chunk size used when streaming stored objects.
const STREAM_CHUNK_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Map-backed object store.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    /// Stored objects keyed by object key.
    objects: Mutex<BTreeMap<String, Bytes>>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object under a key.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the key is invalid or the store
    /// lock is poisoned.
    pub fn put(&self, key: &str, bytes: impl Into<Bytes>) -> Result<(), ObjectStoreError> {
        validate_object_key(key)?;
        self.objects
            .lock()
            .map_err(|_| ObjectStoreError::Io("object store lock poisoned".to_string()))?
            .insert(key.to_string(), bytes.into());
        Ok(())
    }

    /// Removes an object, ignoring absent keys.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Io`] when the store lock is poisoned.
    pub fn remove(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.objects
            .lock()
            .map_err(|_| ObjectStoreError::Io("object store lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }

    /// Returns a stored object by key.
    fn lookup(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        self.objects
            .lock()
            .map_err(|_| ObjectStoreError::Io("object store lock poisoned".to_string()))?
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str, max_bytes: usize) -> Result<Bytes, ObjectStoreError> {
        validate_object_key(key)?;
        let bytes = self.lookup(key)?;
        if bytes.len() > max_bytes {
            return Err(ObjectStoreError::TooLarge {
                key: key.to_string(),
                max_bytes,
                actual_bytes: bytes.len(),
            });
        }
        Ok(bytes)
    }

    async fn get_stream(&self, key: &str) -> Result<ObjectBody, ObjectStoreError> {
        validate_object_key(key)?;
        let bytes = self.lookup(key)?;
        let content_length = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tokio::spawn(async move {
            let mut offset = 0;
            while offset < bytes.len() {
                let end = usize::min(offset + STREAM_CHUNK_BYTES, bytes.len());
                if tx.send(Ok(bytes.slice(offset .. end))).await.is_err() {
                    return;
                }
                offset = end;
            }
        });
        Ok(ObjectBody {
            content_length: Some(content_length),
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
        let mut url = format!("memory:///{key}?expires_in={}", ttl.as_secs());
        if let Some(filename) = suggested_filename {
            url.push_str("&filename=");
            url.push_str(filename);
        }
        Ok(url)
    }
}
