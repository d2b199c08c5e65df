// crates/datagate-core/src/runtime/index_reader.rs
// ============================================================================
// Module: Datagate Index Reader
// Description: Per-tier download index loading.
// Purpose: Read and parse the published index document for a tier.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The index reader fetches `{prefix}{tier}.json` from the object store on
//! every call. The documents are small and issuance is infrequent, so there
//! is no cache here; bounded staleness belongs to the token state only.
//! A missing or unparseable index is one condition: unavailable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::DownloadIndex;
use crate::core::TierId;
use crate::interfaces::ObjectStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted size of a download index document.
pub const MAX_INDEX_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Download index read failures.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Index document missing, unreadable, or unparseable.
    #[error("download index unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Loader for per-tier download index documents.
pub struct DownloadIndexReader {
    /// Backing object store.
    store: Arc<dyn ObjectStore>,
    /// Key prefix the tier name and `.json` suffix are appended to.
    index_key_prefix: String,
}

impl DownloadIndexReader {
    /// Creates a reader over the given store.
    pub fn new(store: Arc<dyn ObjectStore>, index_key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            index_key_prefix: index_key_prefix.into(),
        }
    }

    /// Returns the object key of a tier's index document.
    #[must_use]
    pub fn index_key(&self, tier: TierId) -> String {
        format!("{}{}.json", self.index_key_prefix, tier.as_str())
    }

    /// Loads and parses the index document for a tier.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Unavailable`] when the document is missing,
    /// oversized, unreadable, or unparseable.
    pub async fn load(&self, tier: TierId) -> Result<DownloadIndex, IndexError> {
        let key = self.index_key(tier);
        let bytes = self
            .store
            .get(&key, MAX_INDEX_BYTES)
            .await
            .map_err(|err| IndexError::Unavailable(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| IndexError::Unavailable(err.to_string()))
    }
}
