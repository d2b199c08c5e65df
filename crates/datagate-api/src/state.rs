// crates/datagate-api/src/state.rs
// ============================================================================
// Module: API Shared State
// Description: Per-process state shared across request handlers.
// Purpose: Wire the store, validator, index reader, clock, and audit sink.
// Dependencies: datagate-core, datagate-config
// ============================================================================

//! ## Overview
//! One [`AppState`] is built at startup and shared across handlers. All
//! request state beyond it is per-request; the only cross-request mutability
//! is the validator's bounded-staleness token state cache.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use datagate_config::DatagateConfig;
use datagate_config::DownloadsConfig;
use datagate_core::Clock;
use datagate_core::DownloadIndexReader;
use datagate_core::ObjectStore;
use datagate_core::TokenValidator;
use datagate_core::TokenValidatorConfig;

use crate::audit::AuditSink;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared state for download request handlers.
pub struct AppState {
    /// Backing object store.
    pub(crate) store: Arc<dyn ObjectStore>,
    /// Tier token validator with its state cache.
    pub(crate) validator: TokenValidator,
    /// Per-tier download index reader.
    pub(crate) index_reader: DownloadIndexReader,
    /// Injected clock for response timestamps.
    pub(crate) clock: Arc<dyn Clock>,
    /// Audit sink for request events.
    pub(crate) audit: Arc<dyn AuditSink>,
    /// Download issuance configuration.
    pub(crate) downloads: DownloadsConfig,
    /// Maximum accepted request body size.
    pub(crate) max_body_bytes: usize,
}

impl AppState {
    /// Builds shared state from configuration and injected backends.
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        audit: Arc<dyn AuditSink>,
        config: &DatagateConfig,
    ) -> Self {
        let validator = TokenValidator::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            TokenValidatorConfig {
                state_key: config.tokens.state_key.clone(),
                cache_ttl_seconds: config.tokens.cache_ttl_seconds,
            },
        );
        let index_reader =
            DownloadIndexReader::new(Arc::clone(&store), config.downloads.index_key_prefix.clone());
        Self {
            store,
            validator,
            index_reader,
            clock,
            audit,
            downloads: config.downloads.clone(),
            max_body_bytes: config.server.max_body_bytes,
        }
    }
}

// ============================================================================
// SECTION: Test Support
// ============================================================================
