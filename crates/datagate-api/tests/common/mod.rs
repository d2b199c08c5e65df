// crates/datagate-api/tests/common/mod.rs
// ============================================================================
// Module: API Test Helpers
// Description: Shared fixtures for download route tests.
// Purpose: Seed memory-backed state with tokens, indexes, and objects.
// Dependencies: datagate-api, datagate-config, datagate-core, serde_json
// ============================================================================

//! Shared helpers for the download route tests.

#![allow(dead_code, reason = "Each test binary uses a subset of the helpers.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only fixtures may panic on setup failure."
)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use datagate_api::AppState;
use datagate_api::AuditSink;
use datagate_api::DownloadAuditEvent;
use datagate_config::DatagateConfig;
use datagate_config::DownloadsConfig;
use datagate_config::ObjectStoreConfig;
use datagate_config::ServerConfig;
use datagate_config::TokensConfig;
use datagate_core::MemoryObjectStore;
use datagate_core::ObjectStore;
use datagate_core::SystemClock;
use serde_json::json;

/// Admitted current token for tier1.
pub const TIER1_TOKEN: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopq";

/// Admitted current token for tier2.
pub const TIER2_TOKEN: &str = "0123456789012345678901234567890123456789012";

/// Announced successor token for tier2; the overlap window is active.
pub const TIER2_NEXT_TOKEN: &str = "zyxwvutsrqponmlkjihgfedcbaZYXWVUTSRQPONMLKJ";

/// Well-formed token admitted for no tier.
pub const UNKNOWN_TOKEN: &str = "qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq";

/// Object key of the seeded tier1 daily dataset.
pub const TIER1_DAILY_KEY: &str = "tier1/daily/2026-01-27/data.parquet";

/// Object key of the seeded tier1 daily manifest.
pub const TIER1_MANIFEST_KEY: &str = "tier1/daily/2026-01-27/manifest.json";

/// Payload stored under the tier1 daily key.
pub const TIER1_DAILY_PAYLOAD: &[u8] = b"tier1 daily parquet bytes";

/// Audit sink that retains events for assertions.
pub struct RecordingAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<DownloadAuditEvent>>,
}

impl RecordingAuditSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<DownloadAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &DownloadAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Memory-backed service fixture.
pub struct Harness {
    /// Shared handler state.
    pub state: Arc<AppState>,
    /// Backing memory store, for direct seeding.
    pub store: Arc<MemoryObjectStore>,
    /// Recording audit sink.
    pub audit: Arc<RecordingAuditSink>,
}

/// Builds the default service configuration for route tests.
pub fn test_config() -> DatagateConfig {
    DatagateConfig {
        server: ServerConfig::default(),
        object_store: ObjectStoreConfig::default(),
        tokens: TokensConfig::default(),
        downloads: DownloadsConfig::default(),
    }
}

/// Builds a harness with seeded tokens, indexes, and one stored object.
pub fn harness() -> Harness {
    let harness = empty_harness();
    seed_token_state(&harness.store);
    seed_tier1_index(&harness.store);
    harness
        .store
        .put(TIER1_DAILY_KEY, TIER1_DAILY_PAYLOAD)
        .unwrap();
    harness
}

/// Builds a harness over an empty store and default configuration.
pub fn empty_harness() -> Harness {
    harness_with(test_config())
}

/// Builds a harness over an empty store and an explicit configuration.
pub fn harness_with(config: DatagateConfig) -> Harness {
    let store = Arc::new(MemoryObjectStore::new());
    let audit = Arc::new(RecordingAuditSink::new());
    let state = Arc::new(AppState::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Arc::new(SystemClock),
        Arc::clone(&audit) as Arc<dyn AuditSink>,
        &config,
    ));
    Harness {
        state,
        store,
        audit,
    }
}

/// Builds a harness with overridden download issuance settings.
pub fn harness_with_downloads(downloads: DownloadsConfig) -> Harness {
    let config = DatagateConfig {
        downloads,
        ..test_config()
    };
    let harness = harness_with(config);
    seed_token_state(&harness.store);
    seed_tier1_index(&harness.store);
    harness
        .store
        .put(TIER1_DAILY_KEY, TIER1_DAILY_PAYLOAD)
        .unwrap();
    harness
}

/// Seeds the rotating token state document.
pub fn seed_token_state(store: &MemoryObjectStore) {
    let document = json!({
        "version": 3,
        "last_updated": "2026-01-26T09:00:00Z",
        "rotation_schedule": {
            "announce_day": "Friday",
            "overlap_day": "Saturday",
            "promote_day": "Monday",
            "timezone": "America/New_York"
        },
        "tiers": {
            "tier1": {
                "current_token": TIER1_TOKEN,
                "next_token": null,
                "overlap_active": false,
                "current_generated_at": "2026-01-26T00:00:00Z"
            },
            "tier2": {
                "current_token": TIER2_TOKEN,
                "next_token": TIER2_NEXT_TOKEN,
                "overlap_active": true,
                "current_generated_at": "2026-01-19T00:00:00Z",
                "next_generated_at": "2026-01-24T00:00:00Z"
            },
            "tier3": {
                "current_token": null,
                "overlap_active": false
            }
        }
    });
    store
        .put("config/tier_tokens.json", document.to_string())
        .unwrap();
}

/// Seeds a tier1 index with one daily entry and no aggregate.
pub fn seed_tier1_index(store: &MemoryObjectStore) {
    let document = json!({
        "daily": [
            {
                "date": "2026-01-27",
                "r2_key": TIER1_DAILY_KEY,
                "manifest_key": TIER1_MANIFEST_KEY,
                "size_bytes": 194_596
            }
        ],
        "mtd": null
    });
    store
        .put("config/download_index_tier1.json", document.to_string())
        .unwrap();
}

/// Seeds a tier2 index carrying a month-to-date aggregate.
pub fn seed_tier2_index(store: &MemoryObjectStore) {
    let document = json!({
        "daily": [
            {
                "date": "2026-01-26",
                "r2_key": "tier2/daily/2026-01-26/data.parquet",
                "size_bytes": 512
            }
        ],
        "mtd": {
            "month": "2026-01",
            "r2_key": "tier2/mtd/2026-01/data.parquet",
            "manifest_key": "tier2/mtd/2026-01/manifest.json",
            "size_bytes": 13_312,
            "days_included": 26
        }
    });
    store
        .put("config/download_index_tier2.json", document.to_string())
        .unwrap();
}

/// Returns the caller address attached to handler invocations.
pub fn peer() -> SocketAddr {
    SocketAddr::from(([192, 0, 2, 10], 40_000))
}

/// Reads a JSON response body into a value.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Reads a raw response body.
pub async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
}

/// Reads a response body as UTF-8 text.
pub async fn body_text(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}
