// crates/datagate-api/src/lib.rs
// ============================================================================
// Module: Datagate API
// Description: HTTP surface for tier-gated dataset downloads.
// Purpose: Serve listing, signing, streaming proxy, and page routes.
// Dependencies: axum, tokio, serde, datagate-core, datagate-config
// ============================================================================

//! ## Overview
//! The API crate exposes the download service over HTTP: a JSON listing per
//! tier, a single-file signing route, an origin-concealing streaming proxy,
//! and a server-rendered download page. Every route validates the rotating
//! tier token before touching dataset keys, and every request emits one
//! audit event to the configured sink.
//!
//! Security posture: tokens travel in query parameters and request bodies
//! only; responses and audit events carry SHA-256 fingerprints, never token
//! material. Denied requests never reach the data path, so callers cannot
//! probe object existence without a valid token.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod error;
pub mod handlers;
pub mod links;
pub mod pages;
pub mod server;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::DownloadAuditEvent;
pub use audit::DownloadAuditEventParams;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use error::ApiError;
pub use error::ErrorBody;
pub use handlers::ListingResponse;
pub use handlers::SingleFileRequest;
pub use handlers::SingleFileResponse;
pub use links::SignedDownloadLink;
pub use server::ServerError;
pub use server::router;
pub use server::serve;
pub use state::AppState;
