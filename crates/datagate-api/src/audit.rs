// crates/datagate-api/src/audit.rs
// ============================================================================
// Module: Download Audit Logging
// Description: Structured audit events for download request handling.
// Purpose: Emit redacted audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every download request produces one audit event carrying the decision,
//! operation, tier, and a hashed token fingerprint. Raw tokens never appear
//! in audit output. Events are JSON lines so deployments can route them to
//! their preferred logging pipeline without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Event
// ============================================================================

/// Download audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Decision outcome.
    pub decision: &'static str,
    /// Request operation label.
    pub operation: &'static str,
    /// Tier the request targeted, when known.
    pub tier: Option<String>,
    /// Caller IP address, when available.
    pub peer_ip: Option<String>,
    /// Admitted token fingerprint (sha256).
    pub token_fingerprint: Option<String>,
    /// Secret slot the token matched.
    pub token_slot: Option<&'static str>,
    /// Object key involved, when the operation names one.
    pub object_key: Option<String>,
    /// HTTP status returned to the caller.
    pub status: u16,
    /// Normalized failure kind label (deny events).
    pub error_kind: Option<&'static str>,
    /// Failure detail for operators (deny events).
    pub reason: Option<String>,
}

/// Inputs required to construct a download audit event.
pub struct DownloadAuditEventParams {
    /// Decision outcome.
    pub decision: &'static str,
    /// Request operation label.
    pub operation: &'static str,
    /// Tier the request targeted, when known.
    pub tier: Option<String>,
    /// Caller IP address, when available.
    pub peer_ip: Option<String>,
    /// Admitted token fingerprint (sha256).
    pub token_fingerprint: Option<String>,
    /// Secret slot the token matched.
    pub token_slot: Option<&'static str>,
    /// Object key involved, when the operation names one.
    pub object_key: Option<String>,
    /// HTTP status returned to the caller.
    pub status: u16,
    /// Normalized failure kind label (deny events).
    pub error_kind: Option<&'static str>,
    /// Failure detail for operators (deny events).
    pub reason: Option<String>,
}

impl DownloadAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: DownloadAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "download_request",
            timestamp_ms,
            decision: params.decision,
            operation: params.operation,
            tier: params.tier,
            peer_ip: params.peer_ip,
            token_fingerprint: params.token_fingerprint,
            token_slot: params.token_slot,
            object_key: params.object_key,
            status: params.status,
            error_kind: params.error_kind,
            reason: params.reason,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for download request events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &DownloadAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &DownloadAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &DownloadAuditEvent) {}
}
