// crates/datagate-api/src/handlers.rs
// ============================================================================
// Module: HTTP Request Handlers
// Description: Tier listing, single-file signing, streaming proxy, liveness.
// Purpose: Admit tokens, issue download links, and stream object payloads.
// Dependencies: axum, bytes, serde, datagate-core, datagate-config
// ============================================================================

//! ## Overview
//! Each route handler parses its inputs, validates the presented token
//! against the requested tier, and either issues download links or streams
//! the object payload. Every request emits exactly one audit event carrying
//! the decision, the token fingerprint when admitted, and the failure kind
//! when denied. Token validation always happens before any data-path store
//! access so denied callers learn nothing about object existence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use bytes::Bytes;
use datagate_core::AdmittedToken;
use datagate_core::TierId;
use datagate_core::TokenDecision;
use datagate_core::rfc3339;
use datagate_core::validate_object_key;
use serde::Deserialize;
use serde::Serialize;

use crate::audit::DownloadAuditEvent;
use crate::audit::DownloadAuditEventParams;
use crate::error::ApiError;
use crate::links::LinkIssuer;
use crate::links::content_type_for_key;
use crate::links::filename_segment;
use crate::links::header_safe;
use crate::state::AppState;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Query parameters accepted by token-gated GET routes.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    /// Presented tier token.
    #[serde(default)]
    pub token: Option<String>,
}

/// Request body for the single-file signing route.
#[derive(Debug, Deserialize)]
pub struct SingleFileRequest {
    /// Presented tier token.
    #[serde(default)]
    pub token: Option<String>,
    /// Tier the token claims to belong to.
    #[serde(default)]
    pub tier: Option<String>,
    /// Object key of the requested file.
    #[serde(default)]
    pub file_key: Option<String>,
}

/// Successful tier listing response.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    /// Always true for success responses.
    pub success: bool,
    /// Tier the listing covers.
    pub tier: TierId,
    /// Daily file entries, oldest first, each with fresh links.
    pub daily: Vec<crate::links::SignedDownloadLink>,
    /// Month-to-date entry, or null when the index carries none.
    pub mtd: Option<crate::links::SignedDownloadLink>,
    /// Instant the listing was generated, RFC 3339 UTC.
    pub generated_at: String,
}

/// Successful single-file signing response.
#[derive(Debug, Serialize)]
pub struct SingleFileResponse {
    /// Always true for success responses.
    pub success: bool,
    /// Fresh download URL for the requested key.
    pub signed_url: String,
    /// Advertised lifetime of the URL, in seconds.
    pub expires_in_seconds: u64,
}

/// Liveness probe body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Fixed liveness marker.
    pub status: &'static str,
}

// ============================================================================
// SECTION: Audit Plumbing
// ============================================================================

/// Per-request audit context shared by the handlers.
pub(crate) struct RequestAudit<'a> {
    /// Operation label recorded in the audit event.
    pub(crate) operation: &'static str,
    /// Tier named by the route or body, raw form.
    pub(crate) tier: Option<&'a str>,
    /// Object key named by the request, when any.
    pub(crate) object_key: Option<&'a str>,
    /// Caller socket address.
    pub(crate) peer: SocketAddr,
}

/// Records the single audit event for a finished request.
pub(crate) fn record_outcome(
    state: &AppState,
    ctx: &RequestAudit<'_>,
    status: StatusCode,
    admitted: Option<&AdmittedToken>,
    error: Option<&ApiError>,
) {
    let event = DownloadAuditEvent::new(DownloadAuditEventParams {
        decision: if error.is_some() { "deny" } else { "allow" },
        operation: ctx.operation,
        tier: ctx.tier.map(str::to_string),
        peer_ip: Some(ctx.peer.ip().to_string()),
        token_fingerprint: admitted.map(|token| token.fingerprint.clone()),
        token_slot: admitted.map(|token| token.slot.label()),
        object_key: ctx.object_key.map(str::to_string),
        status: status.as_u16(),
        error_kind: error.map(ApiError::kind),
        reason: error.map(ApiError::audit_reason),
    });
    state.audit.record(&event);
}

/// Finishes a request: records its audit event and renders the response.
fn complete(
    state: &AppState,
    ctx: &RequestAudit<'_>,
    result: Result<(Response, AdmittedToken), ApiError>,
) -> Response {
    match result {
        Ok((response, admitted)) => {
            record_outcome(state, ctx, response.status(), Some(&admitted), None);
            response
        }
        Err(err) => {
            record_outcome(state, ctx, err.status(), None, Some(&err));
            err.into_response()
        }
    }
}

// ============================================================================
// SECTION: Admission Helpers
// ============================================================================

/// Extracts a non-empty token or rejects the request.
pub(crate) fn require_token(token: Option<&str>) -> Result<&str, ApiError> {
    match token {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ApiError::MalformedRequest(
            "Missing token parameter".to_string(),
        )),
    }
}

/// Parses a raw tier segment or rejects the request.
pub(crate) fn parse_tier(raw: &str) -> Result<TierId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::MalformedRequest("Unknown tier".to_string()))
}

/// Validates the presented token against a tier.
pub(crate) async fn admit(
    state: &AppState,
    token: &str,
    tier: TierId,
) -> Result<AdmittedToken, ApiError> {
    match state.validator.validate(token, tier).await {
        TokenDecision::Admitted(admitted) => Ok(admitted),
        TokenDecision::Denied {
            reason,
            detail,
        } => Err(ApiError::AuthDenied {
            message: reason.message().to_string(),
            detail,
        }),
    }
}

/// Returns the leading tier segment of an object key.
fn key_tier_segment(key: &str) -> &str {
    key.split('/').next().unwrap_or_default()
}

// ============================================================================
// SECTION: Liveness
// ============================================================================

/// Handles `GET /healthz`.
pub async fn handle_healthz() -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
        }),
    )
        .into_response()
}

// ============================================================================
// SECTION: Tier Listing
// ============================================================================

/// Handles `GET /api/downloads/{tier}`.
pub async fn handle_listing(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(tier): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let result = listing_response(&state, &tier, query.token.as_deref()).await;
    let ctx = RequestAudit {
        operation: "listing",
        tier: Some(&tier),
        object_key: None,
        peer,
    };
    complete(&state, &ctx, result)
}

/// Builds the tier listing with fresh links for every index entry.
async fn listing_response(
    state: &AppState,
    tier_raw: &str,
    token: Option<&str>,
) -> Result<(Response, AdmittedToken), ApiError> {
    let tier = parse_tier(tier_raw)?;
    let token = require_token(token)?;
    let admitted = admit(state, token, tier).await?;
    let index = state
        .index_reader
        .load(tier)
        .await
        .map_err(|err| ApiError::ResourceUnavailable {
            message: "Download index unavailable".to_string(),
            detail: Some(err.to_string()),
        })?;
    let issuer = LinkIssuer::new(state.store.as_ref(), &state.downloads, token);
    let mut daily = Vec::with_capacity(index.daily.len());
    for entry in &index.daily {
        daily.push(
            issuer
                .issue(
                    &entry.date,
                    &entry.r2_key,
                    entry.manifest_key.as_deref(),
                    entry.size_bytes,
                )
                .await?,
        );
    }
    let mtd = match &index.mtd {
        Some(entry) => Some(
            issuer
                .issue(
                    &entry.month,
                    &entry.r2_key,
                    entry.manifest_key.as_deref(),
                    entry.size_bytes,
                )
                .await?,
        ),
        None => None,
    };
    let body = ListingResponse {
        success: true,
        tier,
        daily,
        mtd,
        generated_at: rfc3339(state.clock.now()),
    };
    Ok(((StatusCode::OK, Json(body)).into_response(), admitted))
}

// ============================================================================
// SECTION: Single File
// ============================================================================

/// Handles `POST /api/download`.
pub async fn handle_single_file(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> Response {
    if body.len() > state.max_body_bytes {
        let ctx = RequestAudit {
            operation: "single_file",
            tier: None,
            object_key: None,
            peer,
        };
        let err = ApiError::MalformedRequest("Request body too large".to_string());
        return complete(&state, &ctx, Err(err));
    }
    let request: SingleFileRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => {
            let ctx = RequestAudit {
                operation: "single_file",
                tier: None,
                object_key: None,
                peer,
            };
            let err = ApiError::MalformedRequest("Invalid request body".to_string());
            return complete(&state, &ctx, Err(err));
        }
    };
    let result = single_file_response(&state, &request).await;
    let ctx = RequestAudit {
        operation: "single_file",
        tier: request.tier.as_deref(),
        object_key: request.file_key.as_deref(),
        peer,
    };
    complete(&state, &ctx, result)
}

/// Issues one fresh link for an explicitly named key.
async fn single_file_response(
    state: &AppState,
    request: &SingleFileRequest,
) -> Result<(Response, AdmittedToken), ApiError> {
    let token = require_token(request.token.as_deref())?;
    let tier = parse_tier(request.tier.as_deref().unwrap_or_default())?;
    let file_key = match request.file_key.as_deref() {
        Some(key) if !key.trim().is_empty() => key,
        _ => {
            return Err(ApiError::MalformedRequest(
                "Missing file_key parameter".to_string(),
            ));
        }
    };
    validate_object_key(file_key)
        .map_err(|_| ApiError::MalformedRequest("Invalid file key".to_string()))?;
    let admitted = admit(state, token, tier).await?;
    if key_tier_segment(file_key) != tier.as_str() {
        return Err(ApiError::TierMismatch(
            "File does not belong to this tier".to_string(),
        ));
    }
    let issuer = LinkIssuer::new(state.store.as_ref(), &state.downloads, token);
    let signed_url = issuer.url_for(file_key).await?;
    let body = SingleFileResponse {
        success: true,
        signed_url,
        expires_in_seconds: state.downloads.url_ttl_seconds(),
    };
    Ok(((StatusCode::OK, Json(body)).into_response(), admitted))
}

// ============================================================================
// SECTION: Streaming Proxy
// ============================================================================

/// Handles `GET /api/download/{*key}`.
pub async fn handle_proxy(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(key): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let result = proxy_response(&state, &key, query.token.as_deref()).await;
    let ctx = RequestAudit {
        operation: "proxy",
        tier: Some(key_tier_segment(&key)),
        object_key: Some(&key),
        peer,
    };
    complete(&state, &ctx, result)
}

/// Streams an object payload after validating the token against the
/// tier derived from the leading key segment.
async fn proxy_response(
    state: &AppState,
    key: &str,
    token: Option<&str>,
) -> Result<(Response, AdmittedToken), ApiError> {
    let token = require_token(token)?;
    validate_object_key(key)
        .map_err(|_| ApiError::MalformedRequest("Invalid file key".to_string()))?;
    let tier = parse_tier(key_tier_segment(key))?;
    let admitted = admit(state, token, tier).await?;
    let payload = state
        .store
        .get_stream(key)
        .await
        .map_err(ApiError::from_store)?;
    let filename = header_safe(filename_segment(key));
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for_key(key))
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        );
    if let Some(length) = payload.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }
    let response = builder
        .body(Body::from_stream(payload.chunks))
        .map_err(|err| ApiError::Unexpected(err.to_string()))?;
    Ok((response, admitted))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
