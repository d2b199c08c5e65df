// crates/datagate-api/src/error.rs
// ============================================================================
// Module: API Error Taxonomy
// Description: Request failure classification and HTTP error responses.
// Purpose: Map every failure to one JSON error body and status code.
// Dependencies: axum, serde, thiserror
// ============================================================================

//! ## Overview
//! Every handler catches at its boundary and maps failures into [`ApiError`].
//! Callers see [`ApiError::public_message`]: caller-safe variants pass their
//! message through verbatim, configuration and unexpected failures collapse
//! to generic text. Internal diagnostic detail rides along for audit output
//! via [`ApiError::audit_reason`] and never reaches a response body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use datagate_core::ObjectStoreError;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Request failure taxonomy for the download API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request input.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// Token invalid for the requested tier.
    #[error("auth denied: {message}")]
    AuthDenied {
        /// Caller-safe denial message.
        message: String,
        /// Internal diagnostic detail, for audit output only.
        detail: Option<String>,
    },
    /// Requested object key does not belong to the validated tier.
    #[error("tier mismatch: {0}")]
    TierMismatch(String),
    /// Index or state document missing or unparseable; retryable.
    #[error("resource unavailable: {message}")]
    ResourceUnavailable {
        /// Caller-safe availability message.
        message: String,
        /// Internal diagnostic detail, for audit output only.
        detail: Option<String>,
    },
    /// Specific object key absent from storage.
    #[error("not found: {0}")]
    NotFound(String),
    /// Signing credentials or backend configuration broken.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Anything uncaught.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Returns the HTTP status for this failure class.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthDenied {
                ..
            } => StatusCode::UNAUTHORIZED,
            Self::TierMismatch(_) => StatusCode::FORBIDDEN,
            Self::ResourceUnavailable {
                ..
            } => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the normalized failure kind label for audit output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "malformed_request",
            Self::AuthDenied {
                ..
            } => "auth_denied",
            Self::TierMismatch(_) => "tier_mismatch",
            Self::ResourceUnavailable {
                ..
            } => "resource_unavailable",
            Self::NotFound(_) => "not_found",
            Self::Configuration(_) => "configuration",
            Self::Unexpected(_) => "unexpected",
        }
    }

    /// Returns the message surfaced to callers.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MalformedRequest(message)
            | Self::TierMismatch(message)
            | Self::NotFound(message)
            | Self::AuthDenied {
                message, ..
            }
            | Self::ResourceUnavailable {
                message, ..
            } => message.clone(),
            Self::Configuration(_) => "Service configuration error".to_string(),
            Self::Unexpected(_) => "Internal error".to_string(),
        }
    }

    /// Returns the full failure description for audit output.
    #[must_use]
    pub fn audit_reason(&self) -> String {
        match self {
            Self::AuthDenied {
                detail: Some(detail),
                ..
            }
            | Self::ResourceUnavailable {
                detail: Some(detail),
                ..
            } => format!("{self}: {detail}"),
            _ => self.to_string(),
        }
    }

    /// Maps an object-store failure on a data path into the taxonomy.
    #[must_use]
    pub fn from_store(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::NotFound(_) => Self::NotFound("File not found".to_string()),
            ObjectStoreError::Invalid(_) => Self::MalformedRequest("Invalid file key".to_string()),
            ObjectStoreError::Configuration(detail) => Self::Configuration(detail),
            ObjectStoreError::Io(detail) | ObjectStoreError::Backend(detail) => {
                Self::Unexpected(detail)
            }
            ObjectStoreError::TooLarge {
                ..
            } => Self::Unexpected(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Wire Body
// ============================================================================

/// JSON error envelope returned for every failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always false for error responses.
    pub success: bool,
    /// Caller-safe error message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
