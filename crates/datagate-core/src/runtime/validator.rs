// crates/datagate-core/src/runtime/validator.rs
// ============================================================================
// Module: Datagate Token Validator
// Description: Fail-closed admission of presented tier tokens.
// Purpose: Decide token admission against the cached rotating token state.
// Dependencies: serde_json, thiserror, time, tokio
// ============================================================================

//! ## Overview
//! The validator admits a presented token for a tier iff it matches the
//! tier's current secret, or the announced successor during an overlap
//! window. Token state is read through a bounded-staleness cache: a newly
//! rotated secret may take up to the cache TTL to propagate, which is
//! accepted, documented latency rather than a correctness bug. Any failure
//! to load or parse the state document denies the request; the validator
//! never fails open.
//!
//! Malformed tokens are rejected before any store access. An absent tier
//! entry denies with the same reason as a mismatched token so callers cannot
//! probe which tiers are provisioned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::core::Clock;
use crate::core::TOKEN_LENGTH;
use crate::core::TierId;
use crate::core::TokenSlot;
use crate::core::TokenState;
use crate::core::token_fingerprint;
use crate::interfaces::ObjectStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted size of the token state document.
pub const MAX_TOKEN_STATE_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Outcome of a token validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDecision {
    /// Token admitted for the tier.
    Admitted(AdmittedToken),
    /// Token denied with a caller-safe reason.
    Denied {
        /// Caller-safe denial reason.
        reason: DenyReason,
        /// Internal diagnostic detail, for audit output only.
        detail: Option<String>,
    },
}

impl TokenDecision {
    /// Returns whether the token was admitted.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }

    /// Builds a deny decision without diagnostic detail.
    const fn denied(reason: DenyReason) -> Self {
        Self::Denied {
            reason,
            detail: None,
        }
    }
}

/// Details of an admitted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedToken {
    /// Tier the token was admitted for.
    pub tier: TierId,
    /// Secret slot the token matched.
    pub slot: TokenSlot,
    /// Log-safe SHA-256 fingerprint of the token.
    pub fingerprint: String,
}

/// Caller-safe denial reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Presented token does not have the expected length.
    MalformedToken,
    /// Token does not match any admitted secret for the tier.
    InvalidForTier,
    /// Token state could not be loaded or parsed.
    StateUnavailable,
}

impl DenyReason {
    /// Returns the message surfaced to callers.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MalformedToken => "Token has invalid length",
            Self::InvalidForTier => "Invalid token for this tier",
            Self::StateUnavailable => "Token validation unavailable",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Internal token state load failures.
#[derive(Debug, Error)]
enum StateLoadError {
    /// Store read failed.
    #[error("token state fetch failed: {0}")]
    Fetch(#[from] crate::interfaces::ObjectStoreError),
    /// Document did not parse.
    #[error("token state parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validator construction parameters.
#[derive(Debug, Clone)]
pub struct TokenValidatorConfig {
    /// Object key of the token state document.
    pub state_key: String,
    /// Cache lifetime for the token state snapshot, in seconds.
    pub cache_ttl_seconds: u64,
}

/// Token state snapshot with its load instant.
struct CachedTokenState {
    /// Parsed state document.
    state: Arc<TokenState>,
    /// Clock reading when the snapshot was loaded.
    loaded_at: OffsetDateTime,
}

/// Fail-closed tier token validator.
pub struct TokenValidator {
    /// Backing object store.
    store: Arc<dyn ObjectStore>,
    /// Injected clock for staleness checks.
    clock: Arc<dyn Clock>,
    /// Object key of the token state document.
    state_key: String,
    /// Cache lifetime for the token state snapshot.
    cache_ttl: Duration,
    /// Cached snapshot, refreshed on expiry.
    cache: Mutex<Option<CachedTokenState>>,
}

impl TokenValidator {
    /// Creates a validator over the given store and clock.
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        config: TokenValidatorConfig,
    ) -> Self {
        let ttl_seconds = i64::try_from(config.cache_ttl_seconds).unwrap_or(i64::MAX);
        Self {
            store,
            clock,
            state_key: config.state_key,
            cache_ttl: Duration::seconds(ttl_seconds),
            cache: Mutex::new(None),
        }
    }

    /// Decides admission of a presented token for a tier.
    ///
    /// Length is checked before any store access. Comparisons against the
    /// admitted secrets run in constant time.
    pub async fn validate(&self, presented: &str, tier: TierId) -> TokenDecision {
        if presented.len() != TOKEN_LENGTH {
            return TokenDecision::denied(DenyReason::MalformedToken);
        }
        let state = match self.state_snapshot().await {
            Ok(state) => state,
            Err(err) => {
                return TokenDecision::Denied {
                    reason: DenyReason::StateUnavailable,
                    detail: Some(err.to_string()),
                };
            }
        };
        let Some(entry) = state.tier(tier) else {
            return TokenDecision::denied(DenyReason::InvalidForTier);
        };
        match entry.admits(presented) {
            Some(slot) => TokenDecision::Admitted(AdmittedToken {
                tier,
                slot,
                fingerprint: token_fingerprint(presented),
            }),
            None => TokenDecision::denied(DenyReason::InvalidForTier),
        }
    }

    /// Returns a token state snapshot no older than the cache TTL.
    ///
    /// The fetch happens outside the cache lock; concurrent refreshes race
    /// benignly and the last write wins.
    async fn state_snapshot(&self) -> Result<Arc<TokenState>, StateLoadError> {
        let now = self.clock.now();
        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.as_ref()
                && now - cached.loaded_at < self.cache_ttl
            {
                return Ok(Arc::clone(&cached.state));
            }
        }
        let bytes = self.store.get(&self.state_key, MAX_TOKEN_STATE_BYTES).await?;
        let state: TokenState = serde_json::from_slice(&bytes)?;
        let state = Arc::new(state);
        let mut cache = self.cache.lock().await;
        *cache = Some(CachedTokenState {
            state: Arc::clone(&state),
            loaded_at: now,
        });
        Ok(state)
    }
}
