// crates/datagate-core/src/core/token_state.rs
// ============================================================================
// Module: Datagate Token State
// Description: Wire structures for the rotating tier token document.
// Purpose: Parse and query the externally published token state.
// Dependencies: serde, crate::core::security, crate::core::tier
// ============================================================================

//! ## Overview
//! The token state document (`config/tier_tokens.json`) is owned by an
//! external rotation job; Datagate only reads it. Parsing is tolerant:
//! informational fields may be absent without failing deserialization, and
//! unknown tiers in the document are carried but never admitted. Rotation
//! schedule fields are opaque strings and are never enforced here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::security::constant_time_eq_str;
use crate::core::tier::TierId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exact length of a tier token in characters.
///
/// Tokens are the unpadded base64url form of 32 random bytes. Any presented
/// value of a different length is rejected before the state document is read.
pub const TOKEN_LENGTH: usize = 43;

// ============================================================================
// SECTION: Token State Document
// ============================================================================

/// Root of the rotating token state document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenState {
    /// Document schema version.
    #[serde(default)]
    pub version: u32,
    /// Timestamp of the last writer update (informational).
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Human-facing rotation schedule (informational, never enforced).
    #[serde(default)]
    pub rotation_schedule: Option<RotationSchedule>,
    /// Per-tier token entries keyed by tier name.
    #[serde(default)]
    pub tiers: BTreeMap<String, TierTokenEntry>,
}

impl TokenState {
    /// Returns the entry for a tier, if the document carries one.
    #[must_use]
    pub fn tier(&self, tier: TierId) -> Option<&TierTokenEntry> {
        self.tiers.get(tier.as_str())
    }
}

/// Rotation schedule metadata published alongside the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RotationSchedule {
    /// Weekday the next token is announced.
    #[serde(default)]
    pub announce_day: Option<String>,
    /// Weekday the overlap window opens.
    #[serde(default)]
    pub overlap_day: Option<String>,
    /// Weekday the next token is promoted to current.
    #[serde(default)]
    pub promote_day: Option<String>,
    /// Timezone the schedule days are expressed in.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Token slots for a single tier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierTokenEntry {
    /// Currently promoted secret, or `None` when the slot is vacant.
    #[serde(default)]
    pub current_token: Option<String>,
    /// Announced successor secret, or `None` outside a rotation.
    #[serde(default)]
    pub next_token: Option<String>,
    /// Whether the successor secret is also admitted.
    #[serde(default)]
    pub overlap_active: bool,
    /// Generation timestamp of the current secret (informational).
    #[serde(default)]
    pub current_generated_at: Option<String>,
    /// Generation timestamp of the successor secret (informational).
    #[serde(default)]
    pub next_generated_at: Option<String>,
}

impl TierTokenEntry {
    /// Tests a presented token against the admitted slots.
    ///
    /// Admits on a constant-time match with `current_token`, or with
    /// `next_token` when `overlap_active` is set. A vacant current slot admits
    /// nothing through that slot; an overlap-active successor still can.
    #[must_use]
    pub fn admits(&self, presented: &str) -> Option<TokenSlot> {
        if let Some(current) = self.current_token.as_deref()
            && constant_time_eq_str(presented, current)
        {
            return Some(TokenSlot::Current);
        }
        if self.overlap_active
            && let Some(next) = self.next_token.as_deref()
            && constant_time_eq_str(presented, next)
        {
            return Some(TokenSlot::Next);
        }
        None
    }
}

/// Identifies which secret slot a presented token matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSlot {
    /// Matched the promoted secret.
    Current,
    /// Matched the announced successor during an overlap window.
    Next,
}

impl TokenSlot {
    /// Returns the canonical label for audit output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Next => "next",
        }
    }
}
