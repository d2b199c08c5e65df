// crates/datagate-core/src/core/tier.rs
// ============================================================================
// Module: Datagate Tier Identifiers
// Description: Closed set of service tier identifiers.
// Purpose: Provide strongly typed tier values with stable string forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Datagate serves exactly three tiers. Unknown tier strings are rejected at
//! the request boundary; code past that boundary only ever sees a [`TierId`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Tier Identifier
// ============================================================================

/// Service tier identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierId {
    /// First tier.
    Tier1,
    /// Second tier.
    Tier2,
    /// Third tier.
    Tier3,
}

impl TierId {
    /// All tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::Tier1, Self::Tier2, Self::Tier3];

    /// Returns the canonical string form of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Tier3 => "tier3",
        }
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierId {
    type Err = TierParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tier1" => Ok(Self::Tier1),
            "tier2" => Ok(Self::Tier2),
            "tier3" => Ok(Self::Tier3),
            other => Err(TierParseError {
                value: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when a tier string is not one of the known identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tier: {value}")]
pub struct TierParseError {
    /// Rejected tier value.
    pub value: String,
}
