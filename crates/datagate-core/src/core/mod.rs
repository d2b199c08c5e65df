// crates/datagate-core/src/core/mod.rs
// ============================================================================
// Module: Datagate Core Types
// Description: Canonical tier, token state, and download index structures.
// Purpose: Provide stable, serializable types for Datagate documents.
// Dependencies: serde, subtle, sha2, time
// ============================================================================

//! ## Overview
//! Datagate core types define the tier identifiers, the rotating token state
//! document, and the per-tier download index. These types are the canonical
//! source of truth for the HTTP surface and the CLI.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod download_index;
pub mod security;
pub mod tier;
pub mod time;
pub mod token_state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use download_index::DailyEntry;
pub use download_index::DownloadIndex;
pub use download_index::MtdEntry;
pub use security::constant_time_eq;
pub use security::constant_time_eq_str;
pub use security::token_fingerprint;
pub use tier::TierId;
pub use tier::TierParseError;
pub use time::Clock;
pub use time::ManualClock;
pub use time::SystemClock;
pub use time::rfc3339;
pub use token_state::RotationSchedule;
pub use token_state::TOKEN_LENGTH;
pub use token_state::TierTokenEntry;
pub use token_state::TokenSlot;
pub use token_state::TokenState;
