// crates/datagate-config/src/lib.rs
// ============================================================================
// Module: Datagate Config Library
// Description: Canonical config model and validation for Datagate.
// Purpose: Single source of truth for datagate.toml semantics.
// Dependencies: datagate-core, serde, toml
// ============================================================================

//! ## Overview
//! `datagate-config` defines the canonical configuration model for Datagate.
//! Loading is strict and fail-closed: size and path limits are enforced, every
//! section validates its bounds, and an invalid file aborts startup. Object
//! store credentials never appear in the file; they come from the ambient
//! credential chain.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
