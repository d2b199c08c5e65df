// crates/datagate-core/src/lib.rs
// ============================================================================
// Module: Datagate Core Library
// Description: Public API surface for the Datagate core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Datagate core provides tier token validation, download index reading, and
//! the object-store capability interface behind tier-gated dataset downloads.
//! It is backend-agnostic and integrates through explicit interfaces rather
//! than embedding into a specific storage provider.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ObjectBody;
pub use interfaces::ObjectStore;
pub use interfaces::ObjectStoreError;
pub use interfaces::validate_object_key;
pub use runtime::AdmittedToken;
pub use runtime::DenyReason;
pub use runtime::DownloadIndexReader;
pub use runtime::IndexError;
pub use runtime::MemoryObjectStore;
pub use runtime::TokenDecision;
pub use runtime::TokenValidator;
pub use runtime::TokenValidatorConfig;
