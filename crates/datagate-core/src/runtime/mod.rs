// crates/datagate-core/src/runtime/mod.rs
// ============================================================================
// Module: Datagate Runtime
// Description: Token validation, index reading, and the in-memory store.
// Purpose: Provide the request-path building blocks over the store interface.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components sit between the HTTP surface and the object store.
//! They hold no shared mutable state beyond the validator's bounded-staleness
//! token state cache and fail closed whenever the backing documents cannot be
//! read.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod index_reader;
pub mod memory;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use index_reader::DownloadIndexReader;
pub use index_reader::IndexError;
pub use index_reader::MAX_INDEX_BYTES;
pub use memory::MemoryObjectStore;
pub use validator::AdmittedToken;
pub use validator::DenyReason;
pub use validator::MAX_TOKEN_STATE_BYTES;
pub use validator::TokenDecision;
pub use validator::TokenValidator;
pub use validator::TokenValidatorConfig;
