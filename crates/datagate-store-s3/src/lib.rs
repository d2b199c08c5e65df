// crates/datagate-store-s3/src/lib.rs
// ============================================================================
// Module: S3 Object Store
// Description: S3-compatible ObjectStore backend for dataset storage.
// Purpose: Provide production object storage access for Datagate.
// Dependencies: datagate-core, datagate-config, aws-sdk-s3, aws-config
// ============================================================================

//! ## Overview
//! This crate provides the S3-backed [`datagate_core::ObjectStore`]
//! implementation used in production, alongside a provider-driven factory
//! that also covers the in-memory store for tests and local development.
//! Any S3-compatible endpoint works, including Cloudflare R2 through its
//! account endpoint. Credentials come from the ambient provider chain;
//! Datagate configuration never carries secrets.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::S3ObjectStore;
pub use store::build_object_store;
