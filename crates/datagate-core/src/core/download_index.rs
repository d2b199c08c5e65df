// crates/datagate-core/src/core/download_index.rs
// ============================================================================
// Module: Datagate Download Index
// Description: Wire structures for the per-tier download index documents.
// Purpose: Parse the externally published list of downloadable objects.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each tier has one index document (`config/download_index_tier{N}.json`)
//! maintained by an external publisher. The index is a cache of which dataset
//! objects currently exist; Datagate does not verify the referenced keys live.
//! A missing object surfaces downstream as a fetch or sign failure, never as
//! a parse failure here. Field names `r2_key` and `manifest_key` are wire
//! literals and must stay as published.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Index Document
// ============================================================================

/// Root of a per-tier download index document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DownloadIndex {
    /// Daily dataset entries, newest first by publisher convention.
    #[serde(default)]
    pub daily: Vec<DailyEntry>,
    /// Month-to-date aggregate entry, absent until first built.
    #[serde(default)]
    pub mtd: Option<MtdEntry>,
}

/// One daily dataset object and its manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Dataset date in `YYYY-MM-DD` form.
    pub date: String,
    /// Object key of the dataset file.
    pub r2_key: String,
    /// Object key of the manifest file, when one was published.
    #[serde(default)]
    pub manifest_key: Option<String>,
    /// Dataset file size in bytes.
    pub size_bytes: u64,
}

/// The month-to-date aggregate object and its manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtdEntry {
    /// Aggregate month in `YYYY-MM` form.
    pub month: String,
    /// Object key of the aggregate dataset file.
    pub r2_key: String,
    /// Object key of the manifest file, when one was published.
    #[serde(default)]
    pub manifest_key: Option<String>,
    /// Aggregate file size in bytes.
    pub size_bytes: u64,
    /// Number of completed days folded into the aggregate.
    #[serde(default)]
    pub days_included: Option<u32>,
}
