// crates/datagate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for datagate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use datagate_config::DatagateConfig;
use datagate_config::ObjectStoreProvider;

/// Parses a TOML string into a `DatagateConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<DatagateConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<DatagateConfig, toml::de::Error> {
    config_from_toml("")
}

/// Returns a minimal config backed by the in-memory store provider.
pub fn memory_config() -> Result<DatagateConfig, toml::de::Error> {
    let mut config = minimal_config()?;
    config.object_store.provider = ObjectStoreProvider::Memory;
    Ok(config)
}

/// Returns a minimal config backed by the s3 provider with a bucket set.
pub fn s3_config(bucket: &str) -> Result<DatagateConfig, toml::de::Error> {
    let mut config = minimal_config()?;
    config.object_store.provider = ObjectStoreProvider::S3;
    config.object_store.bucket = bucket.to_string();
    Ok(config)
}
