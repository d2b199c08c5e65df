//! Download config validation tests for datagate-config.
// crates/datagate-config/tests/downloads_validation.rs
// =============================================================================
// Module: Download Config Validation Tests
// Description: Validate index prefix, retention, margin, and delivery rules.
// Purpose: Ensure signed URL lifetimes never outlive retained objects.
// =============================================================================

use datagate_config::ConfigError;
use datagate_config::DeliveryMode;

mod common;

type TestResult = Result<(), String>;

/// Assert that a validation result is an error containing a specific substring.
fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn default_url_ttl_is_retention_minus_margin() -> TestResult {
    let config = common::memory_config().map_err(|err| err.to_string())?;
    let ttl = config.downloads.url_ttl_seconds();
    if ttl != 590_400 {
        return Err(format!("expected default ttl 590400, got {ttl}"));
    }
    Ok(())
}

#[test]
fn url_ttl_tracks_retention_changes() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.daily_retention_days = 3;
    config.downloads.url_ttl_safety_margin_seconds = 3_600;
    config.validate().map_err(|err| err.to_string())?;
    let ttl = config.downloads.url_ttl_seconds();
    if ttl != 3 * 86_400 - 3_600 {
        return Err(format!("unexpected ttl {ttl}"));
    }
    Ok(())
}

#[test]
fn downloads_reject_empty_index_prefix() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.index_key_prefix = " ".to_string();
    assert_invalid(config.validate(), "downloads.index_key_prefix must be set")?;
    Ok(())
}

#[test]
fn downloads_reject_absolute_index_prefix() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.index_key_prefix = "/config/download_index_".to_string();
    assert_invalid(config.validate(), "downloads.index_key_prefix must be a relative key prefix")?;
    Ok(())
}

#[test]
fn downloads_reject_traversal_index_prefix() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.index_key_prefix = "config/../download_index_".to_string();
    assert_invalid(config.validate(), "downloads.index_key_prefix must be a relative key prefix")?;
    Ok(())
}

#[test]
fn downloads_reject_retention_out_of_range() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.daily_retention_days = 45;
    assert_invalid(config.validate(), "downloads.daily_retention_days must be within")?;
    Ok(())
}

#[test]
fn downloads_reject_margin_out_of_range() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.url_ttl_safety_margin_seconds = 100;
    assert_invalid(config.validate(), "downloads.url_ttl_safety_margin_seconds must be within")?;
    Ok(())
}

#[test]
fn downloads_reject_margin_consuming_retention() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.daily_retention_days = 1;
    config.downloads.url_ttl_safety_margin_seconds = 86_400;
    assert_invalid(
        config.validate(),
        "downloads.url_ttl_safety_margin_seconds must be less than the retention window",
    )?;
    Ok(())
}

#[test]
fn downloads_reject_ttl_above_signer_ceiling() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.daily_retention_days = 10;
    config.downloads.url_ttl_safety_margin_seconds = 14_400;
    assert_invalid(config.validate(), "signed URL lifetime exceeds the signer ceiling")?;
    Ok(())
}

#[test]
fn proxy_delivery_requires_public_base_url() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.delivery = DeliveryMode::Proxy;
    config.downloads.public_base_url = None;
    assert_invalid(config.validate(), "downloads.public_base_url is required in proxy delivery")?;
    Ok(())
}

#[test]
fn proxy_delivery_requires_base_url_scheme() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.delivery = DeliveryMode::Proxy;
    config.downloads.public_base_url = Some("data.example.com".to_string());
    assert_invalid(config.validate(), "downloads.public_base_url must include http:// or https://")?;
    Ok(())
}

#[test]
fn proxy_delivery_accepts_https_base_url() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.downloads.delivery = DeliveryMode::Proxy;
    config.downloads.public_base_url = Some("https://data.example.com".to_string());
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}
