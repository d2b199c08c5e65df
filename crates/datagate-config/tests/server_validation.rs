//! Server and token config validation tests for datagate-config.
// crates/datagate-config/tests/server_validation.rs
// =============================================================================
// Module: Server Config Validation Tests
// Description: Validate server bind, body limits, and token state settings.
// Purpose: Ensure listener and token configuration remain strict.
// =============================================================================

use datagate_config::ConfigError;

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
fn minimal_memory_config_is_valid() -> TestResult {
    let config = common::memory_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn server_rejects_empty_bind() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.server.bind = "  ".to_string();
    assert_invalid(config.validate(), "server.bind must be set")?;
    Ok(())
}

#[test]
fn server_rejects_non_socket_bind() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.server.bind = "localhost".to_string();
    assert_invalid(config.validate(), "server.bind must be a socket address")?;
    Ok(())
}

#[test]
fn server_rejects_undersized_body_limit() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.server.max_body_bytes = 512;
    assert_invalid(config.validate(), "server.max_body_bytes must be within")?;
    Ok(())
}

#[test]
fn server_rejects_oversized_body_limit() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.server.max_body_bytes = 2 * 1024 * 1024;
    assert_invalid(config.validate(), "server.max_body_bytes must be within")?;
    Ok(())
}

#[test]
fn tokens_reject_traversal_state_key() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.tokens.state_key = "config/../tier_tokens.json".to_string();
    assert_invalid(config.validate(), "tokens.state_key")?;
    Ok(())
}

#[test]
fn tokens_reject_absolute_state_key() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.tokens.state_key = "/config/tier_tokens.json".to_string();
    assert_invalid(config.validate(), "tokens.state_key")?;
    Ok(())
}

#[test]
fn tokens_reject_cache_ttl_below_minimum() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.tokens.cache_ttl_seconds = 1;
    assert_invalid(config.validate(), "tokens.cache_ttl_seconds must be within")?;
    Ok(())
}

#[test]
fn tokens_reject_cache_ttl_above_maximum() -> TestResult {
    let mut config = common::memory_config().map_err(|err| err.to_string())?;
    config.tokens.cache_ttl_seconds = 3_600;
    assert_invalid(config.validate(), "tokens.cache_ttl_seconds must be within")?;
    Ok(())
}
