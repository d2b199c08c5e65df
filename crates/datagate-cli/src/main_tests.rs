// crates/datagate-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Entry Point Tests
// Description: Unit tests for argument parsing, decision rendering, and the
//              command wiring against a memory-backed configuration.
// Purpose: Ensure operator commands parse strictly and fail closed.
// Dependencies: datagate-cli main helpers, datagate-core, tempfile
// ============================================================================

//! ## Overview
//! Validates CLI argument shapes, the `check-token` output mapping, and the
//! fail-closed behavior of commands when backing state is absent.
//!
//! Security posture: decision output must carry fingerprints, never raw
//! tokens.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use datagate_core::AdmittedToken;
use datagate_core::DenyReason;
use datagate_core::TierId;
use datagate_core::TokenDecision;
use datagate_core::TokenSlot;
use tempfile::NamedTempFile;

use super::CheckTokenCommand;
use super::Cli;
use super::Commands;
use super::ShowIndexCommand;
use super::SignCommand;
use super::command_check_token;
use super::command_show_index;
use super::command_sign;
use super::load_config;
use super::parse_tier_arg;
use super::render_check_token;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes a config file selecting the memory object store backend.
fn memory_config_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(b"[object_store]\nprovider = \"memory\"\n").expect("write temp config");
    file
}

/// A syntactically admissible 43-character token fixture.
const WELL_FORMED_TOKEN: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopq";

// ============================================================================
// SECTION: Argument Parsing Tests
// ============================================================================

/// Verifies `check-token` parses the tier flag and positional token.
#[test]
fn cli_parses_check_token_arguments() {
    let cli = Cli::try_parse_from(["datagate", "check-token", "--tier", "tier1", "tok"])
        .expect("parse check-token");
    let Some(Commands::CheckToken(command)) = cli.command else {
        panic!("expected check-token command");
    };
    assert_eq!(command.tier, "tier1");
    assert_eq!(command.token, "tok");
    assert!(command.config.is_none());
}

/// Verifies `sign` parses the key and TTL override flags.
#[test]
fn cli_parses_sign_ttl_override() {
    let cli = Cli::try_parse_from([
        "datagate",
        "sign",
        "--key",
        "tier1/daily/2026-01-27/data.parquet",
        "--ttl-seconds",
        "3600",
    ])
    .expect("parse sign");
    let Some(Commands::Sign(command)) = cli.command else {
        panic!("expected sign command");
    };
    assert_eq!(command.key, "tier1/daily/2026-01-27/data.parquet");
    assert_eq!(command.ttl_seconds, Some(3_600));
}

/// Verifies `serve` accepts an explicit config path.
#[test]
fn cli_parses_serve_config_path() {
    let cli = Cli::try_parse_from(["datagate", "serve", "--config", "/etc/datagate.toml"])
        .expect("parse serve");
    let Some(Commands::Serve(command)) = cli.command else {
        panic!("expected serve command");
    };
    assert_eq!(command.config, Some(PathBuf::from("/etc/datagate.toml")));
}

/// Verifies `show-index` parses the tier flag.
#[test]
fn cli_parses_show_index_tier() {
    let cli =
        Cli::try_parse_from(["datagate", "show-index", "--tier", "tier3"]).expect("parse");
    let Some(Commands::ShowIndex(command)) = cli.command else {
        panic!("expected show-index command");
    };
    assert_eq!(command.tier, "tier3");
}

/// Verifies `show-index` rejects invocations without a tier.
#[test]
fn cli_requires_tier_for_show_index() {
    let result = Cli::try_parse_from(["datagate", "show-index"]);
    assert!(result.is_err());
}

/// Verifies the version flag is accepted without a subcommand.
#[test]
fn cli_version_flag_is_global() {
    let cli = Cli::try_parse_from(["datagate", "--version"]).expect("parse version flag");
    assert!(cli.show_version);
    assert!(cli.command.is_none());
}

// ============================================================================
// SECTION: Tier Argument Tests
// ============================================================================

/// Verifies all known tier identifiers parse.
#[test]
fn parse_tier_arg_accepts_known_tiers() {
    assert_eq!(parse_tier_arg("tier1").expect("tier1"), TierId::Tier1);
    assert_eq!(parse_tier_arg("tier2").expect("tier2"), TierId::Tier2);
    assert_eq!(parse_tier_arg("tier3").expect("tier3"), TierId::Tier3);
}

/// Verifies unknown tier identifiers are rejected with the offending value.
#[test]
fn parse_tier_arg_rejects_unknown_tier() {
    let err = parse_tier_arg("gold").expect_err("expected tier rejection");
    assert_eq!(err.to_string(), "unknown tier: gold");
}

// ============================================================================
// SECTION: Decision Rendering Tests
// ============================================================================

/// Verifies admitted decisions serialize with slot and fingerprint only.
#[test]
fn render_check_token_serializes_admitted_decision() {
    let decision = TokenDecision::Admitted(AdmittedToken {
        tier: TierId::Tier1,
        slot: TokenSlot::Current,
        fingerprint: "aabbcc".to_string(),
    });

    let output = render_check_token(&decision, TierId::Tier1);
    let line = serde_json::to_string(&output).expect("serialize admitted output");

    assert!(output.valid);
    assert_eq!(
        line,
        "{\"valid\":true,\"tier\":\"tier1\",\"slot\":\"current\",\"fingerprint\":\"aabbcc\"}"
    );
}

/// Verifies denied decisions serialize with the reason and no token fields.
#[test]
fn render_check_token_serializes_denied_decision() {
    let decision = TokenDecision::Denied {
        reason: DenyReason::InvalidForTier,
        detail: None,
    };

    let output = render_check_token(&decision, TierId::Tier2);
    let line = serde_json::to_string(&output).expect("serialize denied output");

    assert!(!output.valid);
    assert_eq!(
        line,
        "{\"valid\":false,\"tier\":\"tier2\",\"reason\":\"Invalid token for this tier\"}"
    );
}

/// Verifies diagnostic detail is carried through for denied decisions.
#[test]
fn render_check_token_carries_denial_detail() {
    let decision = TokenDecision::Denied {
        reason: DenyReason::StateUnavailable,
        detail: Some("state fetch failed".to_string()),
    };

    let output = render_check_token(&decision, TierId::Tier3);

    assert_eq!(output.reason.as_deref(), Some("Token validation unavailable"));
    assert_eq!(output.detail.as_deref(), Some("state fetch failed"));
}

// ============================================================================
// SECTION: Command Wiring Tests
// ============================================================================

/// Verifies a zero TTL override is rejected before any config access.
#[tokio::test]
async fn command_sign_rejects_zero_ttl() {
    let command = SignCommand {
        key: "tier1/daily/2026-01-27/data.parquet".to_string(),
        ttl_seconds: Some(0),
        config: Some(PathBuf::from("/nonexistent/datagate.toml")),
    };

    let err = command_sign(command).await.expect_err("expected ttl rejection");
    assert_eq!(err.to_string(), "ttl-seconds must be positive");
}

/// Verifies `sign` issues a URL from a memory-backed config.
#[tokio::test]
async fn command_sign_issues_url_with_memory_store() {
    let config = memory_config_file();
    let command = SignCommand {
        key: "tier1/daily/2026-01-27/data.parquet".to_string(),
        ttl_seconds: Some(3_600),
        config: Some(config.path().to_path_buf()),
    };

    let result = command_sign(command).await;
    assert!(result.is_ok());
}

/// Verifies `show-index` surfaces index unavailability as a command error.
#[tokio::test]
async fn command_show_index_reports_missing_index() {
    let config = memory_config_file();
    let command = ShowIndexCommand {
        tier: "tier1".to_string(),
        config: Some(config.path().to_path_buf()),
    };

    let err = command_show_index(command).await.expect_err("expected missing index failure");
    assert!(err.to_string().contains("download index unavailable"));
}

/// Verifies `check-token` completes a denial against an empty memory store.
#[tokio::test]
async fn command_check_token_runs_against_memory_store() {
    let config = memory_config_file();
    let command = CheckTokenCommand {
        tier: "tier1".to_string(),
        token: WELL_FORMED_TOKEN.to_string(),
        config: Some(config.path().to_path_buf()),
    };

    let result = command_check_token(command).await;
    assert!(result.is_ok());
}

// ============================================================================
// SECTION: Config Loading Tests
// ============================================================================

/// Verifies missing config files map to a single-line load error.
#[test]
fn load_config_rejects_missing_file() {
    let err = load_config(Some(Path::new("/nonexistent/datagate.toml")))
        .expect_err("expected config load failure");
    assert!(err.to_string().starts_with("config load failed: "));
}
