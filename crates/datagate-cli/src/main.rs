// crates/datagate-cli/src/main.rs
// ============================================================================
// Module: Datagate CLI Entry Point
// Description: Command-line interface for running and operating the download
//              service: serve the API, check tokens, sign URLs, inspect
//              download indexes.
// Purpose: Give operators one binary for the service and its escape hatches.
// Dependencies: clap, datagate-api, datagate-config, datagate-core,
//               datagate-store-s3, serde, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The `datagate` binary exposes four subcommands:
//!
//! - `serve` runs the HTTP API against the configured object store.
//! - `check-token` validates one presented token against a tier and prints
//!   the decision as a single JSON line; the exit code mirrors the decision.
//! - `sign` issues one signed URL for an arbitrary object key.
//! - `show-index` fetches and pretty-prints a tier's download index.
//!
//! All commands resolve configuration the same way: `--config PATH`, then
//! the `DATAGATE_CONFIG` environment variable, then `datagate.toml` in the
//! working directory.
//!
//! Security posture: raw tokens are accepted as arguments but never echoed
//! back; decision output carries fingerprints only.

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use datagate_api::AppState;
use datagate_api::StderrAuditSink;
use datagate_config::DatagateConfig;
use datagate_core::DownloadIndexReader;
use datagate_core::ObjectStore;
use datagate_core::SystemClock;
use datagate_core::TierId;
use datagate_core::TokenDecision;
use datagate_core::TokenValidator;
use datagate_core::TokenValidatorConfig;
use datagate_store_s3::build_object_store;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "datagate",
    about = "Tier-gated dataset download service",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the download service API.
    Serve(ServeCommand),
    /// Validate one token against a tier.
    #[command(name = "check-token")]
    CheckToken(CheckTokenCommand),
    /// Issue one signed URL for an object key.
    Sign(SignCommand),
    /// Fetch and print a tier's download index.
    #[command(name = "show-index")]
    ShowIndex(ShowIndexCommand),
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `check-token` command.
#[derive(Args, Debug)]
struct CheckTokenCommand {
    /// Tier to validate against.
    #[arg(long, value_name = "TIER")]
    tier: String,
    /// Presented token value.
    #[arg(value_name = "TOKEN")]
    token: String,
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `sign` command.
#[derive(Args, Debug)]
struct SignCommand {
    /// Object key to sign.
    #[arg(long, value_name = "KEY")]
    key: String,
    /// Signed URL lifetime override in seconds.
    #[arg(long = "ttl-seconds", value_name = "SECONDS")]
    ttl_seconds: Option<u64>,
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `show-index` command.
#[derive(Args, Debug)]
struct ShowIndexCommand {
    /// Tier whose index to fetch.
    #[arg(long, value_name = "TIER")]
    tier: String,
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a display-ready message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches the selected command.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("datagate {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::CheckToken(command) => command_check_token(command).await,
        Commands::Sign(command) => command_sign(command).await,
        Commands::ShowIndex(command) => command_show_index(command).await,
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let store = build_store(&config).await?;
    let state = Arc::new(AppState::new(
        store,
        Arc::new(SystemClock),
        Arc::new(StderrAuditSink),
        &config,
    ));
    write_stderr_line(&format!("datagate listening on {}", config.server.bind))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    datagate_api::serve(state, &config.server.bind)
        .await
        .map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `check-token` command.
async fn command_check_token(command: CheckTokenCommand) -> CliResult<ExitCode> {
    let tier = parse_tier_arg(&command.tier)?;
    let config = load_config(command.config.as_deref())?;
    let store = build_store(&config).await?;
    let validator = TokenValidator::new(
        store,
        Arc::new(SystemClock),
        TokenValidatorConfig {
            state_key: config.tokens.state_key.clone(),
            cache_ttl_seconds: config.tokens.cache_ttl_seconds,
        },
    );
    let decision = validator.validate(&command.token, tier).await;
    let output = render_check_token(&decision, tier);
    write_json_line(&output)?;
    if output.valid {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Executes the `sign` command.
async fn command_sign(command: SignCommand) -> CliResult<ExitCode> {
    let ttl_override = match command.ttl_seconds {
        Some(0) => {
            return Err(CliError::new("ttl-seconds must be positive".to_string()));
        }
        Some(seconds) => Some(Duration::from_secs(seconds)),
        None => None,
    };
    let config = load_config(command.config.as_deref())?;
    let store = build_store(&config).await?;
    let ttl = ttl_override.unwrap_or_else(|| config.downloads.url_ttl());
    let url = store
        .sign_get(&command.key, ttl, None)
        .await
        .map_err(|err| CliError::new(format!("signing failed: {err}")))?;
    write_stdout_line(&url).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `show-index` command.
async fn command_show_index(command: ShowIndexCommand) -> CliResult<ExitCode> {
    let tier = parse_tier_arg(&command.tier)?;
    let config = load_config(command.config.as_deref())?;
    let store = build_store(&config).await?;
    let reader = DownloadIndexReader::new(store, config.downloads.index_key_prefix.clone());
    let index = reader
        .load(tier)
        .await
        .map_err(|err| CliError::new(err.to_string()))?;
    let pretty = serde_json::to_string_pretty(&index)
        .map_err(|err| CliError::new(format!("index serialization failed: {err}")))?;
    write_stdout_line(&pretty).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Command Helpers
// ============================================================================

/// Loads and validates the service configuration.
fn load_config(path: Option<&Path>) -> CliResult<DatagateConfig> {
    DatagateConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Builds the configured object store backend.
async fn build_store(config: &DatagateConfig) -> CliResult<Arc<dyn ObjectStore>> {
    build_object_store(&config.object_store)
        .await
        .map_err(|err| CliError::new(format!("object store init failed: {err}")))
}

/// Parses a tier CLI argument.
fn parse_tier_arg(raw: &str) -> CliResult<TierId> {
    raw.parse::<TierId>().map_err(|err| CliError::new(err.to_string()))
}

/// Wire shape of the `check-token` decision output.
#[derive(Debug, Serialize)]
struct CheckTokenOutput {
    /// Whether the token was admitted.
    valid: bool,
    /// Tier the check ran against.
    tier: String,
    /// Matched secret slot for admitted tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    slot: Option<&'static str>,
    /// Log-safe fingerprint for admitted tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    /// Denial reason for rejected tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    /// Internal diagnostic detail for rejected tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Maps a validator decision to the `check-token` output shape.
fn render_check_token(decision: &TokenDecision, tier: TierId) -> CheckTokenOutput {
    match decision {
        TokenDecision::Admitted(admitted) => CheckTokenOutput {
            valid: true,
            tier: tier.as_str().to_string(),
            slot: Some(admitted.slot.label()),
            fingerprint: Some(admitted.fingerprint.clone()),
            reason: None,
            detail: None,
        },
        TokenDecision::Denied {
            reason,
            detail,
        } => CheckTokenOutput {
            valid: false,
            tier: tier.as_str().to_string(),
            slot: None,
            fingerprint: None,
            reason: Some(reason.message().to_string()),
            detail: detail.clone(),
        },
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Serializes a value as one JSON line on stdout.
fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let line = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("output serialization failed: {err}")))?;
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Formats an output failure message for a named stream.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}
