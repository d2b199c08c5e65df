// crates/datagate-api/src/pages.rs
// ============================================================================
// Module: Download Pages
// Description: Server-rendered HTML download pages per tier.
// Purpose: Give non-technical callers a browsable page over the listing API.
// Dependencies: axum, serde_json, datagate-core
// ============================================================================

//! ## Overview
//! The page route wraps the listing API in a minimal HTML document. The page
//! validates the presented token up front and renders one of four documents:
//! the download table, an access-denied notice pointing at the tier's pinned
//! post, a temporary-outage notice, or a not-found notice for unknown tiers.
//! Listing values are rendered client-side through DOM text nodes, so index
//! content never lands in the page as raw markup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use datagate_core::DenyReason;
use datagate_core::TierId;
use datagate_core::TokenDecision;
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::RequestAudit;
use crate::handlers::record_outcome;
use crate::state::AppState;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Query parameters accepted by the download page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Presented tier token, short query form.
    #[serde(default)]
    pub t: Option<String>,
}

// ============================================================================
// SECTION: Page Handler
// ============================================================================

/// Handles `GET /downloads/{tier}`.
pub async fn handle_page(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(tier_raw): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let ctx = RequestAudit {
        operation: "page",
        tier: Some(&tier_raw),
        object_key: None,
        peer,
    };
    let Ok(tier) = tier_raw.parse::<TierId>() else {
        let err = ApiError::NotFound("Unknown download page".to_string());
        record_outcome(&state, &ctx, StatusCode::NOT_FOUND, None, Some(&err));
        return page_response(StatusCode::NOT_FOUND, &not_found_page());
    };
    let token = match query.t {
        Some(token) if !token.trim().is_empty() => token,
        _ => {
            let err = ApiError::AuthDenied {
                message: "Missing token parameter".to_string(),
                detail: None,
            };
            record_outcome(&state, &ctx, StatusCode::FORBIDDEN, None, Some(&err));
            return page_response(StatusCode::FORBIDDEN, &denied_page());
        }
    };
    match state.validator.validate(&token, tier).await {
        TokenDecision::Admitted(admitted) => {
            record_outcome(&state, &ctx, StatusCode::OK, Some(&admitted), None);
            page_response(StatusCode::OK, &downloads_page(tier, &token))
        }
        TokenDecision::Denied {
            reason: DenyReason::StateUnavailable,
            detail,
        } => {
            let err = ApiError::ResourceUnavailable {
                message: DenyReason::StateUnavailable.message().to_string(),
                detail,
            };
            record_outcome(&state, &ctx, StatusCode::SERVICE_UNAVAILABLE, None, Some(&err));
            page_response(StatusCode::SERVICE_UNAVAILABLE, &unavailable_page())
        }
        TokenDecision::Denied {
            reason,
            detail,
        } => {
            let err = ApiError::AuthDenied {
                message: reason.message().to_string(),
                detail,
            };
            record_outcome(&state, &ctx, StatusCode::FORBIDDEN, None, Some(&err));
            page_response(StatusCode::FORBIDDEN, &denied_page())
        }
    }
}

/// Renders an HTML response with the given status.
fn page_response(status: StatusCode, html: &str) -> Response {
    (status, Html(html.to_string())).into_response()
}

// ============================================================================
// SECTION: Document Rendering
// ============================================================================

/// Stylesheet shared by every rendered page.
const PAGE_STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem auto;\
max-width:42rem;padding:0 1rem;color:#1b1f24}\
table{border-collapse:collapse;width:100%}\
th,td{text-align:left;padding:.4rem .6rem;border-bottom:1px solid #d0d7de}\
a{color:#0757ba}";

/// Client script that fetches the listing and renders the table.
///
/// Reads its tier and token from `window.DATAGATE` and builds rows through
/// DOM text nodes only.
const LISTING_SCRIPT: &str = r#"(function () {
  var cfg = window.DATAGATE || {};
  var status = document.getElementById("status");
  var table = document.getElementById("files");
  var rows = document.getElementById("rows");
  function formatSize(bytes) {
    if (bytes >= 1073741824) { return (bytes / 1073741824).toFixed(2) + " GiB"; }
    if (bytes >= 1048576) { return (bytes / 1048576).toFixed(1) + " MiB"; }
    if (bytes >= 1024) { return (bytes / 1024).toFixed(0) + " KiB"; }
    return bytes + " B";
  }
  function link(url, label) {
    if (!url) { return document.createTextNode("-"); }
    var anchor = document.createElement("a");
    anchor.href = url;
    anchor.textContent = label;
    return anchor;
  }
  function addRow(label, entry) {
    var tr = document.createElement("tr");
    var period = document.createElement("td");
    period.textContent = label;
    var size = document.createElement("td");
    size.textContent = formatSize(entry.size_bytes);
    var data = document.createElement("td");
    data.appendChild(link(entry.download_url, "download"));
    var manifest = document.createElement("td");
    manifest.appendChild(link(entry.manifest_url, "manifest"));
    tr.appendChild(period);
    tr.appendChild(size);
    tr.appendChild(data);
    tr.appendChild(manifest);
    rows.appendChild(tr);
  }
  var endpoint = "/api/downloads/" + cfg.tier + "?token=" + encodeURIComponent(cfg.token || "");
  fetch(endpoint)
    .then(function (res) { return res.json(); })
    .then(function (data) {
      if (!data.success) {
        status.textContent = data.error || "Download listing failed.";
        return;
      }
      data.daily.forEach(function (entry) { addRow(entry.date_or_month, entry); });
      if (data.mtd) { addRow(data.mtd.date_or_month + " (month to date)", data.mtd); }
      status.hidden = true;
      table.hidden = false;
    })
    .catch(function () {
      status.textContent = "Download listing failed. Try again in a few minutes.";
    });
})();"#;

/// Wraps page content in the shared document shell.
fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title}</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body>\n<main>\n\
{body}\n</main>\n</body>\n</html>\n"
    )
}

/// Renders the download table page for an admitted token.
fn downloads_page(tier: TierId, token: &str) -> String {
    let tier_label = tier.as_str();
    let token_js = serde_json::to_string(token).unwrap_or_else(|_| "\"\"".to_string());
    let body = format!(
        "<h1>Dataset downloads</h1>\n<p>Tier: <strong>{tier_label}</strong></p>\n\
<p id=\"status\">Loading download links.</p>\n\
<table id=\"files\" hidden>\n\
<thead><tr><th>Period</th><th>Size</th><th>Data</th><th>Manifest</th></tr></thead>\n\
<tbody id=\"rows\"></tbody>\n</table>\n\
<script>window.DATAGATE = {{ tier: \"{tier_label}\", token: {token_js} }};</script>\n\
<script>{LISTING_SCRIPT}</script>"
    );
    page_shell("Dataset downloads", &body)
}

/// Renders the access-denied notice.
fn denied_page() -> String {
    page_shell(
        "Access denied",
        "<h1>Access denied</h1>\n<p>The download link for this tier is invalid or has \
rotated. Check the tier's pinned post for the current link.</p>",
    )
}

/// Renders the temporary-outage notice.
fn unavailable_page() -> String {
    page_shell(
        "Temporarily unavailable",
        "<h1>Temporarily unavailable</h1>\n<p>Downloads are temporarily unavailable. \
Try again in a few minutes.</p>",
    )
}

/// Renders the unknown-tier notice.
fn not_found_page() -> String {
    page_shell(
        "Not found",
        "<h1>Not found</h1>\n<p>This download page does not exist.</p>",
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
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

    use datagate_core::TierId;

    use super::denied_page;
    use super::downloads_page;
    use super::not_found_page;
    use super::page_shell;
    use super::unavailable_page;

    /// Verifies the shell embeds the title and body.
    #[test]
    fn page_shell_embeds_title_and_body() {
        let html = page_shell("Hello", "<p>world</p>");
        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains("<p>world</p>"));
        assert!(html.starts_with("<!doctype html>"));
    }

    /// Verifies the download page wires the tier and token into the script
    /// config as a JSON string literal.
    #[test]
    fn downloads_page_embeds_tier_and_escaped_token() {
        let html = downloads_page(TierId::Tier2, "tok\"break");
        assert!(html.contains("Tier: <strong>tier2</strong>"));
        assert!(html.contains("window.DATAGATE = { tier: \"tier2\", token: \"tok\\\"break\" };"));
        assert!(html.contains("/api/downloads/"));
    }

    /// Verifies the static notices carry their calls to action.
    #[test]
    fn static_pages_carry_guidance() {
        assert!(denied_page().contains("pinned post"));
        assert!(unavailable_page().contains("Try again"));
        assert!(not_found_page().contains("does not exist"));
    }
}
