// crates/datagate-api/src/links.rs
// ============================================================================
// Module: Download Link Issuance
// Description: Signed and proxy download link construction for listings.
// Purpose: Turn index entries into time-bounded download links.
// Dependencies: datagate-core, datagate-config, tokio
// ============================================================================

//! ## Overview
//! A listing row pairs a data object with its optional manifest. In
//! signed-URL mode both URLs come from the store signer with the configured
//! lifetime and a human-readable suggested filename; in proxy mode they are
//! service-relative download paths echoing the admitted token. The two URLs
//! of a row are independent computations over distinct keys and are signed
//! concurrently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use datagate_config::DeliveryMode;
use datagate_config::DownloadsConfig;
use datagate_core::ObjectStore;
use serde::Serialize;

use crate::error::ApiError;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// One download row in a listing response. Derived per request, never stored.
#[derive(Debug, Serialize)]
pub struct SignedDownloadLink {
    /// Daily date or month the row covers.
    pub date_or_month: String,
    /// Data object size in bytes.
    pub size_bytes: u64,
    /// Time-bounded URL for the data object.
    pub download_url: String,
    /// Time-bounded URL for the manifest object, when one is published.
    pub manifest_url: Option<String>,
}

// ============================================================================
// SECTION: Issuer
// ============================================================================

/// Builds download links for one admitted request.
pub struct LinkIssuer<'a> {
    /// Backing object store used for URL signing.
    store: &'a dyn ObjectStore,
    /// Download issuance configuration.
    downloads: &'a DownloadsConfig,
    /// Admitted token echoed into proxy-mode links.
    token: &'a str,
}

impl<'a> LinkIssuer<'a> {
    /// Creates an issuer for one request.
    #[must_use]
    pub const fn new(
        store: &'a dyn ObjectStore,
        downloads: &'a DownloadsConfig,
        token: &'a str,
    ) -> Self {
        Self {
            store,
            downloads,
            token,
        }
    }

    /// Builds one listing row from an index entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when URL issuance fails.
    pub async fn issue(
        &self,
        date_or_month: &str,
        data_key: &str,
        manifest_key: Option<&str>,
        size_bytes: u64,
    ) -> Result<SignedDownloadLink, ApiError> {
        let (download_url, manifest_url) =
            tokio::try_join!(self.url_for(data_key), self.optional_url(manifest_key))?;
        Ok(SignedDownloadLink {
            date_or_month: date_or_month.to_string(),
            size_bytes,
            download_url,
            manifest_url,
        })
    }

    /// Builds the download URL for one object key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when URL issuance fails.
    pub(crate) async fn url_for(&self, key: &str) -> Result<String, ApiError> {
        match self.downloads.delivery {
            DeliveryMode::SignedUrl => self
                .store
                .sign_get(key, self.downloads.url_ttl(), Some(&suggested_filename(key)))
                .await
                .map_err(ApiError::from_store),
            DeliveryMode::Proxy => Ok(self.proxy_url(key)),
        }
    }

    /// Builds the download URL for an optional object key.
    async fn optional_url(&self, key: Option<&str>) -> Result<Option<String>, ApiError> {
        match key {
            Some(key) => Ok(Some(self.url_for(key).await?)),
            None => Ok(None),
        }
    }

    /// Builds a service-relative proxy URL for one object key.
    fn proxy_url(&self, key: &str) -> String {
        let base = self.downloads.public_base_url.as_deref().unwrap_or_default();
        let base = base.strip_suffix('/').unwrap_or(base);
        format!("{base}/api/download/{key}?token={}", self.token)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the media type for an object key by file extension.
#[must_use]
pub fn content_type_for_key(key: &str) -> &'static str {
    if key.ends_with(".parquet") {
        "application/vnd.apache.parquet"
    } else if key.ends_with(".json") {
        "application/json"
    } else {
        "application/octet-stream"
    }
}

/// Returns the final path segment of an object key.
#[must_use]
pub fn filename_segment(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Derives a human-readable filename from an object key.
#[must_use]
pub fn suggested_filename(key: &str) -> String {
    header_safe(&key.replace('/', "-"))
}

/// Strips characters that cannot appear in a quoted header value.
#[must_use]
pub fn header_safe(value: &str) -> String {
    value.chars().filter(|c| !c.is_control() && *c != '"' && *c != '\\').collect()
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

    use datagate_config::DeliveryMode;
    use datagate_config::DownloadsConfig;
    use datagate_core::MemoryObjectStore;

    use super::LinkIssuer;
    use super::content_type_for_key;
    use super::filename_segment;
    use super::header_safe;
    use super::suggested_filename;

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(
            content_type_for_key("tier1/daily/2026-01-27/data.parquet"),
            "application/vnd.apache.parquet"
        );
        assert_eq!(
            content_type_for_key("tier1/daily/2026-01-27/manifest.json"),
            "application/json"
        );
        assert_eq!(content_type_for_key("tier1/daily/2026-01-27/data.bin"), "application/octet-stream");
    }

    #[test]
    fn suggested_filename_flattens_key() {
        assert_eq!(
            suggested_filename("tier1/daily/2026-01-27/data.parquet"),
            "tier1-daily-2026-01-27-data.parquet"
        );
    }

    #[test]
    fn filename_segment_is_last_component() {
        assert_eq!(filename_segment("tier1/mtd/2026-01/data.parquet"), "data.parquet");
        assert_eq!(filename_segment("data.parquet"), "data.parquet");
    }

    #[test]
    fn header_safe_strips_quotes_and_controls() {
        assert_eq!(header_safe("a\"b\\c\r\nd"), "abcd");
    }

    /// Verifies signed-mode rows sign data and manifest with the lifetime.
    #[tokio::test]
    async fn signed_mode_issues_store_urls() {
        let store = MemoryObjectStore::new();
        let downloads = DownloadsConfig::default();
        let issuer = LinkIssuer::new(&store, &downloads, "unused");

        let link = issuer
            .issue(
                "2026-01-27",
                "tier1/daily/2026-01-27/data.parquet",
                Some("tier1/daily/2026-01-27/manifest.json"),
                194_596,
            )
            .await
            .unwrap();
        assert_eq!(link.date_or_month, "2026-01-27");
        assert_eq!(link.size_bytes, 194_596);
        assert!(link.download_url.contains("tier1/daily/2026-01-27/data.parquet"));
        assert!(link.download_url.contains("expires_in=590400"));
        assert!(
            link.download_url.contains("filename=tier1-daily-2026-01-27-data.parquet"),
            "unexpected url: {}",
            link.download_url
        );
        let manifest_url = link.manifest_url.unwrap();
        assert!(manifest_url.contains("tier1/daily/2026-01-27/manifest.json"));
    }

    /// Verifies rows without a manifest key carry a null manifest URL.
    #[tokio::test]
    async fn signed_mode_skips_absent_manifest() {
        let store = MemoryObjectStore::new();
        let downloads = DownloadsConfig::default();
        let issuer = LinkIssuer::new(&store, &downloads, "unused");

        let link = issuer
            .issue("2026-01-27", "tier1/daily/2026-01-27/data.parquet", None, 194_596)
            .await
            .unwrap();
        assert!(link.manifest_url.is_none());
    }

    /// Verifies proxy-mode rows are service-relative and echo the token.
    #[tokio::test]
    async fn proxy_mode_builds_service_urls() {
        let store = MemoryObjectStore::new();
        let downloads = DownloadsConfig {
            delivery: DeliveryMode::Proxy,
            public_base_url: Some("https://data.example.com/".to_string()),
            ..DownloadsConfig::default()
        };
        let issuer = LinkIssuer::new(&store, &downloads, "tok_abc");

        let link = issuer
            .issue(
                "2026-01",
                "tier2/mtd/2026-01/data.parquet",
                Some("tier2/mtd/2026-01/manifest.json"),
                1_048_576,
            )
            .await
            .unwrap();
        assert_eq!(
            link.download_url,
            "https://data.example.com/api/download/tier2/mtd/2026-01/data.parquet?token=tok_abc"
        );
        assert_eq!(
            link.manifest_url.as_deref(),
            Some(
                "https://data.example.com/api/download/tier2/mtd/2026-01/manifest.json?token=tok_abc"
            )
        );
    }
}
