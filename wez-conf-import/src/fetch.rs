//! Fetching externally hosted wezterm.lua files.
//!
//! Supports GitHub blob and raw URLs only: blob URLs are rewritten to
//! raw.githubusercontent.com before fetching. Requests are HTTPS-only,
//! time-limited, and size-capped. No retries: a failed fetch surfaces as a
//! typed error and the caller decides what to do.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Global timeout for fetch operations (30 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum accepted config file size (2 MB). Real wezterm.lua files are a
/// few KB; anything larger is not a config file.
pub const MAX_CONFIG_TEXT_SIZE: u64 = 2 * 1024 * 1024;

/// The only host config files are fetched from.
const RAW_HOST: &str = "raw.githubusercontent.com";

static GITHUB_BLOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://github\.com/([^/]+)/([^/]+)/blob/(.+)$")
        .expect("github-blob regex is a compile-time constant and must be valid")
});

static GITHUB_RAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://raw\.githubusercontent\.com/.+$")
        .expect("github-raw regex is a compile-time constant and must be valid")
});

/// Failure states for a remote fetch, distinguishable by the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL is not a GitHub blob or raw URL, or failed validation.
    #[error("unsupported URL (GitHub blob or raw URLs only): {0}")]
    UnsupportedUrl(String),

    /// The HTTP request failed (DNS, connection, TLS, or non-2xx response).
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body could not be read or exceeded the size limit.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Rewrite a GitHub blob URL to its raw content URL; pass raw URLs through.
///
/// Returns `None` for anything that is not a GitHub file URL.
pub fn to_raw_github(url: &str) -> Option<String> {
    if let Some(caps) = GITHUB_BLOB.captures(url) {
        return Some(format!(
            "https://{}/{}/{}/{}",
            RAW_HOST, &caps[1], &caps[2], &caps[3]
        ));
    }
    if GITHUB_RAW.is_match(url) {
        return Some(url.to_string());
    }
    None
}

/// Validate a rewritten fetch URL: HTTPS scheme and the raw GitHub host.
fn validate_fetch_url(url: &str) -> Result<(), FetchError> {
    let parsed =
        url::Url::parse(url).map_err(|e| FetchError::UnsupportedUrl(format!("{url}: {e}")))?;

    if parsed.scheme() != "https" {
        return Err(FetchError::UnsupportedUrl(format!(
            "insecure scheme '{}' rejected; only HTTPS is allowed: {url}",
            parsed.scheme()
        )));
    }

    if parsed.host_str() != Some(RAW_HOST) {
        return Err(FetchError::UnsupportedUrl(format!(
            "host '{}' is not {RAW_HOST}: {url}",
            parsed.host_str().unwrap_or("")
        )));
    }

    Ok(())
}

/// Create an HTTP agent configured with native-tls and a global timeout.
fn agent() -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(HTTP_TIMEOUT))
        .build()
        .into()
}

/// Fetch a configuration text from a GitHub URL (blob or raw form).
///
/// The URL is rewritten and validated before any network request. The
/// response body is limited to [`MAX_CONFIG_TEXT_SIZE`].
pub fn fetch_config_text(url: &str) -> Result<String, FetchError> {
    let fetch_url =
        to_raw_github(url.trim()).ok_or_else(|| FetchError::UnsupportedUrl(url.to_string()))?;
    validate_fetch_url(&fetch_url)?;

    log::info!("Fetching config from {}", fetch_url);

    let text = agent()
        .get(&fetch_url)
        .header("User-Agent", "wez-conf")
        .call()
        .map_err(|e| FetchError::Transport(format!("{fetch_url}: {e}")))?
        .into_body()
        .with_config()
        .limit(MAX_CONFIG_TEXT_SIZE)
        .read_to_string()
        .map_err(|e| FetchError::Body(format!("{fetch_url}: {e}")))?;

    log::debug!("Fetched {} byte(s) from {}", text.len(), fetch_url);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_url_rewritten() {
        let url = "https://github.com/user/dotfiles/blob/main/wezterm.lua";
        assert_eq!(
            to_raw_github(url).as_deref(),
            Some("https://raw.githubusercontent.com/user/dotfiles/main/wezterm.lua")
        );
    }

    #[test]
    fn test_raw_url_passthrough() {
        let url = "https://raw.githubusercontent.com/user/dotfiles/main/wezterm.lua";
        assert_eq!(to_raw_github(url).as_deref(), Some(url));
    }

    #[test]
    fn test_non_github_url_rejected() {
        assert!(to_raw_github("https://example.com/wezterm.lua").is_none());
        assert!(to_raw_github("https://github.com/user/repo").is_none());
        assert!(to_raw_github("not a url").is_none());
    }

    #[test]
    fn test_validate_rejects_http() {
        let result = validate_fetch_url("http://raw.githubusercontent.com/u/r/main/wezterm.lua");
        assert!(matches!(result, Err(FetchError::UnsupportedUrl(_))));
    }

    #[test]
    fn test_validate_rejects_lookalike_host() {
        let result =
            validate_fetch_url("https://raw.githubusercontent.com.evil.example/wezterm.lua");
        assert!(matches!(result, Err(FetchError::UnsupportedUrl(_))));
    }

    #[test]
    fn test_validate_accepts_raw_host() {
        assert!(validate_fetch_url("https://raw.githubusercontent.com/u/r/main/f.lua").is_ok());
    }

    #[test]
    fn test_unsupported_url_error_path() {
        let err = fetch_config_text("https://example.com/wezterm.lua").unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedUrl(_)));
    }
}
