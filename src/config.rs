//! API client configuration resolved once at startup.
//!
//! The browser has no process environment, so overrides are captured at
//! build time:
//! - `PORTAL_API_BASE_URL`: default `http://localhost:6033/api`
//! - `PORTAL_API_TIMEOUT_MS`: default 10000
//! - `PORTAL_API_REFRESH_ON_401`: `true`/`1` enables refresh-and-retry

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:6033/api";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// What the client does when a request comes back 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Surface the 401 to the caller.
    #[default]
    Disabled,
    /// Refresh the token once (single-flight) and re-send the request once.
    RetryOnce,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base endpoint without a trailing `/`.
    pub base_url: String,
    /// Budget shared by every request.
    pub timeout: Duration,
    pub refresh: RefreshPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_overrides(None, None, None)
    }
}

impl ApiConfig {
    /// Build from the overrides baked in at compile time.
    pub fn from_build_env() -> Self {
        Self::from_overrides(
            option_env!("PORTAL_API_BASE_URL"),
            option_env!("PORTAL_API_TIMEOUT_MS"),
            option_env!("PORTAL_API_REFRESH_ON_401"),
        )
    }

    /// Build from optional raw override values, falling back to defaults for
    /// blank or unparsable input.
    pub fn from_overrides(base_url: Option<&str>, timeout_ms: Option<&str>, refresh: Option<&str>) -> Self {
        let base_url = base_url
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_owned();
        let timeout_ms = timeout_ms
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        Self { base_url, timeout: Duration::from_millis(timeout_ms), refresh: parse_refresh(refresh) }
    }

    /// Absolute URL for `path` (leading `/` optional).
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn parse_refresh(raw: Option<&str>) -> RefreshPolicy {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1" | "yes") => RefreshPolicy::RetryOnce,
        _ => RefreshPolicy::Disabled,
    }
}
