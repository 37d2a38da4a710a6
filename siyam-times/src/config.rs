//! Client configuration with sensible defaults.
//!
//! [`TimesConfig`] controls the service endpoint, request timeout, retry
//! policy and caching. It deserialises from the `[times]` section of the
//! application config file.

use crate::error::TimesError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Public endpoint of the calculation service.
pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com";

/// Configuration for [`crate::TimeServiceClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimesConfig {
    /// Base URL of the service, without a trailing `/v1`.
    pub base_url: String,
    /// Per-request timeout in seconds. A timed-out request counts as a
    /// failed attempt.
    pub timeout_seconds: u64,
    /// Retry policy applied to every request.
    pub retry: RetryPolicy,
    /// Calculation method identifier passed through to the service.
    pub calculation_method: u8,
    /// How long successfully fetched months are cached, in seconds.
    /// Set to 0 to disable caching.
    pub cache_ttl_seconds: u64,
    /// Custom User-Agent header. Defaults to the crate name and version.
    pub user_agent: Option<String>,
}

impl Default for TimesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_seconds: 15,
            retry: RetryPolicy::default(),
            calculation_method: 4,
            cache_ttl_seconds: 6 * 3600,
            user_agent: None,
        }
    }
}

impl TimesConfig {
    /// Config pointing at a different endpoint, otherwise default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` must be an http(s) URL
    /// - `timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), TimesError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TimesError::Config(format!(
                "base_url must start with http:// or https://, got {url:?}"
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(TimesError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub(crate) fn trimmed_base(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}
