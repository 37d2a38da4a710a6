//! Shared HTTP client construction.
//!
//! Provides a [`reqwest::Client`] with the configured request timeout and
//! a stable User-Agent.

use crate::config::TimesConfig;
use crate::error::TimesError;
use std::time::Duration;

/// User-Agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("siyam-times/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for the calculation service.
///
/// The client has:
/// - Total request timeout from config (connect + response)
/// - JSON `Accept` header
/// - The configured or default User-Agent
///
/// # Errors
///
/// Returns [`TimesError::Config`] if the client cannot be constructed.
pub fn build_client(config: &TimesConfig) -> Result<reqwest::Client, TimesError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .default_headers(headers)
        .build()
        .map_err(|e| TimesError::Config(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&TimesConfig::default()).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = TimesConfig {
            user_agent: Some("SiyamTest/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn default_user_agent_names_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("siyam-times/"));
    }
}
