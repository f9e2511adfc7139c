//! Groupware backend configuration.

use std::time::Duration;

use chrono_tz::Tz;
use url::Url;

use crate::error::{SourceError, SourceResult};

/// Default REST endpoint of the groupware backend.
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default OAuth helper binary.
pub const DEFAULT_TOKEN_HELPER: &str = "oama";

/// Settings for the groupware REST client.
#[derive(Debug, Clone)]
pub struct GroupwareConfig {
    /// Base URL of the REST endpoint.
    pub base_url: Url,
    /// The account (primary SMTP address) all requests act as.
    pub account: String,
    /// The working timezone query results are converted into.
    pub timezone: Tz,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Name of the external OAuth helper binary.
    pub helper: String,
}

impl GroupwareConfig {
    /// Creates a configuration for the given account with defaults.
    pub fn new(account: impl Into<String>, timezone: Tz) -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("valid default URL"),
            account: account.into(),
            timezone,
            timeout: Duration::from_secs(30),
            helper: DEFAULT_TOKEN_HELPER.to_string(),
        }
    }

    /// Builder method to override the endpoint URL.
    pub fn with_base_url(mut self, url: &str) -> SourceResult<Self> {
        self.base_url = Url::parse(url)
            .map_err(|e| SourceError::configuration(format!("invalid base URL '{url}': {e}")))?;
        Ok(self)
    }

    /// Builder method to override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to override the OAuth helper binary.
    pub fn with_helper(mut self, helper: impl Into<String>) -> Self {
        self.helper = helper.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn defaults() {
        let config = GroupwareConfig::new("me@example.com", Berlin);
        assert_eq!(config.base_url.as_str(), "https://graph.microsoft.com/v1.0");
        assert_eq!(config.account, "me@example.com");
        assert_eq!(config.helper, "oama");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn base_url_override_is_validated() {
        let config = GroupwareConfig::new("me@example.com", Berlin);
        let ok = config.clone().with_base_url("https://gw.corp.example/api");
        assert!(ok.is_ok());

        let err = config.with_base_url("not a url").unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::SourceErrorCode::ConfigurationError
        );
    }
}
