use std::env;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_USER_AGENT: &str = concat!("avtable/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const BASE_URL_ENV: &str = "AVTABLE_BASE_URL";
pub const TIMEOUT_MS_ENV: &str = "AVTABLE_TIMEOUT_MS";

/// Client settings that are not part of an individual call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            user_agent: String::from(DEFAULT_USER_AGENT),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `AVTABLE_BASE_URL` and `AVTABLE_TIMEOUT_MS`.
    ///
    /// Empty or unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            env::var(BASE_URL_ENV).ok().as_deref(),
            env::var(TIMEOUT_MS_ENV).ok().as_deref(),
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn with_overrides(mut self, base_url: Option<&str>, timeout_ms: Option<&str>) -> Self {
        if let Some(url) = base_url.map(str::trim).filter(|url| !url.is_empty()) {
            self.base_url = url.trim_end_matches('?').to_owned();
        }
        if let Some(timeout) = timeout_ms
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|timeout| *timeout > 0)
        {
            self.timeout_ms = timeout;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_when_valid() {
        let config = ClientConfig::default()
            .with_overrides(Some("http://127.0.0.1:9000/query?"), Some("2500"));

        assert_eq!(config.base_url, "http://127.0.0.1:9000/query");
        assert_eq!(config.timeout_ms, 2_500);
    }

    #[test]
    fn invalid_overrides_keep_defaults() {
        let config = ClientConfig::default().with_overrides(Some("  "), Some("soon"));
        assert_eq!(config, ClientConfig::default());

        let zero = ClientConfig::default().with_overrides(None, Some("0"));
        assert_eq!(zero.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
