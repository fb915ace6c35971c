//! Process configuration, read once at startup.

use eyre::Context;
use std::time::Duration;

/// Holds the pre-issued access token. Required.
pub const ACCESS_TOKEN_VAR: &str = "VIMEO_ACCESS_TOKEN";
/// Overrides the API host, e.g. to point at a mock server.
pub const API_BASE_VAR: &str = "VIMEO_API_BASE";
/// Per-request timeout in whole seconds.
pub const TIMEOUT_VAR: &str = "VIMEO_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str = "https://api.vimeo.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Config {
    access_token: String,
    /// Scheme and host of the REST API, without a trailing slash.
    pub api_base: String,
    pub timeout: Duration,
}

// the token must never end up in logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let Some(token) = lookup(ACCESS_TOKEN_VAR).filter(|t| !t.trim().is_empty()) else {
            eyre::bail!("{ACCESS_TOKEN_VAR} must be set to a Vimeo personal access token");
        };
        let mut config = Self::new(token.trim());

        if let Some(base) = lookup(API_BASE_VAR).filter(|b| !b.trim().is_empty()) {
            config = config.with_api_base(base.trim());
        }

        if let Some(secs) = lookup(TIMEOUT_VAR).filter(|s| !s.trim().is_empty()) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("parse {TIMEOUT_VAR}={secs:?} as whole seconds"))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&str, &str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let vars = HashMap::from([(ACCESS_TOKEN_VAR, " abc123 ")]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.access_token(), "abc123");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            (ACCESS_TOKEN_VAR, "abc123"),
            (API_BASE_VAR, "http://127.0.0.1:8080/"),
            (TIMEOUT_VAR, "5"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:8080");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let vars = HashMap::new();
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_snapshot!(err, @"VIMEO_ACCESS_TOKEN must be set to a Vimeo personal access token");

        let vars = HashMap::from([(ACCESS_TOKEN_VAR, "   ")]);
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_bad_timeout() {
        let vars = HashMap::from([(ACCESS_TOKEN_VAR, "abc123"), (TIMEOUT_VAR, "soon")]);
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_snapshot!(err, @r#"parse VIMEO_TIMEOUT_SECS="soon" as whole seconds"#);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config::new("super-secret");
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
