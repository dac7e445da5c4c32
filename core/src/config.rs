//! Client configuration: where relative targets are sent.

use crate::error::{ClientError, Result};

/// Environment variable read by `ClientConfig::from_env`.
pub const BASE_URL_ENV: &str = "REST_ENVELOPE_BASE_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Option<String>,
}

impl ClientConfig {
    /// A config with no base URL; every target must be absolute.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    /// Reads the base URL from `REST_ENVELOPE_BASE_URL`, if set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new().with_base_url(url.trim()),
            _ => Self::new(),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Turn a call target into the URL handed to the transport.
    ///
    /// Absolute `http://` / `https://` targets pass through untouched.
    /// Anything else is appended to the base URL with exactly one `/` between.
    pub fn resolve(&self, target: &str) -> Result<String> {
        if is_absolute(target) {
            return Ok(target.to_string());
        }
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| ClientError::InvalidUrl(target.to_string()))?;
        let path = target.trim_start_matches('/');
        if path.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{base}/{path}"))
        }
    }
}

fn is_absolute(target: &str) -> bool {
    let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new().with_base_url("http://localhost:3000/");
        assert_eq!(config.base_url(), Some("http://localhost:3000"));
        assert_eq!(
            config.resolve("/items").unwrap(),
            "http://localhost:3000/items"
        );
    }

    #[test]
    fn relative_target_without_leading_slash() {
        let config = ClientConfig::new().with_base_url("http://localhost:3000/api");
        assert_eq!(
            config.resolve("items/1").unwrap(),
            "http://localhost:3000/api/items/1"
        );
    }

    #[test]
    fn absolute_target_ignores_base() {
        let config = ClientConfig::new().with_base_url("http://localhost:3000");
        assert_eq!(
            config.resolve("https://example.com/x").unwrap(),
            "https://example.com/x"
        );
        assert_eq!(
            ClientConfig::new().resolve("HTTP://example.com").unwrap(),
            "HTTP://example.com"
        );
    }

    #[test]
    fn relative_target_without_base_is_rejected() {
        let err = ClientConfig::new().resolve("/items").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(t) if t == "/items"));
    }

    // Only test that touches REST_ENVELOPE_BASE_URL.
    #[test]
    fn from_env_reads_trimmed_base_url() {
        std::env::set_var(BASE_URL_ENV, "  http://localhost:4000/  ");
        let config = ClientConfig::from_env();
        assert_eq!(config.base_url(), Some("http://localhost:4000"));
        assert_eq!(
            config.resolve("/items").unwrap(),
            "http://localhost:4000/items"
        );

        std::env::set_var(BASE_URL_ENV, "   ");
        assert_eq!(ClientConfig::from_env().base_url(), None);

        std::env::remove_var(BASE_URL_ENV);
        assert_eq!(ClientConfig::from_env(), ClientConfig::new());
    }

    #[test]
    fn empty_path_resolves_to_base() {
        let config = ClientConfig::new().with_base_url("http://localhost:3000");
        assert_eq!(config.resolve("/").unwrap(), "http://localhost:3000");
    }
}
