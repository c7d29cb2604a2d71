//! Client configuration.
//!
//! `ClientOptions` is the raw, user-facing option set (defaults, TOML, env).
//! `ClientConfig` is what the client actually runs with: produced once by
//! [`ClientConfig::from_options`] and immutable afterwards.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_BASE_URL: &str = "https://nexus.pixel-services.com";

/// Option set collected by the builder or loaded from TOML/env.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientOptions {
    pub base_url: String,
    pub token: String,
    pub vendor_id: String,
    pub verify_attempts: u32,
    pub verify_delay_ms: u64,
    pub connection_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub enable_logging: bool,
    /// Stored for callers; no data-plane request is retried.
    pub max_retries: u32,
    /// Stored for callers; no data-plane request is retried.
    pub retry_delay_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            vendor_id: String::new(),
            verify_attempts: 5,
            verify_delay_ms: 30_000,
            connection_timeout_ms: 30_000,
            read_timeout_ms: 60_000,
            enable_logging: true,
            max_retries: 3,
            retry_delay_ms: 5_000,
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .field("vendor_id", &self.vendor_id)
            .field("verify_attempts", &self.verify_attempts)
            .field("verify_delay_ms", &self.verify_delay_ms)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .field("enable_logging", &self.enable_logging)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

impl ClientOptions {
    pub fn new(token: impl Into<String>, vendor_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            vendor_id: vendor_id.into(),
            ..Self::default()
        }
    }

    /// Parse options from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| {
            ClientError::validation(format!("invalid client options: {}", e.message()))
        })
    }

    /// Read options from `NEXUS_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::default();
        if let Some(token) = lookup("NEXUS_TOKEN") {
            options.token = token;
        }
        if let Some(vendor_id) = lookup("NEXUS_VENDOR_ID") {
            options.vendor_id = vendor_id;
        }
        if let Some(base_url) = lookup("NEXUS_BASE_URL") {
            options.base_url = base_url;
        }
        if let Some(raw) = lookup("NEXUS_VERIFY_ATTEMPTS") {
            options.verify_attempts = raw.parse().map_err(|_| {
                ClientError::invalid_field("verify attempts must be a number", "verify_attempts", raw)
            })?;
        }
        if let Some(raw) = lookup("NEXUS_VERIFY_DELAY_MS") {
            options.verify_delay_ms = raw.parse().map_err(|_| {
                ClientError::invalid_field("verify delay must be a number", "verify_delay_ms", raw)
            })?;
        }
        Ok(options)
    }
}

/// Validated, immutable client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    token: String,
    vendor_id: String,
    verify_attempts: u32,
    verify_delay: Duration,
    connection_timeout: Duration,
    read_timeout: Duration,
    enable_logging: bool,
    max_retries: u32,
    retry_delay: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .field("vendor_id", &self.vendor_id)
            .field("verify_attempts", &self.verify_attempts)
            .field("verify_delay", &self.verify_delay)
            .field("connection_timeout", &self.connection_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("enable_logging", &self.enable_logging)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

/// Stand-in for a secret in `Debug` output. An empty secret stays empty.
fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

impl ClientConfig {
    /// Validate an option set and freeze it.
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        if options.token.trim().is_empty() {
            return Err(ClientError::invalid_field("token is required", "token", options.token));
        }
        if options.vendor_id.trim().is_empty() {
            return Err(ClientError::invalid_field(
                "vendor id is required",
                "vendor_id",
                options.vendor_id,
            ));
        }
        if options.verify_attempts == 0 {
            return Err(ClientError::invalid_field(
                "at least one verification attempt is required",
                "verify_attempts",
                "0",
            ));
        }

        let parsed = Url::parse(&options.base_url).map_err(|e| {
            ClientError::invalid_field(
                format!("base URL is not a valid absolute URL: {e}"),
                "base_url",
                options.base_url.clone(),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(ClientError::invalid_field(
                "base URL must be an http(s) URL with a host",
                "base_url",
                options.base_url,
            ));
        }

        Ok(Self {
            base_url: options.base_url.trim_end_matches('/').to_string(),
            token: options.token,
            vendor_id: options.vendor_id,
            verify_attempts: options.verify_attempts,
            verify_delay: Duration::from_millis(options.verify_delay_ms),
            connection_timeout: Duration::from_millis(options.connection_timeout_ms),
            read_timeout: Duration::from_millis(options.read_timeout_ms),
            enable_logging: options.enable_logging,
            max_retries: options.max_retries,
            retry_delay: Duration::from_millis(options.retry_delay_ms),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn verify_attempts(&self) -> u32 {
        self.verify_attempts
    }

    pub fn verify_delay(&self) -> Duration {
        self.verify_delay
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn logging_enabled(&self) -> bool {
        self.enable_logging
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = ClientOptions::default();
        assert_eq!(opts.base_url, DEFAULT_BASE_URL);
        assert_eq!(opts.verify_attempts, 5);
        assert_eq!(opts.verify_delay_ms, 30_000);
        assert_eq!(opts.connection_timeout_ms, 30_000);
        assert_eq!(opts.read_timeout_ms, 60_000);
        assert!(opts.enable_logging);
        assert_eq!(opts.max_retries, 3);
        assert_eq!(opts.retry_delay_ms, 5_000);
    }

    #[test]
    fn valid_options_produce_config() {
        let mut opts = ClientOptions::new("tok", "vendor");
        opts.base_url = "http://localhost:8080/".to_string();
        let config = ClientConfig::from_options(opts).unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.token(), "tok");
        assert_eq!(config.vendor_id(), "vendor");
        assert_eq!(config.verify_delay(), Duration::from_secs(30));
        assert_eq!(config.retry_delay(), Duration::from_secs(5));
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = ClientConfig::from_options(ClientOptions::new("  ", "vendor")).unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: Some("token"), .. }));
    }

    #[test]
    fn blank_vendor_id_is_rejected() {
        let err = ClientConfig::from_options(ClientOptions::new("tok", "")).unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: Some("vendor_id"), .. }));
    }

    #[test]
    fn debug_output_redacts_token() {
        let opts = ClientOptions::new("super-secret", "vendor");
        let printed = format!("{opts:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("vendor"));

        let config = ClientConfig::from_options(opts).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let mut opts = ClientOptions::new("tok", "vendor");
        opts.base_url = "/api".to_string();
        let err = ClientConfig::from_options(opts).unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: Some("base_url"), .. }));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let mut opts = ClientOptions::new("tok", "vendor");
        opts.base_url = "ftp://example.com".to_string();
        assert!(ClientConfig::from_options(opts).is_err());
    }

    #[test]
    fn zero_verify_attempts_is_rejected() {
        let mut opts = ClientOptions::new("tok", "vendor");
        opts.verify_attempts = 0;
        assert!(ClientConfig::from_options(opts).is_err());
    }

    #[test]
    fn toml_overrides_selected_keys() {
        let opts = ClientOptions::from_toml_str(
            r#"
            token = "tok"
            vendor_id = "vendor"
            verify_attempts = 2
            verify_delay_ms = 10
            "#,
        )
        .unwrap();
        assert_eq!(opts.verify_attempts, 2);
        assert_eq!(opts.verify_delay_ms, 10);
        assert_eq!(opts.read_timeout_ms, 60_000);
    }

    #[test]
    fn malformed_toml_is_a_validation_error() {
        let err = ClientOptions::from_toml_str("verify_attempts = \"many\"").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn env_lookup_fills_options() {
        let opts = ClientOptions::from_lookup(|key| match key {
            "NEXUS_TOKEN" => Some("tok".to_string()),
            "NEXUS_VENDOR_ID" => Some("vendor".to_string()),
            "NEXUS_VERIFY_ATTEMPTS" => Some("7".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(opts.token, "tok");
        assert_eq!(opts.vendor_id, "vendor");
        assert_eq!(opts.verify_attempts, 7);
        assert_eq!(opts.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn env_lookup_rejects_bad_numbers() {
        let err = ClientOptions::from_lookup(|key| {
            (key == "NEXUS_VERIFY_DELAY_MS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::Validation { field: Some("verify_delay_ms"), .. }));
    }
}
