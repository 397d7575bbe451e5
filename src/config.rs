//! Runtime configuration for the validation gate.
//!
//! This module defines [`GateConfig`], built from defaults, the builder
//! methods, or environment variables.

use crate::debounce::DEFAULT_DEBOUNCE_MS;
use std::time::Duration;

/// Default base URL for the validation API.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default HTTP request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the validation gate.
///
/// Use the builder pattern to customize behavior.
///
/// # Example
///
/// ```ignore
/// use codegate::config::GateConfig;
/// use std::time::Duration;
///
/// let config = GateConfig::default()
///     .with_base_url("http://localhost:9000")
///     .with_debounce(Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Base URL of the validation API
    pub base_url: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Quiet window after the last edit before auto-validation fires
    pub debounce: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl GateConfig {
    /// Create a new GateConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the validation API.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Create config from environment variables.
    ///
    /// Reads `CODEGATE_API_URL`, `CODEGATE_TIMEOUT_MS`, and
    /// `CODEGATE_DEBOUNCE_MS`. Unset or malformed values keep the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CODEGATE_API_URL") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }

        if let Ok(raw) = std::env::var("CODEGATE_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => config.request_timeout = Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring malformed CODEGATE_TIMEOUT_MS")
                }
            }
        }

        if let Ok(raw) = std::env::var("CODEGATE_DEBOUNCE_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => config.debounce = Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring malformed CODEGATE_DEBOUNCE_MS")
                }
            }
        }

        config
    }
}
