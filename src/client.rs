//! HTTP client for the access-code validation API.
//!
//! This module provides [`AccessCodeClient`], the client for the remote
//! validation endpoint. Wire-level responses and transport failures are
//! normalized into a single [`ValidationOutcome`], so callers never see the
//! envelope format or reqwest errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::GateConfig;
use crate::error::classify_reqwest_error;
use crate::error::NetworkError;
use crate::models::{ValidationDetails, ValidationOutcome};

/// Rejection reason used when the server does not supply one.
pub const GENERIC_REJECTION: &str = "validation failed";

/// Error type for validation API operations
#[derive(Debug)]
pub enum AccessApiError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// JSON deserialization failed
    Json(serde_json::Error),
    /// Server answered outside the response contract
    ServerError { status: u16, message: String },
}

impl std::fmt::Display for AccessApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessApiError::Http(e) => write!(f, "HTTP error: {}", e),
            AccessApiError::Json(e) => write!(f, "JSON error: {}", e),
            AccessApiError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for AccessApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccessApiError::Http(e) => Some(e),
            AccessApiError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AccessApiError {
    fn from(e: reqwest::Error) -> Self {
        AccessApiError::Http(e)
    }
}

impl From<serde_json::Error> for AccessApiError {
    fn from(e: serde_json::Error) -> Self {
        AccessApiError::Json(e)
    }
}

/// Response envelope returned by the validation endpoint.
///
/// Rejections carry `success: false` and usually an error body; the same
/// envelope is used for both 2xx and rejection statuses.
#[derive(Debug, Clone, Deserialize)]
struct ValidateEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<ValidationData>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

impl ValidateEnvelope {
    /// Displayable rejection reason: the server's message when present,
    /// otherwise the generic fallback.
    fn rejection_reason(self) -> String {
        match self.error {
            Some(body) => {
                if let Some(code) = body.code {
                    tracing::debug!(error_code = %code, "Server rejection carried an error code");
                }
                body.message
                    .unwrap_or_else(|| GENERIC_REJECTION.to_string())
            }
            None => GENERIC_REJECTION.to_string(),
        }
    }
}

/// Payload of a successful validation.
#[derive(Debug, Clone, Deserialize)]
struct ValidationData {
    remaining_usage: u32,
    max_usage: u32,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

impl ValidationData {
    fn into_details(self) -> ValidationDetails {
        ValidationDetails {
            remaining_uses: self.remaining_usage,
            max_usage: self.max_usage,
            expires_at: self.expires_at,
        }
    }
}

/// Error body carried by rejection envelopes.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Trait for the remote validation call.
///
/// Abstracts the network boundary, enabling dependency injection and
/// scripted backends in tests.
#[async_trait]
pub trait ValidationBackend: Send + Sync {
    /// Validate an access code against the backing service.
    async fn validate(&self, code: &str) -> ValidationOutcome;
}

/// Client for the access-code validation API.
pub struct AccessCodeClient {
    /// Base URL for the validation API
    pub base_url: String,
    /// Reusable HTTP client
    client: Client,
    /// Timeout applied to every request
    timeout: Duration,
}

impl AccessCodeClient {
    /// Create a new AccessCodeClient with the default base URL.
    pub fn new() -> Self {
        Self::from_config(&GateConfig::default())
    }

    /// Create a new AccessCodeClient with a custom base URL.
    pub fn with_base_url(base_url: String) -> Self {
        Self::from_config(&GateConfig::default().with_base_url(base_url))
    }

    /// Create a client from a gate configuration.
    pub fn from_config(config: &GateConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: config.base_url.clone(),
            client,
            timeout: config.request_timeout,
        }
    }

    fn validate_url(&self) -> String {
        format!("{}/api/v1/access-codes/validate", self.base_url)
    }

    /// Validate an access code, normalizing every failure mode.
    ///
    /// POST /api/v1/access-codes/validate
    ///
    /// Always produces an outcome: acceptance maps to `Valid`, rejection to
    /// `Invalid`, and transport or response-format trouble to
    /// `NetworkError`. Never errors.
    pub async fn validate(&self, code: &str) -> ValidationOutcome {
        match self.send_validate(code).await {
            Ok(outcome) => outcome,
            Err(AccessApiError::Http(e)) => {
                let classified =
                    classify_reqwest_error(&e, &self.validate_url(), self.timeout.as_secs());
                tracing::warn!(
                    code = classified.error_code(),
                    error = %classified,
                    "Validation request failed in transit"
                );
                ValidationOutcome::NetworkError {
                    message: classified.user_message(),
                }
            }
            Err(err) => {
                // 2xx status with an undecodable or incomplete body
                let classified = NetworkError::InvalidResponse {
                    message: err.to_string(),
                };
                tracing::warn!(
                    code = classified.error_code(),
                    error = %classified,
                    "Validation response malformed"
                );
                ValidationOutcome::NetworkError {
                    message: classified.user_message(),
                }
            }
        }
    }

    /// Send the validation request, surfacing transport and decode
    /// failures as errors and everything the server decided as an outcome.
    async fn send_validate(&self, code: &str) -> Result<ValidationOutcome, AccessApiError> {
        let url = self.validate_url();
        let body = serde_json::json!({ "access_code": code });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Rejection statuses still answer with the standard envelope
            // when the service itself produced them; anything else gets
            // the generic reason.
            let reason = serde_json::from_str::<ValidateEnvelope>(&text)
                .map(|envelope| envelope.rejection_reason())
                .unwrap_or_else(|_| GENERIC_REJECTION.to_string());
            tracing::debug!(status = status.as_u16(), reason = %reason, "Access code rejected");
            return Ok(ValidationOutcome::Invalid { reason });
        }

        let envelope: ValidateEnvelope = serde_json::from_str(&text)?;
        if !envelope.success {
            let reason = envelope.rejection_reason();
            tracing::debug!(reason = %reason, "Access code rejected");
            return Ok(ValidationOutcome::Invalid { reason });
        }

        match envelope.data {
            Some(data) => Ok(ValidationOutcome::Valid(data.into_details())),
            None => Err(AccessApiError::ServerError {
                status: status.as_u16(),
                message: "success response missing data payload".to_string(),
            }),
        }
    }

    /// Check if the validation API is reachable.
    ///
    /// GET /api/v1/health
    ///
    /// # Returns
    /// `true` if the health endpoint returns 200 OK, `false` otherwise
    pub async fn health_check(&self) -> Result<bool, AccessApiError> {
        let url = format!("{}/api/v1/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        Ok(response.status().is_success())
    }
}

impl Default for AccessCodeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValidationBackend for AccessCodeClient {
    async fn validate(&self, code: &str) -> ValidationOutcome {
        AccessCodeClient::validate(self, code).await
    }
}
