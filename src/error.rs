//! Network-related error types.
//!
//! This module defines errors for the transport side of validation requests
//! and the classification that turns a raw client error into a displayable
//! network outcome. Server rejections are not errors here; they are handled
//! at the client as ordinary outcomes.

use std::fmt;

/// Network-specific error variants.
#[derive(Debug, Clone)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { url: String, message: String },

    /// DNS resolution failed.
    DnsResolutionFailed { host: String },

    /// Request timed out.
    Timeout { operation: String, duration_secs: u64 },

    /// TLS/SSL error.
    TlsError { message: String },

    /// Invalid response format.
    InvalidResponse { message: String },

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Get a user-friendly error message.
    ///
    /// This is the message carried in a network-error outcome, so it must
    /// make sense on its own in front of a user.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the server. Please check your internet connection.".to_string()
            }
            NetworkError::DnsResolutionFailed { host } => {
                format!(
                    "Could not resolve server address '{}'. Please check your internet connection or DNS settings.",
                    host
                )
            }
            NetworkError::Timeout { operation, duration_secs } => {
                format!(
                    "The {} timed out after {} seconds. The server may be slow or unreachable.",
                    operation, duration_secs
                )
            }
            NetworkError::TlsError { .. } => {
                "A secure connection could not be established. Please check your system's SSL/TLS configuration.".to_string()
            }
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server. Please try again.".to_string()
            }
            NetworkError::Other { message } => {
                format!("Network error: {}", message)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::DnsResolutionFailed { .. } => "E_NET_DNS",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::TlsError { .. } => "E_NET_TLS",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::DnsResolutionFailed { host } => {
                write!(f, "DNS resolution failed for '{}'", host)
            }
            NetworkError::Timeout { operation, duration_secs } => {
                write!(f, "{} timed out after {} seconds", operation, duration_secs)
            }
            NetworkError::TlsError { message } => {
                write!(f, "TLS error: {}", message)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::Other { message } => {
                write!(f, "Network error: {}", message)
            }
        }
    }
}

impl std::error::Error for NetworkError {}

/// Classify a reqwest error into a NetworkError.
///
/// `timeout_secs` is the timeout the client was configured with, used only
/// for the timeout message.
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str, timeout_secs: u64) -> NetworkError {
    if err.is_connect() {
        NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if err.is_timeout() {
        NetworkError::Timeout {
            operation: "validation request".to_string(),
            duration_secs: timeout_secs,
        }
    } else if err.is_decode() {
        NetworkError::InvalidResponse {
            message: format!("Failed to decode response: {}", err),
        }
    } else {
        // Check for TLS and DNS failures in the error text
        let err_str = err.to_string().to_lowercase();
        if err_str.contains("tls") || err_str.contains("ssl") || err_str.contains("certificate") {
            NetworkError::TlsError {
                message: err.to_string(),
            }
        } else if err_str.contains("dns") || err_str.contains("resolve") {
            NetworkError::DnsResolutionFailed {
                host: extract_host_from_url(url),
            }
        } else {
            NetworkError::Other {
                message: err.to_string(),
            }
        }
    }
}

/// Extract the host portion from a URL string.
fn extract_host_from_url(url: &str) -> String {
    let url_lower = url.to_lowercase();
    let without_scheme = if url_lower.starts_with("https://") {
        &url[8..]
    } else if url_lower.starts_with("http://") {
        &url[7..]
    } else {
        url
    };

    without_scheme
        .split(&['/', ':'][..])
        .next()
        .unwrap_or(url)
        .to_string()
}
