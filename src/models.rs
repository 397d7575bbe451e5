//! Domain types for validation attempts and their results.

use chrono::{DateTime, Utc};
use std::fmt;

/// Identity of a single validation attempt.
///
/// Tokens are minted from a monotonically increasing counter, so a larger
/// token always belongs to a later submission. Results carrying anything
/// other than the controller's current token are superseded and must be
/// discarded; an edit can withdraw the current token entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Create a token from a counter value.
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// The underlying counter value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Usage details returned for an accepted access code.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationDetails {
    /// Uses left on this code
    pub remaining_uses: u32,
    /// Total uses the code was issued with
    pub max_usage: u32,
    /// Expiry timestamp, if the code has one
    pub expires_at: Option<DateTime<Utc>>,
}

impl ValidationDetails {
    /// Check whether the expiry timestamp, if any, has passed.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now(),
            None => false,
        }
    }
}

/// Result of a resolved validation attempt.
///
/// Server rejections and transport failures are normalized into the
/// [`Invalid`](ValidationOutcome::Invalid) and
/// [`NetworkError`](ValidationOutcome::NetworkError) variants before the
/// outcome reaches the caller; no other error channel exists.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The server accepted the code.
    Valid(ValidationDetails),
    /// The server rejected the code, with a displayable reason.
    Invalid { reason: String },
    /// The request never completed; the code's standing is unknown.
    NetworkError { message: String },
}

impl ValidationOutcome {
    /// True only for an accepted code.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}
