//! Access code format rules.
//!
//! This module provides the synchronous format gate applied on every edit.
//! Rules run in a fixed order and the first failure wins, so the reported
//! reason is stable for a given input.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Minimum accepted code length in characters.
pub const MIN_CODE_LEN: usize = 6;
/// Maximum accepted code length in characters.
pub const MAX_CODE_LEN: usize = 50;

/// Regex pattern for the accepted access code charset.
/// Letters, digits, underscore, and hyphen only.
static CODE_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid access code regex pattern"));

/// Format rule failure for an access code.
///
/// The display strings are the user-facing reasons and are stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The code is empty or whitespace-only.
    #[error("code required")]
    Required,
    /// The code is shorter than [`MIN_CODE_LEN`] characters.
    #[error("too short")]
    TooShort,
    /// The code is longer than [`MAX_CODE_LEN`] characters.
    #[error("too long")]
    TooLong,
    /// The code contains characters outside the accepted charset.
    #[error("invalid characters")]
    InvalidCharacters,
}

/// Validate an access code against the format rules.
///
/// Rules are checked in order: required, too short, too long, charset.
/// Length is counted in characters, not bytes.
pub fn validate(code: &str) -> Result<(), FormatError> {
    if code.trim().is_empty() {
        return Err(FormatError::Required);
    }

    let len = code.chars().count();
    if len < MIN_CODE_LEN {
        return Err(FormatError::TooShort);
    }
    if len > MAX_CODE_LEN {
        return Err(FormatError::TooLong);
    }

    if !CODE_CHARSET.is_match(code) {
        return Err(FormatError::InvalidCharacters);
    }

    Ok(())
}
