//! Error types for the protocol core
//!
//! Construction failures and decode failures are the only hard errors this
//! crate produces. Negative-but-well-formed server responses
//! (`AuthorizationError` / `AuthenticationError`) are ordinary values the
//! caller branches on, never `Err`.

use thiserror::Error;

/// Errors from constructing protocol values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Verifier entropy outside the RFC 7636 byte window.
    #[error("invalid entropy: code verifier requires 32-90 bytes, got {0}")]
    InvalidEntropy(usize),
}

/// Result alias for construction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from decoding a response body.
///
/// A single bad required field fails the whole decode; there is no partial
/// recovery. The reason strings are human-readable and name the field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing or invalid token: token_type and access_token must be non-empty strings")]
    MissingOrInvalidToken,

    #[error("field `{field}`: {reason}")]
    Field { field: String, reason: String },

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),
}

impl DecodeError {
    pub(crate) fn field(name: &str, reason: impl Into<String>) -> Self {
        Self::Field {
            field: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = DecodeError::field("expires_in", "expected a non-negative integer");
        assert_eq!(
            err.to_string(),
            "field `expires_in`: expected a non-negative integer"
        );
    }

    #[test]
    fn invalid_entropy_reports_length() {
        let err = Error::InvalidEntropy(12);
        assert!(err.to_string().contains("got 12"), "got: {err}");
    }
}
