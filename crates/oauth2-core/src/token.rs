//! Bearer-style token value
//!
//! A token is a (scheme, value) pair reconstructed from the `token_type`
//! and `access_token` response fields. The Display form doubles as a
//! ready-to-use Authorization header value; [`Token::bare`] strips the
//! scheme for transports that need only the raw string (refresh-token body
//! parameters, for one).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A validated (scheme, value) token pair.
///
/// Both sides are guaranteed non-empty; there is no other constructor.
/// This crate never caches or persists tokens — after a successful decode
/// the value belongs to the caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    scheme: String,
    value: String,
}

impl Token {
    /// Build a token from a scheme (e.g. `"Bearer"`) and raw value.
    ///
    /// Yields `None` when either side is empty.
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Option<Self> {
        let scheme = scheme.into();
        let value = value.into();
        if scheme.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self { scheme, value })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The value without scheme or separating space.
    pub fn bare(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.scheme, self.value)
    }
}

impl fmt::Debug for Token {
    // scheme is harmless, the value is not
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({} [REDACTED])", self.scheme)
    }
}
