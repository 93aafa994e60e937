//! PKCE (Proof Key for Code Exchange) per RFC 7636
//!
//! The verifier wraps caller-supplied entropy; this module never generates
//! randomness itself. The S256 challenge derived here goes into the
//! authorization URL so the server can later match it against the verifier
//! presented at token-exchange time, proving the exchange request came from
//! the party that initiated the flow.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::codec::base64url;
use crate::error::Error;

/// The only challenge method this crate produces.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// Lower bound on verifier entropy, in bytes.
pub const MIN_ENTROPY: usize = 32;

/// Upper bound on verifier entropy, in bytes.
pub const MAX_ENTROPY: usize = 90;

/// High-entropy per-flow secret, RFC 7636 §4.1.
///
/// Construction validates the entropy length once; everything downstream
/// relies on that check and never re-validates. The encoded payload is
/// zeroized on drop and redacted in Debug output. Generate one per flow
/// from a cryptographic source (32-64 bytes recommended) and discard it
/// after the token exchange.
pub struct CodeVerifier {
    encoded: String,
}

impl CodeVerifier {
    /// Wrap caller-supplied entropy, enforcing RFC 7636 length bounds.
    pub fn from_entropy(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < MIN_ENTROPY || bytes.len() > MAX_ENTROPY {
            return Err(Error::InvalidEntropy(bytes.len()));
        }
        Ok(Self {
            encoded: base64url(bytes),
        })
    }

    /// The wire form: unpadded base64url of the entropy bytes.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl Clone for CodeVerifier {
    fn clone(&self) -> Self {
        Self {
            encoded: self.encoded.clone(),
        }
    }
}

impl Drop for CodeVerifier {
    fn drop(&mut self) {
        self.encoded.zeroize();
    }
}

impl fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeVerifier([REDACTED])")
    }
}

impl fmt::Display for CodeVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// One-way S256 derivation of a verifier.
///
/// `challenge = BASE64URL(SHA256(UTF8(verifier_string)))`. Deterministic:
/// the same verifier always yields the same challenge, which is what lets
/// the server verify the exchange. Nothing recovers a verifier from a
/// challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChallenge {
    encoded: String,
}

impl CodeChallenge {
    pub fn from_verifier(verifier: &CodeVerifier) -> Self {
        let digest = Sha256::digest(verifier.as_str().as_bytes());
        Self {
            encoded: base64url(&digest),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for CodeChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}
