//! Request configurations and flow results
//!
//! Every configuration here is an independent immutable value built by the
//! caller per flow attempt; concurrent flows share nothing.

use std::fmt;

use url::Url;

use crate::pkce::CodeVerifier;
use crate::secret::Secret;
use crate::token::Token;

/// Client identification for the token endpoint.
///
/// A present secret switches Basic authentication on (confidential
/// client); absent means a public client and no Authorization header.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub secret: Option<Secret>,
}

/// Configuration for one authorization request.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub client_id: String,
    /// The authorization endpoint. Any query already on it is kept.
    pub url: Url,
    pub redirect_uri: Url,
    pub scope: Vec<String>,
    /// Opaque CSRF value, returned unchanged in the redirect back.
    pub state: Option<String>,
}

/// Configuration for one token-exchange attempt.
#[derive(Debug, Clone)]
pub struct Authentication {
    pub credentials: Credentials,
    /// The token endpoint.
    pub url: Url,
    pub redirect_uri: Url,
    pub scope: Vec<String>,
}

/// Grant-specific material for the token request body.
#[derive(Debug, Clone)]
pub enum Grant {
    AuthorizationCode {
        code: String,
    },
    /// Authorization-code grant carrying the PKCE verifier from the start
    /// of the flow.
    AuthorizationCodePkce {
        code: String,
        verifier: CodeVerifier,
    },
    RefreshToken {
        token: Token,
    },
}

impl Grant {
    pub fn grant_type(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode { .. } | Grant::AuthorizationCodePkce { .. } => {
                "authorization_code"
            }
            Grant::RefreshToken { .. } => "refresh_token",
        }
    }
}

/// Classification of a redirect-back URL's query string.
///
/// Always exactly one variant; a query carrying both `code` and `error`
/// classifies as `Success` because code presence is checked first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    /// No OAuth parameters present (e.g. a first page load).
    Empty,
    Error(AuthorizationError),
    Success(AuthorizationSuccess),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationSuccess {
    pub code: String,
    pub state: Option<String>,
}

/// RFC 6749 §4.1.2.1 error response to an authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationError {
    pub error: ErrorCode,
    pub error_description: Option<String>,
    pub error_uri: Option<String>,
    pub state: Option<String>,
}

/// RFC 6749 §5.2 error response from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationError {
    pub error: ErrorCode,
    pub error_description: Option<String>,
    pub error_uri: Option<String>,
}

/// Decoded success response from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationSuccess {
    pub token: Token,
    pub refresh_token: Option<Token>,
    /// Delta in seconds from the response time, not an absolute instant.
    pub expires_in: Option<u64>,
    pub scope: Vec<String>,
}

/// RFC 6749 error identifiers (§4.1.2.1 and §5.2 combined), with a
/// fallback for the nonstandard values real servers send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    AccessDenied,
    UnsupportedResponseType,
    UnsupportedGrantType,
    InvalidScope,
    ServerError,
    TemporarilyUnavailable,
    /// Unrecognized code, preserved verbatim so callers can still inspect
    /// the raw value.
    Other(String),
}

impl ErrorCode {
    /// Map a wire value to a code. Never fails.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "invalid_request" => Self::InvalidRequest,
            "invalid_client" => Self::InvalidClient,
            "invalid_grant" => Self::InvalidGrant,
            "unauthorized_client" => Self::UnauthorizedClient,
            "access_denied" => Self::AccessDenied,
            "unsupported_response_type" => Self::UnsupportedResponseType,
            "unsupported_grant_type" => Self::UnsupportedGrantType,
            "invalid_scope" => Self::InvalidScope,
            "server_error" => Self::ServerError,
            "temporarily_unavailable" => Self::TemporarilyUnavailable,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_roundtrip() {
        for raw in [
            "invalid_request",
            "invalid_client",
            "invalid_grant",
            "unauthorized_client",
            "access_denied",
            "unsupported_response_type",
            "unsupported_grant_type",
            "invalid_scope",
            "server_error",
            "temporarily_unavailable",
        ] {
            let code = ErrorCode::from_wire(raw);
            assert!(!matches!(code, ErrorCode::Other(_)), "unrecognized: {raw}");
            assert_eq!(code.as_str(), raw);
        }
    }

    #[test]
    fn unknown_code_is_preserved_verbatim() {
        let code = ErrorCode::from_wire("slow_down");
        assert_eq!(code, ErrorCode::Other("slow_down".into()));
        assert_eq!(code.as_str(), "slow_down");
    }

    #[test]
    fn grant_type_names() {
        let pkce = Grant::AuthorizationCodePkce {
            code: "c".into(),
            verifier: crate::pkce::CodeVerifier::from_entropy(&[0u8; 32]).unwrap(),
        };
        assert_eq!(pkce.grant_type(), "authorization_code");

        let refresh = Grant::RefreshToken {
            token: Token::new("Bearer", "rt").unwrap(),
        };
        assert_eq!(refresh.grant_type(), "refresh_token");
    }
}
