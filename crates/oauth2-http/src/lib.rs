//! reqwest-backed transport for built request descriptions
//!
//! The protocol core builds immutable `RequestParts`; this crate performs
//! them. One send per call — no retries, no refresh policy, that belongs to
//! the caller. A non-success status whose body is a well-formed RFC 6749
//! error response surfaces as [`ExecuteError::Protocol`] so callers can
//! branch on the server's verdict; anything else is a transport or decode
//! failure.

use oauth2_core::decode::{self, ResponseDecoders};
use oauth2_core::request::{Method, RequestParts};
use oauth2_core::types::AuthenticationError;
use thiserror::Error;
use tracing::debug;

/// Errors from executing a request.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Well-formed RFC 6749 error response from the server. An expected,
    /// successfully-parsed outcome, carried on the error side so the happy
    /// path stays typed.
    #[error("server returned {}", .0.error)]
    Protocol(AuthenticationError),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decoding response: {0}")]
    Decode(#[from] oauth2_core::DecodeError),
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, ExecuteError>;

/// Execute a built request once and decode the response.
///
/// The timeout hint on the parts, when present, is applied per-request on
/// top of whatever the client is configured with.
pub async fn execute<T>(client: &reqwest::Client, parts: RequestParts<T>) -> Result<T> {
    let mut request = match parts.method {
        Method::Get => client.get(parts.url.as_str()),
        Method::Post => client.post(parts.url.as_str()).body(parts.body.clone()),
    };
    for (name, value) in &parts.headers {
        request = request.header(name, value);
    }
    if let Some(timeout) = parts.timeout {
        request = request.timeout(timeout);
    }

    debug!(method = parts.method.as_str(), url = %parts.url, "executing request");

    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?;

    decode_response(status, &body, &parts)
}

/// Route a response by status. Split from [`execute`] so the routing logic
/// is testable without a socket.
fn decode_response<T>(status: u16, body: &[u8], parts: &RequestParts<T>) -> Result<T> {
    if (200..300).contains(&status) {
        return Ok((parts.decoder)(body)?);
    }

    if let Ok(err) = decode::authentication_error(&ResponseDecoders::default(), body) {
        debug!(status, code = err.error.as_str(), "server returned protocol error");
        return Err(ExecuteError::Protocol(err));
    }

    Err(ExecuteError::Status {
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}
