//! OAuth 2.0 client protocol core (RFC 6749 + RFC 7636)
//!
//! Pure request-building and response-parsing machinery for the
//! authorization-code, PKCE, and refresh-token grants. Nothing in this
//! crate performs I/O: the builder produces an immutable [`RequestParts`]
//! that any HTTP-capable collaborator can execute (the companion
//! `oauth2-http` crate provides a reqwest-backed one), and the decoder and
//! parser pipelines turn raw bodies and redirect URLs into typed results.
//!
//! Flow:
//! 1. `request::authorization_url()` builds the URL the user agent visits
//! 2. `parse::classify()` turns the redirect back into Empty / Success / Error
//! 3. `request::token_request()` builds the code exchange (or refresh)
//! 4. the transport executes it; the `decode` pipeline produces an
//!    `AuthenticationSuccess` or `AuthenticationError`

pub mod codec;
pub mod decode;
pub mod error;
pub mod parse;
pub mod pkce;
pub mod request;
pub mod secret;
pub mod token;
pub mod types;

pub use decode::ResponseDecoders;
pub use error::{DecodeError, Error};
pub use parse::{QueryPairs, QueryParsers, classify, classify_with};
pub use pkce::{CodeChallenge, CodeVerifier};
pub use request::{
    BodyDecoder, Method, RequestParts, authorization_url, token_request, token_request_with,
};
pub use secret::Secret;
pub use token::Token;
pub use types::{
    Authentication, AuthenticationError, AuthenticationSuccess, Authorization, AuthorizationError,
    AuthorizationResult, AuthorizationSuccess, Credentials, ErrorCode, Grant,
};
