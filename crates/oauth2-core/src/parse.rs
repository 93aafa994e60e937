//! Redirect-back query classification
//!
//! Splits a redirect URL's query into decoded (name, value) pairs and
//! classifies it as Empty, Success, or Error. Field parsers are
//! individually replaceable through [`QueryParsers`]. Code presence is
//! checked before error presence, so a malformed redirect carrying both
//! classifies as Success — that precedence is load-bearing for
//! interoperability and must not change.

use tracing::debug;
use url::Url;

use crate::types::{AuthorizationError, AuthorizationResult, AuthorizationSuccess, ErrorCode};

/// Decoded query pairs from a redirect URL.
pub struct QueryPairs {
    pairs: Vec<(String, String)>,
}

impl QueryPairs {
    pub fn from_url(url: &Url) -> Self {
        Self {
            pairs: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// First value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// A single field's parser, given the whole query.
pub type FieldParser<T> = Box<dyn Fn(&QueryPairs) -> T + Send + Sync>;

/// Record of field parsers with RFC 6749 defaults.
///
/// Replace any subset to accommodate servers that deviate from RFC 6749;
/// the rest keep their default behavior.
pub struct QueryParsers {
    pub code: FieldParser<Option<String>>,
    pub error: FieldParser<Option<ErrorCode>>,
    pub state: FieldParser<Option<String>>,
    pub error_description: FieldParser<Option<String>>,
    pub error_uri: FieldParser<Option<String>>,
}

impl Default for QueryParsers {
    fn default() -> Self {
        Self {
            code: Box::new(|q| q.get("code").map(str::to_owned)),
            // unrecognized codes fall back to ErrorCode::Other, never a failure
            error: Box::new(|q| q.get("error").map(ErrorCode::from_wire)),
            state: Box::new(|q| q.get("state").map(str::to_owned)),
            error_description: Box::new(|q| q.get("error_description").map(str::to_owned)),
            error_uri: Box::new(|q| q.get("error_uri").map(str::to_owned)),
        }
    }
}

/// Classify a redirect URL with the default parsers.
pub fn classify(url: &Url) -> AuthorizationResult {
    classify_with(&QueryParsers::default(), url)
}

/// Classify a redirect URL: code → Success, else error → Error, else Empty.
pub fn classify_with(parsers: &QueryParsers, url: &Url) -> AuthorizationResult {
    let query = QueryPairs::from_url(url);

    if let Some(code) = (parsers.code)(&query) {
        debug!(outcome = "success", "classified redirect");
        return AuthorizationResult::Success(AuthorizationSuccess {
            code,
            state: (parsers.state)(&query),
        });
    }

    if let Some(error) = (parsers.error)(&query) {
        debug!(outcome = "error", code = error.as_str(), "classified redirect");
        return AuthorizationResult::Error(AuthorizationError {
            error,
            error_description: (parsers.error_description)(&query),
            error_uri: (parsers.error_uri)(&query),
            state: (parsers.state)(&query),
        });
    }

    debug!(outcome = "empty", "classified redirect");
    AuthorizationResult::Empty
}
