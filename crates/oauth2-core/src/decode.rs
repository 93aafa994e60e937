//! Token response decoding
//!
//! Field-level decoders over a JSON body, each independently replaceable
//! through [`ResponseDecoders`]. Decoding is strict about required fields
//! and type shape, lenient about absent optional fields: a missing optional
//! field is not an error, a present-but-wrong-typed field always is. A
//! single bad required field fails the whole decode.

use serde_json::{Map, Value};

use crate::codec::{non_empty_str, optional_field, require_field};
use crate::error::DecodeError;
use crate::token::Token;
use crate::types::{AuthenticationError, AuthenticationSuccess, ErrorCode};

/// A single field's decoder, given the whole response object.
pub type FieldDecoder<T> =
    Box<dyn Fn(&Map<String, Value>) -> Result<T, DecodeError> + Send + Sync>;

/// Record of field decoders with RFC 6749 defaults.
///
/// Replace any subset to accommodate servers that deviate from RFC 6749:
///
/// ```
/// use oauth2_core::decode::{self, ResponseDecoders};
///
/// let decoders = ResponseDecoders {
///     scope: Box::new(decode::scope_strict),
///     ..ResponseDecoders::default()
/// };
/// ```
pub struct ResponseDecoders {
    pub token: FieldDecoder<Token>,
    pub refresh_token: FieldDecoder<Option<Token>>,
    pub expires_in: FieldDecoder<Option<u64>>,
    pub scope: FieldDecoder<Vec<String>>,
    pub error: FieldDecoder<ErrorCode>,
    pub error_description: FieldDecoder<Option<String>>,
    pub error_uri: FieldDecoder<Option<String>>,
}

impl Default for ResponseDecoders {
    fn default() -> Self {
        Self {
            token: Box::new(token),
            refresh_token: Box::new(refresh_token),
            expires_in: Box::new(expires_in),
            // lenient by default: servers disagree on the scope field shape
            scope: Box::new(scope_lenient),
            error: Box::new(error),
            error_description: Box::new(error_description),
            error_uri: Box::new(error_uri),
        }
    }
}

/// Default `token` decoder.
///
/// Requires `token_type` and `access_token` to be present, non-empty
/// strings.
pub fn token(obj: &Map<String, Value>) -> Result<Token, DecodeError> {
    let scheme = obj.get("token_type").and_then(non_empty_str);
    let value = obj.get("access_token").and_then(non_empty_str);
    match (scheme, value) {
        (Some(scheme), Some(value)) => {
            Token::new(scheme, value).ok_or(DecodeError::MissingOrInvalidToken)
        }
        _ => Err(DecodeError::MissingOrInvalidToken),
    }
}

/// Default `refresh_token` decoder.
///
/// Absence is not an error; a present field with an invalid shape still
/// fails. The refresh token shares the scheme of the access token.
pub fn refresh_token(obj: &Map<String, Value>) -> Result<Option<Token>, DecodeError> {
    let Some(raw) = obj.get("refresh_token") else {
        return Ok(None);
    };
    let scheme = obj
        .get("token_type")
        .and_then(non_empty_str)
        .ok_or(DecodeError::MissingOrInvalidToken)?;
    let value = non_empty_str(raw).ok_or(DecodeError::MissingOrInvalidToken)?;
    Ok(Token::new(scheme, value))
}

/// Default `expires_in` decoder: optional non-negative integer of seconds.
pub fn expires_in(obj: &Map<String, Value>) -> Result<Option<u64>, DecodeError> {
    optional_field(obj, "expires_in", |value| {
        value
            .as_u64()
            .ok_or_else(|| DecodeError::field("expires_in", "expected a non-negative integer"))
    })
}

/// Strict `scope` decoder: an array of strings, absent meaning empty.
pub fn scope_strict(obj: &Map<String, Value>) -> Result<Vec<String>, DecodeError> {
    optional_field(obj, "scope", scope_from_array).map(Option::unwrap_or_default)
}

/// Lenient `scope` decoder (the default).
///
/// Accepts an array of strings or a single comma-separated string,
/// normalizing both to a list. Absent means empty.
pub fn scope_lenient(obj: &Map<String, Value>) -> Result<Vec<String>, DecodeError> {
    optional_field(obj, "scope", |value| match value {
        Value::String(raw) => Ok(raw
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()),
        Value::Array(_) => scope_from_array(value),
        _ => Err(DecodeError::field(
            "scope",
            "expected an array of strings or a comma-separated string",
        )),
    })
    .map(Option::unwrap_or_default)
}

fn scope_from_array(value: &Value) -> Result<Vec<String>, DecodeError> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::field("scope", "expected an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| DecodeError::field("scope", "expected an array of strings"))
        })
        .collect()
}

/// Default `error` decoder: a required string mapped through [`ErrorCode`].
pub fn error(obj: &Map<String, Value>) -> Result<ErrorCode, DecodeError> {
    require_field(obj, "error", |value| {
        value
            .as_str()
            .map(ErrorCode::from_wire)
            .ok_or_else(|| DecodeError::field("error", "expected a string"))
    })
}

/// Default `error_description` decoder: optional string.
pub fn error_description(obj: &Map<String, Value>) -> Result<Option<String>, DecodeError> {
    optional_string(obj, "error_description")
}

/// Default `error_uri` decoder: optional string.
pub fn error_uri(obj: &Map<String, Value>) -> Result<Option<String>, DecodeError> {
    optional_string(obj, "error_uri")
}

fn optional_string(obj: &Map<String, Value>, name: &str) -> Result<Option<String>, DecodeError> {
    optional_field(obj, name, |value| {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| DecodeError::field(name, "expected a string"))
    })
}

fn as_object(body: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(obj) => Ok(obj),
        _ => Err(DecodeError::InvalidJson("expected a JSON object".into())),
    }
}

/// Decode a success response body into an [`AuthenticationSuccess`].
pub fn authentication_success(
    decoders: &ResponseDecoders,
    body: &[u8],
) -> Result<AuthenticationSuccess, DecodeError> {
    let obj = as_object(body)?;
    Ok(AuthenticationSuccess {
        token: (decoders.token)(&obj)?,
        refresh_token: (decoders.refresh_token)(&obj)?,
        expires_in: (decoders.expires_in)(&obj)?,
        scope: (decoders.scope)(&obj)?,
    })
}

/// Decode an error response body into an [`AuthenticationError`].
pub fn authentication_error(
    decoders: &ResponseDecoders,
    body: &[u8],
) -> Result<AuthenticationError, DecodeError> {
    let obj = as_object(body)?;
    Ok(AuthenticationError {
        error: (decoders.error)(&obj)?,
        error_description: (decoders.error_description)(&obj)?,
        error_uri: (decoders.error_uri)(&obj)?,
    })
}
