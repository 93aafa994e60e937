//! Shared wire-format helpers
//!
//! Unpadded base64url encoding (used by both PKCE artifacts), the
//! space-separated scope list form, and the JSON field combinators the
//! decoder pipeline is assembled from.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// RFC 4648 §5 base64url without padding.
pub fn base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Join a scope list into the single space-separated wire form.
///
/// Scope is always one parameter joined with spaces, never repeated keys.
pub fn join_scopes(scopes: &[String]) -> String {
    scopes.join(" ")
}

/// Split a space-separated scope parameter back into a list.
pub fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(' ')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Decode an optional field.
///
/// An absent field yields `None`; a present field that fails `f` is a hard
/// decode error. Missing-optional vs present-but-wrong-typed is the
/// asymmetry the whole pipeline is built on.
pub fn optional_field<T>(
    obj: &Map<String, Value>,
    name: &str,
    f: impl FnOnce(&Value) -> Result<T, DecodeError>,
) -> Result<Option<T>, DecodeError> {
    match obj.get(name) {
        None => Ok(None),
        Some(value) => f(value).map(Some),
    }
}

/// Decode a required field, failing when absent.
pub fn require_field<T>(
    obj: &Map<String, Value>,
    name: &str,
    f: impl FnOnce(&Value) -> Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    match obj.get(name) {
        None => Err(DecodeError::field(name, "missing required field")),
        Some(value) => f(value),
    }
}

/// A string value with at least one character, or `None`.
pub fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn base64url_has_no_padding_or_unsafe_chars() {
        // 1 and 2 trailing bytes both force padding in plain base64
        for input in [&b"any carnal pleasure."[..], &b"any carnal pleasur"[..]] {
            let encoded = base64url(input);
            assert!(
                !encoded.contains('=') && !encoded.contains('+') && !encoded.contains('/'),
                "got: {encoded}"
            );
        }
    }

    #[test]
    fn scopes_roundtrip_through_space_form() {
        let scopes = vec!["read".to_owned(), "write".to_owned()];
        assert_eq!(join_scopes(&scopes), "read write");
        assert_eq!(split_scopes("read write"), scopes);
    }

    #[test]
    fn empty_scope_list_is_empty_both_ways() {
        assert_eq!(join_scopes(&[]), "");
        assert_eq!(split_scopes(""), Vec::<String>::new());
    }

    #[test]
    fn optional_field_absent_is_none() {
        let body = obj(json!({}));
        let result = optional_field(&body, "expires_in", |v| {
            v.as_u64()
                .ok_or_else(|| DecodeError::field("expires_in", "expected integer"))
        });
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn optional_field_wrong_type_fails() {
        let body = obj(json!({"expires_in": "soon"}));
        let result = optional_field(&body, "expires_in", |v| {
            v.as_u64()
                .ok_or_else(|| DecodeError::field("expires_in", "expected integer"))
        });
        assert!(result.is_err());
    }

    #[test]
    fn require_field_absent_fails() {
        let body = obj(json!({}));
        let result = require_field(&body, "error", |v| {
            v.as_str()
                .map(str::to_owned)
                .ok_or_else(|| DecodeError::field("error", "expected string"))
        });
        assert_eq!(
            result,
            Err(DecodeError::field("error", "missing required field"))
        );
    }

    #[test]
    fn non_empty_str_rejects_empty_and_non_strings() {
        assert_eq!(non_empty_str(&json!("Bearer")), Some("Bearer"));
        assert_eq!(non_empty_str(&json!("")), None);
        assert_eq!(non_empty_str(&json!(42)), None);
    }
}
