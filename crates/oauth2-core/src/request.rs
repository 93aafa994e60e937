//! Outbound request construction
//!
//! Builds the authorization URL and the token-exchange request description.
//! Nothing here performs I/O: a built [`RequestParts`] is an immutable,
//! transport-agnostic value handed to a collaborator (the `oauth2-http`
//! crate, or anything else HTTP-capable) for execution. Every dynamic value
//! destined for a URL or body is form-encoded exactly once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use url::Url;

use crate::codec::join_scopes;
use crate::decode::{self, ResponseDecoders};
use crate::error::DecodeError;
use crate::pkce::{CODE_CHALLENGE_METHOD, CodeChallenge};
use crate::types::{Authentication, AuthenticationSuccess, Authorization, Credentials, Grant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Decoder from raw response body bytes to the expected value.
pub type BodyDecoder<T> = Arc<dyn Fn(&[u8]) -> Result<T, DecodeError> + Send + Sync>;

/// Fully-specified, transport-agnostic request description.
///
/// Immutable once built; any HTTP-capable collaborator can execute it. The
/// timeout is a hint carried through to the transport, not enforced here.
pub struct RequestParts<T> {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub url: Url,
    pub body: String,
    pub decoder: BodyDecoder<T>,
    pub timeout: Option<Duration>,
}

impl<T> RequestParts<T> {
    /// Attach a timeout hint for the transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl<T> Clone for RequestParts<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            headers: self.headers.clone(),
            url: self.url.clone(),
            body: self.body.clone(),
            decoder: Arc::clone(&self.decoder),
            timeout: self.timeout,
        }
    }
}

impl<T> fmt::Debug for RequestParts<T> {
    // body and headers can carry secrets, keep them out of Debug
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestParts")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Build the authorization redirect URL.
///
/// Appends to any query already on the endpoint rather than replacing it.
/// When a challenge is supplied, `code_challenge` and
/// `code_challenge_method=S256` are merged last, so they win ties against
/// `extra_fields`. Pure; no failure mode.
pub fn authorization_url(
    response_type: &str,
    extra_fields: &[(String, String)],
    authorization: &Authorization,
    challenge: Option<&CodeChallenge>,
) -> Url {
    let mut params: Vec<(String, String)> = vec![
        ("client_id".into(), authorization.client_id.clone()),
        (
            "redirect_uri".into(),
            serialize_redirect_uri(&authorization.redirect_uri),
        ),
        ("response_type".into(), response_type.to_owned()),
    ];
    if !authorization.scope.is_empty() {
        params.push(("scope".into(), join_scopes(&authorization.scope)));
    }
    if let Some(state) = &authorization.state {
        params.push(("state".into(), state.clone()));
    }
    params.extend(extra_fields.iter().cloned());
    if let Some(challenge) = challenge {
        params.retain(|(name, _)| name != "code_challenge" && name != "code_challenge_method");
        params.push(("code_challenge".into(), challenge.as_str().to_owned()));
        params.push(("code_challenge_method".into(), CODE_CHALLENGE_METHOD.into()));
    }

    let mut url = authorization.url.clone();
    url.query_pairs_mut().extend_pairs(params);
    url
}

/// Build a token-endpoint request with the default response decoders.
pub fn token_request(
    grant: &Grant,
    authentication: &Authentication,
    extra_fields: &[(String, String)],
) -> RequestParts<AuthenticationSuccess> {
    token_request_with(
        grant,
        authentication,
        extra_fields,
        ResponseDecoders::default(),
        |success| success,
    )
}

/// Build a token-endpoint request with caller-supplied decoders and a
/// mapper re-shaping the decoded success value.
pub fn token_request_with<T: 'static>(
    grant: &Grant,
    authentication: &Authentication,
    extra_fields: &[(String, String)],
    decoders: ResponseDecoders,
    map: impl Fn(AuthenticationSuccess) -> T + Send + Sync + 'static,
) -> RequestParts<T> {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    form.append_pair("grant_type", grant.grant_type());
    match grant {
        Grant::AuthorizationCode { code } => {
            form.append_pair("code", code);
            form.append_pair(
                "redirect_uri",
                &serialize_redirect_uri(&authentication.redirect_uri),
            );
        }
        Grant::AuthorizationCodePkce { code, verifier } => {
            form.append_pair("code", code);
            form.append_pair(
                "redirect_uri",
                &serialize_redirect_uri(&authentication.redirect_uri),
            );
            form.append_pair("code_verifier", verifier.as_str());
        }
        Grant::RefreshToken { token } => {
            form.append_pair("refresh_token", token.bare());
        }
    }
    if !authentication.scope.is_empty() {
        form.append_pair("scope", &join_scopes(&authentication.scope));
    }
    for (name, value) in extra_fields {
        form.append_pair(name, value);
    }
    let body = form.finish();

    let mut headers = vec![(
        "Content-Type".to_owned(),
        "application/x-www-form-urlencoded".to_owned(),
    )];
    if let Some(header) = basic_auth(&authentication.credentials) {
        headers.push(("Authorization".to_owned(), header));
    }

    debug!(
        grant_type = grant.grant_type(),
        url = %authentication.url,
        "built token request"
    );

    let decoder: BodyDecoder<T> = Arc::new(move |bytes| {
        decode::authentication_success(&decoders, bytes).map(&map)
    });

    RequestParts {
        method: Method::Post,
        headers,
        url: authentication.url.clone(),
        body,
        decoder,
        timeout: None,
    }
}

/// `Basic base64(client_id:secret)`, present only for confidential clients.
fn basic_auth(credentials: &Credentials) -> Option<String> {
    let secret = credentials.secret.as_ref()?;
    let raw = format!("{}:{}", credentials.client_id, secret.expose());
    Some(format!("Basic {}", STANDARD.encode(raw)))
}

/// Re-serialize a redirect URI to its exact
/// `scheme://host[:port]path[?query]` form, dropping any fragment.
fn serialize_redirect_uri(url: &Url) -> String {
    let mut out = format!("{}://", url.scheme());
    if let Some(host) = url.host_str() {
        out.push_str(host);
    }
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(url.path());
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::split_scopes;
    use crate::pkce::CodeVerifier;
    use crate::secret::Secret;
    use crate::token::Token;

    fn authorization() -> Authorization {
        Authorization {
            client_id: "abc".into(),
            url: Url::parse("https://provider.example/authorize").unwrap(),
            redirect_uri: Url::parse("https://app.example/callback").unwrap(),
            scope: vec!["a".into(), "b".into()],
            state: Some("s1".into()),
        }
    }

    fn authentication(secret: Option<Secret>) -> Authentication {
        Authentication {
            credentials: Credentials {
                client_id: "c".into(),
                secret,
            },
            url: Url::parse("https://provider.example/token").unwrap(),
            redirect_uri: Url::parse("https://app.example/callback").unwrap(),
            scope: vec![],
        }
    }

    fn query_value(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    fn body_value(body: &str, name: &str) -> Option<String> {
        url::form_urlencoded::parse(body.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn authorization_url_carries_required_params() {
        let url = authorization_url("code", &[], &authorization(), None);
        assert_eq!(query_value(&url, "client_id").as_deref(), Some("abc"));
        assert_eq!(query_value(&url, "response_type").as_deref(), Some("code"));
        assert_eq!(
            query_value(&url, "redirect_uri").as_deref(),
            Some("https://app.example/callback")
        );
        assert_eq!(query_value(&url, "state").as_deref(), Some("s1"));
    }

    #[test]
    fn scope_is_one_space_joined_parameter() {
        let url = authorization_url("code", &[], &authorization(), None);
        let raw = query_value(&url, "scope").unwrap();
        assert_eq!(raw, "a b");
        assert_eq!(split_scopes(&raw), vec!["a", "b"]);
        // single parameter, never repeated keys
        assert_eq!(url.query_pairs().filter(|(k, _)| k == "scope").count(), 1);
    }

    #[test]
    fn empty_scope_and_absent_state_are_omitted() {
        let mut config = authorization();
        config.scope = vec![];
        config.state = None;
        let url = authorization_url("code", &[], &config, None);
        assert_eq!(query_value(&url, "scope"), None);
        assert_eq!(query_value(&url, "state"), None);
    }

    #[test]
    fn existing_endpoint_query_is_kept() {
        let mut config = authorization();
        config.url = Url::parse("https://provider.example/authorize?audience=api").unwrap();
        let url = authorization_url("code", &[], &config, None);
        assert_eq!(query_value(&url, "audience").as_deref(), Some("api"));
        assert_eq!(query_value(&url, "client_id").as_deref(), Some("abc"));
    }

    #[test]
    fn pkce_variant_appends_challenge_and_method() {
        let verifier = CodeVerifier::from_entropy(&[7u8; 32]).unwrap();
        let challenge = CodeChallenge::from_verifier(&verifier);
        let url = authorization_url("code", &[], &authorization(), Some(&challenge));
        assert_eq!(
            query_value(&url, "code_challenge").as_deref(),
            Some(challenge.as_str())
        );
        assert_eq!(
            query_value(&url, "code_challenge_method").as_deref(),
            Some("S256")
        );
    }

    #[test]
    fn pkce_fields_win_ties_against_extra_fields() {
        let verifier = CodeVerifier::from_entropy(&[7u8; 32]).unwrap();
        let challenge = CodeChallenge::from_verifier(&verifier);
        let extra = vec![("code_challenge".to_owned(), "forged".to_owned())];
        let url = authorization_url("code", &extra, &authorization(), Some(&challenge));

        let values: Vec<String> = url
            .query_pairs()
            .filter(|(k, _)| k == "code_challenge")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(values, vec![challenge.as_str().to_owned()]);
    }

    #[test]
    fn extra_fields_are_appended() {
        let extra = vec![("prompt".to_owned(), "consent".to_owned())];
        let url = authorization_url("code", &extra, &authorization(), None);
        assert_eq!(query_value(&url, "prompt").as_deref(), Some("consent"));
    }

    #[test]
    fn token_request_is_a_form_post() {
        let grant = Grant::AuthorizationCode { code: "xyz".into() };
        let parts = token_request(&grant, &authentication(None), &[]);
        assert_eq!(parts.method, Method::Post);
        assert_eq!(parts.url.as_str(), "https://provider.example/token");
        assert!(parts.headers.contains(&(
            "Content-Type".to_owned(),
            "application/x-www-form-urlencoded".to_owned()
        )));
        assert_eq!(
            body_value(&parts.body, "grant_type").as_deref(),
            Some("authorization_code")
        );
        assert_eq!(body_value(&parts.body, "code").as_deref(), Some("xyz"));
        assert_eq!(
            body_value(&parts.body, "redirect_uri").as_deref(),
            Some("https://app.example/callback")
        );
    }

    #[test]
    fn pkce_grant_adds_the_verifier() {
        let verifier = CodeVerifier::from_entropy(&[7u8; 32]).unwrap();
        let expected = verifier.as_str().to_owned();
        let grant = Grant::AuthorizationCodePkce {
            code: "xyz".into(),
            verifier,
        };
        let parts = token_request(&grant, &authentication(None), &[]);
        assert_eq!(
            body_value(&parts.body, "code_verifier"),
            Some(expected)
        );
    }

    #[test]
    fn refresh_grant_sends_the_bare_token() {
        let grant = Grant::RefreshToken {
            token: Token::new("Bearer", "rt_1").unwrap(),
        };
        let parts = token_request(&grant, &authentication(None), &[]);
        assert_eq!(
            body_value(&parts.body, "grant_type").as_deref(),
            Some("refresh_token")
        );
        // bare value, not "Bearer rt_1"
        assert_eq!(body_value(&parts.body, "refresh_token").as_deref(), Some("rt_1"));
        assert_eq!(body_value(&parts.body, "redirect_uri"), None);
    }

    #[test]
    fn scope_in_body_when_configured() {
        let mut authn = authentication(None);
        authn.scope = vec!["read".into(), "write".into()];
        let grant = Grant::RefreshToken {
            token: Token::new("Bearer", "rt_1").unwrap(),
        };
        let parts = token_request(&grant, &authn, &[]);
        assert_eq!(body_value(&parts.body, "scope").as_deref(), Some("read write"));
    }

    #[test]
    fn basic_auth_present_only_with_a_secret() {
        let grant = Grant::AuthorizationCode { code: "xyz".into() };

        let with = token_request(&grant, &authentication(Some(Secret::new("s"))), &[]);
        let header = with
            .headers
            .iter()
            .find(|(name, _)| name == "Authorization")
            .map(|(_, value)| value.as_str());
        // base64("c:s")
        assert_eq!(header, Some("Basic Yzpz"));

        let without = token_request(&grant, &authentication(None), &[]);
        assert!(
            !without.headers.iter().any(|(name, _)| name == "Authorization"),
            "public client must not send an Authorization header"
        );
    }

    #[test]
    fn redirect_uri_serialization_drops_fragment_and_keeps_port() {
        let url = Url::parse("http://localhost:8080/cb?next=home#frag").unwrap();
        assert_eq!(
            serialize_redirect_uri(&url),
            "http://localhost:8080/cb?next=home"
        );
    }

    #[test]
    fn decoder_is_wired_to_the_parts() {
        let grant = Grant::AuthorizationCode { code: "xyz".into() };
        let parts = token_request(&grant, &authentication(None), &[]);
        let success = (parts.decoder)(br#"{"token_type":"Bearer","access_token":"at"}"#).unwrap();
        assert_eq!(success.token.to_string(), "Bearer at");
    }

    #[test]
    fn mapper_reshapes_the_decoded_value() {
        let grant = Grant::AuthorizationCode { code: "xyz".into() };
        let parts = token_request_with(
            &grant,
            &authentication(None),
            &[],
            ResponseDecoders::default(),
            |success| success.token.bare().to_owned(),
        );
        let bare = (parts.decoder)(br#"{"token_type":"Bearer","access_token":"at"}"#).unwrap();
        assert_eq!(bare, "at");
    }

    #[test]
    fn with_timeout_carries_the_hint() {
        let grant = Grant::AuthorizationCode { code: "xyz".into() };
        let parts = token_request(&grant, &authentication(None), &[])
            .with_timeout(Duration::from_secs(10));
        assert_eq!(parts.timeout, Some(Duration::from_secs(10)));
    }
}
