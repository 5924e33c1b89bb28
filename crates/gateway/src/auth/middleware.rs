// Authentication errors, shared state and request extractors
// Decision: Every failure becomes a per-request response; nothing here exits the process
// Decision: 401 bodies never say which part of a credential check failed

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Cookie;
use std::sync::Arc;
use thiserror::Error;

use authgate_core::{AUTH_TOKEN_HEADER, SESSION_COOKIE};

use super::{store::CredentialStore, token::TokenService};
use crate::config::GatewayConfig;

/// Authentication error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Login fields missing or credentials rejected, or a token that matches nobody
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Presented token rejected on `/auth` or `/me`
    #[error("unauthorized request")]
    Unauthorized,

    /// No session cookie or token header on the request
    #[error("missing session")]
    MissingSession,

    /// Unexpected failure while handling the request; detail is only logged
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn body(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid credentials\n",
            AuthError::Unauthorized => "Unauthorized request\n",
            AuthError::MissingSession => "",
            AuthError::Internal(_) => "Internal server error\n",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Internal(detail) => tracing::error!(error = %detail, "Request failed"),
            other => tracing::info!(reason = %other, "Unauthorized request"),
        }

        let body = self.body();
        if body.is_empty() {
            self.status().into_response()
        } else {
            (self.status(), body).into_response()
        }
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    /// Max-age applied to freshly issued session cookies
    pub cookie_max_age: time::Duration,
}

impl AuthState {
    pub fn new(store: CredentialStore, config: &GatewayConfig) -> Self {
        let tokens = Arc::new(TokenService::new(Arc::new(store)));
        Self {
            tokens,
            cookie_max_age: config.cookie_max_age(),
        }
    }
}

/// Token taken from the `X-Auth-Token` header.
/// Rejects unless the header occurs exactly once with a visible-ASCII value.
#[derive(Debug, Clone)]
pub struct AuthTokenHeader(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthTokenHeader
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mut values = parts.headers.get_all(AUTH_TOKEN_HEADER).iter();

        let value = match (values.next(), values.next()) {
            (Some(value), None) => value,
            _ => return Err(AuthError::MissingSession),
        };

        // Present but not visible ASCII: a token that cannot match anyone
        let token = value.to_str().map_err(|_| AuthError::Unauthorized)?;
        Ok(AuthTokenHeader(token.to_string()))
    }
}

/// Value of the first session cookie on the request.
///
/// When the cookie is repeated the first occurrence wins, the same choice
/// nginx makes for `$cookie_nginx_auth` when it fills the `/auth` header.
pub fn first_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Token taken from the session cookie
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        first_session_cookie(&parts.headers)
            .map(SessionToken)
            .ok_or(AuthError::MissingSession)
    }
}

/// Cookie domain derived from the request's `Host` header, without the port.
/// `None` when the request carries no usable host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDomain(pub Option<String>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestDomain
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let domain = parts
            .headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .and_then(host_without_port);
        Ok(RequestDomain(domain))
    }
}

fn host_without_port(host: &str) -> Option<String> {
    let host = host.trim();
    let name = if host.starts_with('[') {
        // IPv6 literal, keep the brackets
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(AuthError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MissingSession.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_body_hides_detail() {
        let error = AuthError::Internal("user 9 missing from store".to_string());
        assert_eq!(error.body(), "Internal server error\n");
    }

    #[tokio::test]
    async fn test_auth_token_header_requires_exactly_one() {
        let mut parts = parts_with(&[]);
        let result = AuthTokenHeader::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err(), AuthError::MissingSession);

        let mut parts = parts_with(&[("X-Auth-Token", "1"), ("X-Auth-Token", "2")]);
        let result = AuthTokenHeader::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err(), AuthError::MissingSession);

        let mut parts = parts_with(&[("x-auth-token", "564724777")]);
        let AuthTokenHeader(token) = AuthTokenHeader::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(token, "564724777");
    }

    #[tokio::test]
    async fn test_auth_token_header_rejects_opaque_bytes() {
        let mut parts = parts_with(&[]);
        parts.headers.insert(
            AUTH_TOKEN_HEADER,
            HeaderValue::from_bytes(b"\xfa\xfb").unwrap(),
        );
        let result = AuthTokenHeader::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err(), AuthError::Unauthorized);
    }

    #[test]
    fn test_first_session_cookie_wins() {
        let parts = parts_with(&[("cookie", "nginx-auth=bad; nginx-auth=564724777")]);
        assert_eq!(first_session_cookie(&parts.headers).as_deref(), Some("bad"));

        // Across separate Cookie headers too
        let parts = parts_with(&[
            ("cookie", "theme=dark; nginx-auth=564724777"),
            ("cookie", "nginx-auth=bad"),
        ]);
        assert_eq!(
            first_session_cookie(&parts.headers).as_deref(),
            Some("564724777")
        );

        let parts = parts_with(&[("cookie", "theme=dark")]);
        assert_eq!(first_session_cookie(&parts.headers), None);
    }

    #[tokio::test]
    async fn test_session_token_from_cookie() {
        let mut parts = parts_with(&[("cookie", "theme=dark; nginx-auth=564724777")]);
        let SessionToken(token) = SessionToken::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(token, "564724777");

        let mut parts = parts_with(&[("cookie", "theme=dark")]);
        let result = SessionToken::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err(), AuthError::MissingSession);
    }

    #[test]
    fn test_host_without_port() {
        assert_eq!(host_without_port("example.com:8080").as_deref(), Some("example.com"));
        assert_eq!(host_without_port("example.com").as_deref(), Some("example.com"));
        assert_eq!(host_without_port("[::1]:80").as_deref(), Some("[::1]"));
        assert_eq!(host_without_port(":80"), None);
        assert_eq!(host_without_port(""), None);
    }
}
