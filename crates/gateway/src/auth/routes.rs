// Gateway HTTP routes
// Decision: Paths are fixed by the nginx config (/login, /logout, /auth, /me), no prefix
// Decision: No server-side sessions; every request re-derives identity from the token

use axum::{
    extract::{rejection::FormRejection, State},
    http::{HeaderName, StatusCode},
    response::{Html, IntoResponse},
    routing::{any, get},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use authgate_core::{AUTH_USER_ID_HEADER, SESSION_COOKIE};

use super::{
    middleware::{AuthError, AuthState, AuthTokenHeader, RequestDomain, SessionToken},
    store::{Credentials, User},
};

const LOGIN_HTML: &str = include_str!("login.html");

/// Value written over the session cookie on logout
const CLEARED_COOKIE_VALUE: &str = "--";

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", any(logout))
        .route("/auth", any(verify))
        .route("/me", any(whoami))
        .with_state(state)
}

/// GET /login - HTML login form
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// POST /login - Check form credentials and set the session cookie
pub async fn login(
    State(state): State<AuthState>,
    RequestDomain(domain): RequestDomain,
    jar: CookieJar,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<CookieJar, AuthError> {
    let Form(fields) = form.map_err(|rejection| match rejection {
        FormRejection::BytesRejection(e) => {
            AuthError::Internal(format!("Failed to read login body: {}", e))
        }
        other => {
            tracing::debug!(error = %other, "Login form rejected");
            AuthError::InvalidCredentials
        }
    })?;

    let credentials = credentials_from_form(fields)?;
    let token = state.tokens.login(&credentials)?;

    tracing::info!(username = %credentials.username, "Login succeeded");

    let mut cookie = Cookie::build((SESSION_COOKIE, token.into_string()))
        .http_only(true)
        .max_age(state.cookie_max_age);
    if let Some(domain) = domain {
        cookie = cookie.domain(domain);
    }

    Ok(jar.add(cookie.build()))
}

/// Pull `username` and `password` out of decoded form pairs.
/// Each must be present exactly once.
fn credentials_from_form(fields: Vec<(String, String)>) -> Result<Credentials, AuthError> {
    let mut username = None;
    let mut password = None;

    for (key, value) in fields {
        let slot = match key.as_str() {
            "username" => &mut username,
            "password" => &mut password,
            _ => continue,
        };
        if slot.replace(value).is_some() {
            return Err(AuthError::InvalidCredentials);
        }
    }

    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials { username, password }),
        _ => Err(AuthError::InvalidCredentials),
    }
}

/// ANY /logout - Clear the session cookie if the client has one
pub async fn logout(
    RequestDomain(domain): RequestDomain,
    session: Option<SessionToken>,
    jar: CookieJar,
) -> CookieJar {
    if session.is_none() {
        return jar;
    }

    let mut cookie = Cookie::build((SESSION_COOKIE, CLEARED_COOKIE_VALUE))
        .http_only(true)
        .max_age(time::Duration::seconds(-1));
    if let Some(domain) = domain {
        cookie = cookie.domain(domain);
    }

    tracing::info!("Session cookie cleared");
    jar.add(cookie.build())
}

/// ANY /auth - nginx auth_request target; answers with the user id header
pub async fn verify(
    State(state): State<AuthState>,
    AuthTokenHeader(token): AuthTokenHeader,
) -> Result<impl IntoResponse, AuthError> {
    let user_id = state
        .tokens
        .validate(&token)
        .map_err(|_| AuthError::Unauthorized)?;

    tracing::info!(user_id, "Authorized request");

    Ok((
        StatusCode::OK,
        [(
            HeaderName::from_static(AUTH_USER_ID_HEADER),
            user_id.to_string(),
        )],
    ))
}

/// ANY /me - Current user as JSON, resolved from the session cookie
pub async fn whoami(
    State(state): State<AuthState>,
    SessionToken(token): SessionToken,
) -> Result<Json<User>, AuthError> {
    let user_id = state
        .tokens
        .validate(&token)
        .map_err(|_| AuthError::Unauthorized)?;

    let user = state.tokens.store().find_by_id(user_id).ok_or_else(|| {
        AuthError::Internal(format!("user {} resolved from token but not in store", user_id))
    })?;

    tracing::info!(user_id, "Authorized me request");
    Ok(Json(user.clone()))
}
