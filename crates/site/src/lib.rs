// Authgate demo site
//
// Sits behind nginx, which only forwards requests that passed the gateway's
// `/auth` check. Greets the user named by the identity header and echoes the
// request headers back.

use anyhow::{Context, Result};
use axum::{
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use authgate_core::AUTH_USER_ID_HEADER;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:80";

/// Site configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub listen_addr: SocketAddr,
}

impl SiteConfig {
    /// Load configuration from environment variables (`SITE_ADDR`)
    pub fn from_env() -> Result<Self> {
        Self::from_addr(std::env::var("SITE_ADDR").ok().as_deref())
    }

    fn from_addr(addr: Option<&str>) -> Result<Self> {
        let addr = addr
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_LISTEN_ADDR);
        let listen_addr = addr
            .parse()
            .with_context(|| format!("SITE_ADDR is not a socket address: {}", addr))?;
        Ok(Self { listen_addr })
    }
}

/// Site router: every path is answered by the echo handler
pub fn app() -> Router {
    Router::new()
        .fallback(echo)
        .layer(TraceLayer::new_for_http())
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    // HeaderMap lookups ignore case, so X-Auth-User-ID and X-Auth-User-Id both match
    let user_id = match headers
        .get(AUTH_USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(id) => id,
        None => {
            tracing::warn!(%uri, "Request without user identity header");
            return (StatusCode::UNAUTHORIZED, "Missing user identity\n".to_string());
        }
    };

    tracing::info!(%method, %uri, user_id, "Serving request");
    (StatusCode::OK, render_page(user_id, &method, &uri, &headers))
}

fn render_page(user_id: &str, method: &Method, uri: &Uri, headers: &HeaderMap) -> String {
    let mut page = format!(
        "Hi user {}!\n\nRequest {} {}\nHeaders:\n",
        user_id, method, uri
    );

    for name in headers.keys() {
        let values: Vec<&str> = headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap_or("<binary>"))
            .collect();
        page.push_str(&format!(" - {}: {}\n", name, values.join(", ")));
    }

    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_config_default_and_override() {
        let config = SiteConfig::from_addr(None).unwrap();
        assert_eq!(config.listen_addr.port(), 80);

        let config = SiteConfig::from_addr(Some("127.0.0.1:3000")).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:3000".parse().unwrap());

        assert!(SiteConfig::from_addr(Some("nowhere")).is_err());
    }

    #[test]
    fn test_render_page() {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-user-id", HeaderValue::from_static("2"));
        headers.append("accept", HeaderValue::from_static("text/plain"));
        headers.append("accept", HeaderValue::from_static("text/html"));

        let page = render_page("2", &Method::GET, &"/docs?page=1".parse().unwrap(), &headers);

        assert!(page.starts_with("Hi user 2!\n\nRequest GET /docs?page=1\nHeaders:\n"));
        assert!(page.contains(" - x-auth-user-id: 2\n"));
        assert!(page.contains(" - accept: text/plain, text/html\n"));
    }
}
