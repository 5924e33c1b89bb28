// Gateway configuration loaded from environment variables.
// Decision: GATEWAY_ prefix for all gateway settings
// Decision: Defaults reproduce the historical deployment (port 80, 20 minute cookie)

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:80";

/// 20 minutes
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(20 * 60);

/// Complete gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// Max-age of the session cookie set on login
    pub session_max_age: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 80)),
            session_max_age: DEFAULT_SESSION_MAX_AGE,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// A malformed listen address is an error; a malformed max-age falls back
    /// to the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("GATEWAY_ADDR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr
            .trim()
            .parse()
            .with_context(|| format!("GATEWAY_ADDR is not a socket address: {}", listen_addr))?;

        let session_max_age = match lookup("GATEWAY_COOKIE_MAX_AGE") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        value = %raw,
                        fallback_secs = DEFAULT_SESSION_MAX_AGE.as_secs(),
                        "GATEWAY_COOKIE_MAX_AGE invalid, using default"
                    );
                    DEFAULT_SESSION_MAX_AGE
                }
            },
            None => DEFAULT_SESSION_MAX_AGE,
        };

        Ok(Self {
            listen_addr,
            session_max_age,
        })
    }

    /// Session max-age in the form the cookie builder expects
    pub fn cookie_max_age(&self) -> time::Duration {
        time::Duration::seconds(self.session_max_age.as_secs().min(i64::MAX as u64) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.listen_addr.port(), 80);
        assert_eq!(config.cookie_max_age(), time::Duration::seconds(1200));
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("GATEWAY_ADDR", "127.0.0.1:8080"),
            ("GATEWAY_COOKIE_MAX_AGE", "60"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.session_max_age, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_max_age_falls_back() {
        for raw in ["soon", "-5", "0", ""] {
            let config =
                GatewayConfig::from_lookup(lookup_from(&[("GATEWAY_COOKIE_MAX_AGE", raw)]))
                    .unwrap();
            assert_eq!(config.session_max_age, DEFAULT_SESSION_MAX_AGE);
        }
    }

    #[test]
    fn test_invalid_listen_addr_is_error() {
        let result = GatewayConfig::from_lookup(lookup_from(&[("GATEWAY_ADDR", "port eighty")]));
        assert!(result.is_err());
    }
}
