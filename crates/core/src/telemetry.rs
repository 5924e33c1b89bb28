// Telemetry Module
//
// Console logging for the authgate binaries via tracing-subscriber.
// Both the gateway and the site initialise logging through this module so
// that filters and output format stay consistent.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when neither the caller nor the environment provides one
pub const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// Telemetry Configuration
// ============================================================================

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Service version
    pub service_version: Option<String>,
    /// Environment (e.g., "development", "production")
    pub environment: Option<String>,
    /// Whether to enable console logging
    pub enable_console: bool,
    /// Log filter (e.g., "info", "debug", "authgate_gateway=debug")
    pub log_filter: Option<String>,
    /// Emit ANSI colours on the console
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "authgate".to_string(),
            service_version: None,
            environment: None,
            enable_console: true,
            log_filter: None,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `AUTHGATE_SERVICE_NAME`: Service name (default: "authgate")
    /// - `AUTHGATE_ENVIRONMENT`: Deployment environment
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    /// - `NO_COLOR`: Disable ANSI colours when set
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("AUTHGATE_SERVICE_NAME")
                .unwrap_or_else(|_| "authgate".to_string()),
            service_version: None,
            environment: std::env::var("AUTHGATE_ENVIRONMENT").ok(),
            enable_console: true,
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok()),
            ansi: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Filter directive that will actually be applied
    pub fn effective_filter(&self) -> &str {
        self.log_filter
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Install the global tracing subscriber.
///
/// An unparseable filter falls back to [`DEFAULT_LOG_FILTER`] rather than
/// failing startup. Errors only if a global subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.effective_filter())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_layer = if config.enable_console {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(config.ansi)
                .with_filter(filter),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        service = %config.service_name,
        version = config.service_version.as_deref().unwrap_or("unknown"),
        environment = config.environment.as_deref().unwrap_or("unset"),
        "Telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "authgate");
        assert!(config.enable_console);
        assert!(config.log_filter.is_none());
        assert_eq!(config.effective_filter(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_effective_filter_ignores_blank() {
        let config = TelemetryConfig {
            log_filter: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.effective_filter(), DEFAULT_LOG_FILTER);

        let config = TelemetryConfig {
            log_filter: Some("authgate_gateway=debug".to_string()),
            ..Default::default()
        };
        assert_eq!(config.effective_filter(), "authgate_gateway=debug");
    }
}
