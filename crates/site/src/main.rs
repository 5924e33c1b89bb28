// Authgate demo site server

use anyhow::{Context, Result};
use authgate_core::shutdown_signal;
use authgate_core::telemetry::{init_telemetry, TelemetryConfig};
use authgate_site::SiteConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "authgate" {
        telemetry_config.service_name = "authgate-site".to_string();
    }
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter = Some("authgate_site=debug,tower_http=info".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config)?;

    let config = SiteConfig::from_env().context("Invalid site configuration")?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!(addr = %config.listen_addr, "HTTP server listening");

    axum::serve(listener, authgate_site::app())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
