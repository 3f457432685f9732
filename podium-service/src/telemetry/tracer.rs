//! Tracing subscriber initialization.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a fmt
//! layer. `RUST_LOG` wins over the configured default filter.

use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ServiceError, ServiceResult};

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(ServiceError::Telemetry {
                reason: format!("unknown log format {:?}", other),
            }),
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Environment (production, staging, development)
    pub environment: String,
    /// Output format
    pub log_format: LogFormat,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "podium".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::default(),
            default_filter: "podium_service=debug,podium_storage=info,info".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Environment variables:
    /// - `PODIUM_SERVICE_NAME` (default: "podium")
    /// - `PODIUM_ENVIRONMENT` (default: "development")
    /// - `PODIUM_LOG_FORMAT`: "json", "pretty" or "compact" (default: pretty;
    ///   unknown values fall back to the default)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: std::env::var("PODIUM_SERVICE_NAME").unwrap_or(defaults.service_name),
            environment: std::env::var("PODIUM_ENVIRONMENT").unwrap_or(defaults.environment),
            log_format: std::env::var("PODIUM_LOG_FORMAT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.log_format),
            default_filter: defaults.default_filter,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup; a second call fails because the global default is
/// already set.
pub fn init_tracing(config: &TelemetryConfig) -> ServiceResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };
    installed.map_err(|e| ServiceError::Telemetry {
        reason: e.to_string(),
    })?;

    tracing::info!(
        service_name = %config.service_name,
        environment = %config.environment,
        log_format = ?config.log_format,
        "Telemetry initialized"
    );

    Ok(())
}
