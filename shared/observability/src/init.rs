//! Tracing initialization.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! pretty (development) or JSON (production) formatting layer.

use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name for log attribution
    pub service_name: String,
    /// Log format: "json" or "pretty"
    pub format: String,
    /// Log level filter used when `RUST_LOG` is unset
    pub level: String,
    /// Whether to include file/line in logs
    pub include_location: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "medisense".to_string(),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            include_location: env::var("LOG_LOCATION").map(|v| v == "true").unwrap_or(false),
        }
    }
}

impl TracingConfig {
    pub fn for_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn json(mut self) -> Self {
        self.format = "json".to_string();
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = "pretty".to_string();
        self
    }
}

/// Initialize the global subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(config: TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let initialized = if config.format == "json" {
        let layer = fmt::layer()
            .json()
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(true);

        tracing_subscriber::registry().with(filter).with(layer).try_init()
    } else {
        // stderr keeps the interactive chat loop's stdout clean
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(true);

        tracing_subscriber::registry().with(filter).with(layer).try_init()
    };

    if initialized.is_ok() {
        tracing::info!(
            service = %config.service_name,
            format = %config.format,
            "Tracing initialized"
        );
    }
}
