//! Logging setup
//!
//! Structured logging through `tracing`, configured once per process.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to log span close events with their duration
    pub log_span_timings: bool,
    /// Extra filter directives, e.g. `gitshelf_repo=debug`
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            log_span_timings: false,
            filter_directives: vec![
                "gitshelf_core=info".to_string(),
                "gitshelf_repo=info".to_string(),
                "gitshelf_web=info".to_string(),
            ],
        }
    }
}

impl LoggingConfig {
    /// Same defaults at a different level for the gitshelf crates
    pub fn with_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            filter_directives: ["gitshelf_core", "gitshelf_repo", "gitshelf_web"]
                .iter()
                .map(|target| format!("{}={}", target, level))
                .collect(),
            ..Self::default()
        }
    }
}

/// Initialize the global subscriber. `RUST_LOG`, when set, takes precedence
/// over `config.level`.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    for directive in &config.filter_directives {
        filter = filter.add_directive(directive.parse()?);
    }

    let span_events = if config.log_span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(span_events)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_span_events(span_events)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location),
            )
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_span_events(span_events)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location),
            )
            .try_init()?,
    }

    Ok(())
}
