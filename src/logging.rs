//! Structured logging for inference and dispatch.
//!
//! Unification, application checks, and instance registration emit `tracing`
//! events; this module wires up a subscriber so embedding hosts can see them
//! without their own setup. Output goes to stderr; hosts that already run a
//! subscriber can skip initialization entirely and collect the events
//! themselves.

pub use tracing::{debug, error, info, trace, warn, Level};

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with timestamps
    Pretty,
    /// Compact format for production
    Compact,
    /// JSON format for structured logging
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: LogFormat,
    /// Whether to include span events
    pub span_events: bool,
    /// Custom filter directives (e.g., "typegraft=debug")
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Initialize the global logging system from `config`. Safe to call more
/// than once; later calls are no-ops.
pub fn init_logging(config: LogConfig) {
    let filter = build_filter(&config);
    let span_events = span_events_config(config.span_events);

    match config.format {
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .pretty()
                .with_span_events(span_events)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init().ok();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_span_events(span_events)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init().ok();
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_span_events(span_events)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init().ok();
        }
    }
}

/// Initialize logging with defaults: `RUST_LOG` when set, debug level in
/// debug builds, info in release.
pub fn init_default_logging() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_logging(LogConfig::new().with_level(level));
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    match &config.filter {
        Some(filter_str) => filter_str.split(',').fold(base_filter, |filter, directive| {
            filter.add_directive(directive.parse().unwrap_or_else(|_| {
                warn!("Invalid filter directive: {}", directive);
                config.level.into()
            }))
        }),
        None => base_filter,
    }
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}
