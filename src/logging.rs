//! Logging infrastructure - structured tracing for conversions
//!
//! Design: `tracing` events on their module-path target (`gimarshal::...`),
//! tagged with a `concern` field (`marshal`, `check`, `array`, `list`); the
//! subscriber is only installed when the embedder asks for it, so a library
//! user with their own subscriber sees the same events.

use crate::errors::ConversionError;
use crate::interop::TypeTag;
use once_cell::sync::OnceCell;
use tracing::{debug, trace, warn, Level};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Daily rotated files
    File { directory: String, prefix: String },
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Log span enter/close events
    pub span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // GIMARSHAL_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level) = std::env::var("GIMARSHAL_LOG_LEVEL") {
            config.level = parse_level(&level).unwrap_or(Level::INFO);
        }

        // GIMARSHAL_LOG_DIR: directory for rolling log files
        if let Ok(directory) = std::env::var("GIMARSHAL_LOG_DIR") {
            config.output = LogOutput::File {
                directory,
                prefix: "gimarshal.log".to_string(),
            };
        }

        if std::env::var("GIMARSHAL_LOG_JSON").is_ok() {
            config.format = LogFormat::Json;
        }
        config.span_events = std::env::var("GIMARSHAL_LOG_SPANS").is_ok();

        config
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }
}

pub fn parse_level(name: &str) -> Option<Level> {
    match name.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize logging from the environment
pub fn init() -> Option<WorkerGuard> {
    init_with_config(LogConfig::from_env())
}

/// Initialize logging with custom configuration
///
/// Only the first call installs a subscriber; later calls return `None`.
/// The returned guard flushes buffered output when dropped and must be held
/// for as long as logging is needed.
pub fn init_with_config(config: LogConfig) -> Option<WorkerGuard> {
    let mut guard = None;
    LOGGER_INITIALIZED.get_or_init(|| {
        let (writer, worker) = match &config.output {
            LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
            LogOutput::File { directory, prefix } => {
                tracing_appender::non_blocking(rolling::daily(directory, prefix))
            }
        };
        guard = Some(worker);

        let span_events = span_events_config(config.span_events);
        let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
            LogFormat::Pretty => fmt::layer()
                .with_writer(writer)
                .pretty()
                .with_span_events(span_events)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .with_writer(writer)
                .compact()
                .with_span_events(span_events)
                .with_target(true)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_writer(writer)
                .json()
                .with_span_events(span_events)
                .boxed(),
        };

        // Another subscriber may already be installed by the embedder
        let _ = tracing_subscriber::registry()
            .with(layer)
            .with(build_filter(&config))
            .try_init();
    });
    guard
}

pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config.level))
}

/// Every event the crate emits, at `level` and above
fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!("gimarshal={}", level.as_str().to_lowercase()))
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

// ============================================================================
// Conversion events
// ============================================================================

#[inline]
pub fn log_conversion(direction: &str, tag: TypeTag) {
    trace!(
        concern = "marshal",
        event = "conversion",
        direction = direction,
        tag = tag.as_str(),
        "Converting argument"
    );
}

pub fn log_check_failure(tag: TypeTag, error: &ConversionError) {
    debug!(
        concern = "check",
        event = "check_failed",
        tag = tag.as_str(),
        kind = %error.kind(),
        error = %error,
        "Value is not representable"
    );
}

/// Diagnostic for a tag this crate leaves unimplemented
pub fn log_unsupported(direction: &str, tag: TypeTag) {
    warn!(
        concern = "marshal",
        event = "unsupported_tag",
        direction = direction,
        tag = tag.as_str(),
        "Type tag is unhandled"
    );
}

pub fn log_list_released(kind: &str, nodes: usize) {
    trace!(
        concern = "list",
        event = "list_released",
        kind = kind,
        nodes = nodes,
        "List backbone freed"
    );
}

pub fn log_array_packed(length: usize, element_size: usize, zero_terminated: bool) {
    trace!(
        concern = "array",
        event = "array_packed",
        length = length,
        element_size = element_size,
        zero_terminated = zero_terminated,
        "Array packed"
    );
}
