//! Logging and tracing configuration
//!
//! Console output goes to stderr so that `--stdout` event lines stay clean on
//! stdout. File output, when enabled, is JSON in a daily-rolling file.

use std::io;
use tracing::{debug, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Default prefix of rolling log files
pub const DEFAULT_LOG_FILE_PREFIX: &str = "rfid-tag-simulator";

/// Error returned when the global subscriber cannot be installed
pub type LoggingError = Box<dyn std::error::Error + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Maximum level for this crate when no filter is given
    pub level: Level,
    /// JSON console output instead of the human-readable format
    pub json_format: bool,
    /// Directory for rolling log files, if file logging is enabled
    pub log_directory: Option<String>,
    /// Log file prefix
    pub log_file_prefix: String,
    /// Whether to log span close events with timings
    pub enable_span_events: bool,
    /// ANSI colors on the console
    pub enable_ansi: bool,
    /// Explicit filter directive, overriding `RUST_LOG` and `level`
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            log_directory: None,
            log_file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

/// Keeps background log writers flushing; drop it last
#[must_use = "dropping the guard stops background log writers"]
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the level from the CLI verbosity flags; `debug` wins over `verbose`
    pub fn for_verbosity(verbose: bool, debug: bool) -> Self {
        let level = if debug {
            Level::DEBUG
        } else if verbose {
            Level::INFO
        } else {
            Level::WARN
        };
        Self::new().with_level(level)
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON console output
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Also write logs to daily-rolling files in `directory`
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span close events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directive used when neither an explicit filter nor `RUST_LOG` is set
    pub fn default_directive(&self) -> String {
        format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level)
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggingError> {
        match &self.env_filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Install the global tracing subscriber
    pub fn init(self) -> Result<LoggingGuard, LoggingError> {
        let mut guards = Vec::new();

        let (console_writer, console_guard) = non_blocking(io::stderr());
        guards.push(console_guard);
        let console_layer = if self.json_format {
            fmt::layer()
                .json()
                .with_writer(console_writer)
                .with_span_events(self.span_events())
                .boxed()
        } else {
            fmt::layer()
                .with_writer(console_writer)
                .with_ansi(self.enable_ansi)
                .with_target(false)
                .with_span_events(self.span_events())
                .boxed()
        };

        let file_layer = match &self.log_directory {
            Some(directory) => {
                let appender = rolling::daily(directory, &self.log_file_prefix);
                let (file_writer, file_guard) = non_blocking(appender);
                guards.push(file_guard);
                Some(
                    fmt::layer()
                        .json()
                        .with_writer(file_writer)
                        .with_span_events(self.span_events())
                        .boxed(),
                )
            }
            None => None,
        };

        Registry::default()
            .with(self.build_filter()?)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        debug!("Logging initialized: {:?}", self);
        Ok(LoggingGuard { _guards: guards })
    }
}
