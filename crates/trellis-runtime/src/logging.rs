//! Logging setup for the Trellis runtime.
//!
//! Configuration-driven initialization of `tracing-subscriber`, covering
//! level filtering, output format and destination, and span lifecycle
//! events (useful for watching request cycles flow through handlers).
//!
//! ```rust,ignore
//! use trellis_runtime::config::load_config;
//! use trellis_runtime::logging;
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```

use std::ffi::OsStr;
use std::path::Path;

use tracing::warn;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

/// Span lifecycle events to include in log output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanEvents {
    /// Log when a span is created.
    pub new: bool,
    /// Log when a span is entered.
    pub enter: bool,
    /// Log when a span is exited.
    pub exit: bool,
    /// Log when a span is closed.
    pub close: bool,
}

impl SpanEvents {
    /// No span events.
    pub const NONE: Self = Self {
        new: false,
        enter: false,
        exit: false,
        close: false,
    };

    /// Creation and close events only: the lifecycle of each request cycle
    /// without enter/exit noise.
    pub const LIFECYCLE: Self = Self {
        new: true,
        enter: false,
        exit: false,
        close: true,
    };

    /// All span events.
    pub const FULL: Self = Self {
        new: true,
        enter: true,
        exit: true,
        close: true,
    };

    fn to_fmt_span(self) -> fmt::format::FmtSpan {
        let mut span = fmt::format::FmtSpan::NONE;
        if self.new {
            span |= fmt::format::FmtSpan::NEW;
        }
        if self.enter {
            span |= fmt::format::FmtSpan::ENTER;
        }
        if self.exit {
            span |= fmt::format::FmtSpan::EXIT;
        }
        if self.close {
            span |= fmt::format::FmtSpan::CLOSE;
        }
        span
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        Self {
            new: config.new,
            enter: config.enter,
            exit: config.exit,
            close: config.close,
        }
    }
}

/// Initializes logging from configuration.
///
/// Idempotent: a second call (e.g. from a second application in tests) is a
/// silent no-op.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Builder for manual logging setup.
///
/// ```rust,ignore
/// use trellis_runtime::logging::{LoggingBuilder, SpanEvents};
///
/// LoggingBuilder::new()
///     .with_level(tracing::Level::DEBUG)
///     .directive("trellis_runtime=trace")
///     .span_events(SpanEvents::LIFECYCLE)
///     .init();
/// ```
pub struct LoggingBuilder {
    level: tracing::Level,
    directives: Vec<String>,
    format: LogFormat,
    output: LogOutput,
    span_events: SpanEvents,
    thread_ids: bool,
    file_location: bool,
    file_path: Option<std::path::PathBuf>,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Creates a builder with info-level compact output to stdout.
    pub fn new() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: Vec::new(),
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            span_events: SpanEvents::NONE,
            thread_ids: false,
            file_location: false,
            file_path: None,
        }
    }

    /// Creates a builder from a [`LoggingConfig`].
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut builder = Self::new();
        builder.level = config.level.to_tracing_level();
        builder.format = config.format;
        builder.output = config.output;
        builder.span_events = SpanEvents::from(&config.span_events);
        builder.thread_ids = config.thread_ids;
        builder.file_location = config.file_location;
        builder.file_path.clone_from(&config.file_path);
        for (module, level) in &config.filters {
            builder.directives.push(format!("{module}={}", level.as_str()));
        }
        builder
    }

    /// Sets the global log level.
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// Adds an env-filter directive (e.g. `"trellis_framework=debug"`).
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Sets the span lifecycle events to log.
    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    /// Sets the output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Initializes the logging system, ignoring double-initialization.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Tries to initialize the logging system.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        match self.output {
            LogOutput::Stdout => self.install(filter, std::io::stdout),
            LogOutput::Stderr => self.install(filter, std::io::stderr),
            LogOutput::File => match self.file_path.clone() {
                Some(path) => {
                    let appender = tracing_appender::rolling::never(
                        path.parent().unwrap_or_else(|| Path::new(".")),
                        path.file_name().unwrap_or_else(|| OsStr::new("trellis.log")),
                    );
                    self.install(filter, appender)
                }
                None => {
                    warn!("File output requested without a file path, using stdout");
                    self.install(filter, std::io::stdout)
                }
            },
        }
    }

    /// Builds the env filter: `RUST_LOG` wins over the configured level;
    /// module directives apply on top.
    fn build_filter(&self) -> EnvFilter {
        let base = self.level.to_string().to_lowercase();
        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base));
        for directive in &self.directives {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
        filter
    }

    fn install<W>(&self, filter: EnvFilter, writer: W) -> Result<(), TryInitError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        tracing_subscriber::registry()
            .with(self.build_layer(writer))
            .with(filter)
            .try_init()
    }

    fn build_layer<W>(&self, writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let span_events = self.span_events.to_fmt_span();
        match self.format {
            #[cfg(feature = "json-log")]
            LogFormat::Json => fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_writer(writer)
                .boxed(),
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => {
                warn!("JSON log format requires the 'json-log' feature, using full format");
                fmt::layer()
                    .with_span_events(span_events)
                    .with_thread_ids(self.thread_ids)
                    .with_file(self.file_location)
                    .with_line_number(self.file_location)
                    .with_writer(writer)
                    .boxed()
            }
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_span_events(span_events)
                .with_thread_ids(self.thread_ids)
                .with_file(self.file_location)
                .with_line_number(self.file_location)
                .with_writer(writer)
                .boxed(),
            LogFormat::Full => fmt::layer()
                .with_span_events(span_events)
                .with_thread_ids(self.thread_ids)
                .with_file(self.file_location)
                .with_line_number(self.file_location)
                .with_writer(writer)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_thread_ids(self.thread_ids)
                .with_file(self.file_location)
                .with_line_number(self.file_location)
                .with_writer(writer)
                .boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_events_from_config() {
        let config = SpanEventConfig {
            new: true,
            close: true,
            ..Default::default()
        };
        let events = SpanEvents::from(&config);

        assert!(events.new && events.close);
        assert!(!events.enter && !events.exit);
    }

    #[test]
    fn test_builder_from_config_carries_filters() {
        let mut config = LoggingConfig::default();
        config
            .filters
            .insert("trellis_framework".to_string(), crate::config::LogLevel::Debug);

        let builder = LoggingBuilder::from_config(&config);
        assert_eq!(builder.directives, ["trellis_framework=debug"]);
    }
}
