//! `tracing-subscriber` initialization.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Configuration for [`init_tracing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `batchctx=debug`.
    #[serde(default = "default_directive")]
    pub default_directive: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Whether to include the event target.
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_directive() -> String {
    "batchctx=info".to_string()
}

fn default_with_target() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_directive: default_directive(),
            format: LogFormat::default(),
            with_target: default_with_target(),
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback filter directive.
    #[must_use]
    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Builds the filter: `RUST_LOG` if set, the default directive otherwise.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingInitError> {
        EnvFilter::try_from_default_env().or_else(|_| {
            EnvFilter::try_new(&self.default_directive)
                .map_err(|e| LoggingInitError::InvalidDirective(e.to_string()))
        })
    }
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingInitError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter directive: {0}")]
    InvalidDirective(String),

    /// A global subscriber is already installed.
    #[error("Failed to install subscriber: {0}")]
    AlreadyInitialized(String),
}

/// Installs a global `tracing` subscriber.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| LoggingInitError::AlreadyInitialized(e.to_string()))
}
