//! Runtime configuration of the process-wide reporter.
//!
//! Configuration is layered, with later sources overriding earlier ones:
//!
//! 1. built-in defaults (`default.yaml`)
//! 2. the YAML file named by `HYPERDIAG_CONFIG`, if set
//! 3. environment variables such as `HYPERDIAG_SINK=log` or
//!    `HYPERDIAG_COLOR=never`
//!
//! Message stripping is not configured here; it is fixed at compile time (see
//! [`MessageMode::BUILD`](crate::MessageMode::BUILD)).

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{LogSink, SilentSink, Sink, StderrSink};

const CONFIG_FILE_FORMAT: config::FileFormat = config::FileFormat::Yaml;
const DEFAULT_CONFIG_STR: &str = include_str!("default.yaml");

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "HYPERDIAG";
/// Environment variable naming an optional configuration file.
pub const CONFIG_FILE_ENV_VAR: &str = "HYPERDIAG_CONFIG";

/// Error loading configuration.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// A source could not be read or parsed.
    #[error("error loading diagnostics configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Reporter configuration.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default sink.
    pub sink: SinkKind,
    /// Whether to color standard error output.
    pub color: ColorChoice,
}

/// Kind of default sink.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// [`StderrSink`]
    #[default]
    Stderr,
    /// [`LogSink`]
    Log,
    /// [`SilentSink`]
    Silent,
}

/// When to use color.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorChoice {
    /// Only when writing to a terminal.
    #[default]
    Auto,
    /// Always.
    Always,
    /// Never.
    Never,
}

impl ColorChoice {
    /// Returns whether to color standard error output.
    pub fn use_color_for_stderr(self) -> bool {
        match self {
            ColorChoice::Auto => std::io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

impl Config {
    /// Loads configuration from all sources. If loading fails, logs a warning
    /// and returns the default configuration.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            log::warn!("{e}; using default diagnostics configuration");
            Self::default()
        })
    }

    /// Loads configuration from all sources.
    pub fn try_load() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG_STR, CONFIG_FILE_FORMAT));

        if let Some(path) = std::env::var_os(CONFIG_FILE_ENV_VAR) {
            builder = builder
                .add_source(config::File::from(PathBuf::from(path)).format(CONFIG_FILE_FORMAT));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .ignore_empty(true),
        );

        Ok(builder.build()?.try_deserialize::<Self>()?)
    }

    /// Parses configuration from a YAML string, on top of the defaults.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG_STR, CONFIG_FILE_FORMAT))
            .add_source(config::File::from_str(s, CONFIG_FILE_FORMAT))
            .build()?
            .try_deserialize::<Self>()?)
    }

    /// Constructs the default sink described by the configuration.
    pub fn build_sink(&self) -> Arc<dyn Sink> {
        match self.sink {
            SinkKind::Stderr => Arc::new(StderrSink {
                color: self.color.use_color_for_stderr(),
            }),
            SinkKind::Log => Arc::new(LogSink),
            SinkKind::Silent => Arc::new(SilentSink),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_builtin_defaults_match_default_impl() {
        assert_eq!(Config::from_yaml_str("").expect("valid"), Config::default());
    }

    #[test]
    fn test_yaml_overrides() {
        let config = Config::from_yaml_str("sink: log").expect("valid");
        assert_eq!(
            config,
            Config {
                sink: SinkKind::Log,
                color: ColorChoice::Auto,
            },
        );

        let config = Config::from_yaml_str("sink: silent\ncolor: never").expect("valid");
        assert_eq!(config.sink, SinkKind::Silent);
        assert_eq!(config.color, ColorChoice::Never);
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::from_yaml_str("sink: carrier_pigeon").expect_err("invalid sink");
        assert!(err.to_string().starts_with("error loading diagnostics configuration"));
    }

    #[test]
    fn test_color_choice() {
        assert!(ColorChoice::Always.use_color_for_stderr());
        assert!(!ColorChoice::Never.use_color_for_stderr());
    }
}
