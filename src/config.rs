//! Configuration management for shellkit.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::execution::{EchoPolicy, Runner, Shell};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell used to run commands.
    pub shell: ShellSection,
    /// When commands are echoed before running.
    pub echo: EchoSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Shell configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Interpreter program.
    pub program: String,
    /// Arguments placed before the command text.
    pub args: Vec<String>,
}

impl Default for ShellSection {
    fn default() -> Self {
        let shell = Shell::platform_default();
        Self {
            program: shell.program,
            args: shell.args,
        }
    }
}

/// Echo configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoSection {
    /// Echo before collecting runs.
    pub collect: bool,
    /// Echo before interactive runs.
    pub interactive: bool,
}

impl Default for EchoSection {
    fn default() -> Self {
        let policy = EchoPolicy::default();
        Self {
            collect: policy.collect,
            interactive: policy.interactive,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or filter directives.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(program) = std::env::var("SHELLKIT_SHELL") {
            if !program.is_empty() {
                self.shell.program = program;
            }
        }

        if let Ok(echo) = std::env::var("SHELLKIT_ECHO") {
            let enabled =
                parse_bool(&echo).ok_or(ConfigError::InvalidValue("SHELLKIT_ECHO", echo))?;
            self.echo.collect = enabled;
            self.echo.interactive = enabled;
        }

        if let Ok(level) = std::env::var("SHELLKIT_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref program) = args.shell {
            self.shell.program = program.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env()?;
        config.apply_args(args);

        if config.shell.program.is_empty() {
            return Err(ConfigError::InvalidValue("shell.program", String::new()));
        }

        Ok(config)
    }

    /// The configured shell.
    pub fn shell(&self) -> Shell {
        Shell::new(self.shell.program.clone(), self.shell.args.clone())
    }

    /// The configured echo policy.
    pub fn echo_policy(&self) -> EchoPolicy {
        EchoPolicy {
            collect: self.echo.collect,
            interactive: self.echo.interactive,
        }
    }

    /// A runner using the configured shell and echo policy.
    pub fn runner(&self) -> Runner {
        Runner::new(self.shell()).with_echo(self.echo_policy())
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A setting has an unusable value.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidValue(name, value) => write!(f, "invalid value for {}: '{}'", name, value),
        }
    }
}

impl std::error::Error for ConfigError {}
