//! Error types for shellkit.

use std::fmt;

use thiserror::Error;

/// Main error type for shellkit operations.
#[derive(Error, Debug)]
pub enum ShellKitError {
    /// A shell command failed to launch, exited non-zero, or produced
    /// output on both streams.
    #[error(transparent)]
    Execution(#[from] ExecutionFailure),

    /// Decompression, tar framing, or sink write failure during extraction.
    #[error("archive extraction failed: {0}")]
    Archive(#[source] std::io::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Join(String),
}

impl ShellKitError {
    /// Whether a top-level handler should skip printing this error.
    ///
    /// True for interactive command failures, whose process already wrote
    /// its diagnostics straight to the terminal.
    pub fn suppress_diagnostic(&self) -> bool {
        match self {
            Self::Execution(failure) => failure.suppress_diagnostic,
            _ => false,
        }
    }
}

/// Why a command was considered failed.
#[derive(Debug)]
pub enum FailureReason {
    /// The shell could not be started.
    Launch(std::io::Error),
    /// The process exited with a non-zero code, or was killed by a signal
    /// (`None`).
    ExitStatus(Option<i32>),
    /// Both stdout and stderr carried text.
    MixedOutput,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Launch(e) => write!(f, "failed to launch: {}", e),
            Self::ExitStatus(Some(code)) => write!(f, "exited with code {}", code),
            Self::ExitStatus(None) => write!(f, "terminated by signal"),
            Self::MixedOutput => write!(f, "wrote to both stdout and stderr"),
        }
    }
}

/// A failed command execution.
#[derive(Error, Debug)]
#[error("command `{command}` {reason}")]
pub struct ExecutionFailure {
    /// Normalized command text.
    pub command: String,
    /// What went wrong.
    pub reason: FailureReason,
    /// Sanitized stdout captured before the failure (collecting mode only).
    pub output: String,
    /// Sanitized stderr captured before the failure (collecting mode only).
    pub stderr: String,
    /// Set when the process already reported to the terminal.
    pub suppress_diagnostic: bool,
}

impl ExecutionFailure {
    /// Failure from collecting mode, carrying the captured streams.
    pub fn collected(
        command: impl Into<String>,
        reason: FailureReason,
        output: String,
        stderr: String,
    ) -> Self {
        Self {
            command: command.into(),
            reason,
            output,
            stderr,
            suppress_diagnostic: false,
        }
    }

    /// Failure from interactive mode. Always silenced.
    pub fn silenced(command: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            command: command.into(),
            reason,
            output: String::new(),
            stderr: String::new(),
            suppress_diagnostic: true,
        }
    }
}

/// Convenience Result type for shellkit operations.
pub type Result<T> = std::result::Result<T, ShellKitError>;
