//! Captured process output and how it is judged.

use std::time::Duration;

use crate::error::{ExecutionFailure, FailureReason};

/// Remove one trailing newline, if present.
///
/// No other whitespace is trimmed.
pub fn sanitize(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Everything a collecting run captured from a finished process.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    /// Sanitized standard output.
    pub stdout: String,
    /// Sanitized standard error.
    pub stderr: String,
    /// Exit code, `None` when killed by a signal.
    pub exit_code: Option<i32>,
    /// Wall time from spawn to exit.
    pub duration: Duration,
}

impl CapturedOutput {
    /// Decode and sanitize raw process output.
    pub fn from_raw(
        stdout: &[u8],
        stderr: &[u8],
        exit_code: Option<i32>,
        duration: Duration,
    ) -> Self {
        Self {
            stdout: sanitize(&String::from_utf8_lossy(stdout)).to_string(),
            stderr: sanitize(&String::from_utf8_lossy(stderr)).to_string(),
            exit_code,
            duration,
        }
    }

    /// Check if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Reduce the capture to the text a caller gets back.
    ///
    /// A non-zero exit fails. Text on both streams fails even on exit 0.
    /// Stderr alone is returned as the result; otherwise stdout is.
    pub fn into_text(self, command: &str) -> Result<String, ExecutionFailure> {
        if !self.success() {
            return Err(ExecutionFailure::collected(
                command,
                FailureReason::ExitStatus(self.exit_code),
                self.stdout,
                self.stderr,
            ));
        }

        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (false, false) => Err(ExecutionFailure::collected(
                command,
                FailureReason::MixedOutput,
                self.stdout,
                self.stderr,
            )),
            (true, false) => Ok(self.stderr),
            _ => Ok(self.stdout),
        }
    }
}
