//! Command execution engine.

use std::process::Stdio;
use std::time::Instant;

use tracing::{debug, info};

use super::command::{Command, Shell};
use super::result::CapturedOutput;
use super::sequence;
use crate::error::{ExecutionFailure, FailureReason};
use crate::Result;

/// When the command text is echoed before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoPolicy {
    /// Echo before collecting runs.
    pub collect: bool,
    /// Echo before interactive runs.
    pub interactive: bool,
}

impl Default for EchoPolicy {
    fn default() -> Self {
        Self {
            collect: false,
            interactive: true,
        }
    }
}

/// Write the command line to the diagnostic channel.
fn echo(command: &str) {
    println!("{}", command);
}

/// Runs commands through a shell, either capturing or relaying output.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    shell: Shell,
    echo: EchoPolicy,
}

impl Runner {
    /// Create a runner for the given shell with the default echo policy.
    pub fn new(shell: Shell) -> Self {
        Self {
            shell,
            echo: EchoPolicy::default(),
        }
    }

    /// Override the echo policy.
    pub fn with_echo(mut self, echo: EchoPolicy) -> Self {
        self.echo = echo;
        self
    }

    /// The shell commands are handed to.
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// The active echo policy.
    pub fn echo_policy(&self) -> EchoPolicy {
        self.echo
    }

    /// Run one command and return its sanitized output.
    pub async fn collect(&self, command: impl Into<Command>) -> Result<String> {
        self.collect_command(&command.into(), self.echo.collect).await
    }

    /// Like [`Runner::collect`], but always echoes the command first.
    pub async fn collect_echoed(&self, command: impl Into<Command>) -> Result<String> {
        self.collect_command(&command.into(), true).await
    }

    /// Run commands in order, stopping at the first failure.
    pub async fn collect_all<I>(&self, commands: I) -> Result<Vec<String>>
    where
        I: IntoIterator,
        I::Item: Into<Command>,
    {
        sequence::each(commands, |command| {
            let command: Command = command.into();
            async move { self.collect_command(&command, self.echo.collect).await }
        })
        .await
    }

    /// Like [`Runner::collect_all`], but always echoes each command first.
    pub async fn collect_all_echoed<I>(&self, commands: I) -> Result<Vec<String>>
    where
        I: IntoIterator,
        I::Item: Into<Command>,
    {
        sequence::each(commands, |command| {
            let command: Command = command.into();
            async move { self.collect_command(&command, true).await }
        })
        .await
    }

    /// Run a [`Command`] capturing stdout and stderr.
    pub async fn collect_command(&self, command: &Command, echo_first: bool) -> Result<String> {
        let line = command.normalized();
        if echo_first {
            echo(&line);
        }
        debug!(command = %line, "collecting");

        let start = Instant::now();
        let output = self
            .shell
            .process(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ExecutionFailure::collected(
                    line.as_str(),
                    FailureReason::Launch(e),
                    String::new(),
                    String::new(),
                )
            })?;

        let captured = CapturedOutput::from_raw(
            &output.stdout,
            &output.stderr,
            output.status.code(),
            start.elapsed(),
        );
        debug!(
            command = %line,
            exit_code = ?captured.exit_code,
            duration_ms = captured.duration.as_millis() as u64,
            "finished"
        );

        Ok(captured.into_text(&line)?)
    }

    /// Run one command attached to the terminal, echoing it per policy.
    pub async fn interactive(&self, command: impl Into<Command>) -> Result<()> {
        self.interactive_command(&command.into(), self.echo.interactive)
            .await
    }

    /// Run one command attached to the terminal without echoing it.
    pub async fn interactive_quiet(&self, command: impl Into<Command>) -> Result<()> {
        self.interactive_command(&command.into(), false).await
    }

    /// Run commands attached to the terminal, in order, stopping at the
    /// first failure.
    pub async fn interactive_all<I>(&self, commands: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Command>,
    {
        sequence::each(commands, |command| {
            let command: Command = command.into();
            async move {
                self.interactive_command(&command, self.echo.interactive)
                    .await
            }
        })
        .await?;
        Ok(())
    }

    /// Run a [`Command`] with inherited stdio.
    ///
    /// Failures are silenced: the process has already reported to the
    /// terminal.
    pub async fn interactive_command(&self, command: &Command, echo_first: bool) -> Result<()> {
        let line = command.normalized();
        if echo_first {
            echo(&line);
        }
        debug!(command = %line, "running interactively");

        let start = Instant::now();
        let status = self
            .shell
            .process(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecutionFailure::silenced(line.as_str(), FailureReason::Launch(e)))?;

        debug!(
            command = %line,
            exit_code = ?status.code(),
            duration_ms = start.elapsed().as_millis() as u64,
            "finished"
        );

        if status.success() {
            Ok(())
        } else {
            info!(command = %line, "command failed");
            Err(ExecutionFailure::silenced(line, FailureReason::ExitStatus(status.code())).into())
        }
    }
}

/// Run one command with the platform shell and return its output.
pub async fn collect_output(command: impl Into<Command>) -> Result<String> {
    Runner::default().collect(command).await
}

/// Run commands in order with the platform shell and return their outputs.
pub async fn collect_outputs<I>(commands: I) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: Into<Command>,
{
    Runner::default().collect_all(commands).await
}

/// Run one command attached to the terminal, echoing it first.
pub async fn print_output(command: impl Into<Command>) -> Result<()> {
    Runner::default().interactive(command).await
}

/// Run commands attached to the terminal, in order.
pub async fn print_outputs<I>(commands: I) -> Result<()>
where
    I: IntoIterator,
    I::Item: Into<Command>,
{
    Runner::default().interactive_all(commands).await
}
