//! Command building, normalization, and the shell that runs it.

use std::collections::HashMap;
use std::path::PathBuf;

/// Collapse a multi-line command into a single shell line.
///
/// Every newline together with the whitespace run that follows it becomes
/// one space. Nothing else is touched.
///
/// ```
/// use shellkit::execution::normalize;
///
/// assert_eq!(normalize("cargo build\n    --release"), "cargo build --release");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }

    out
}

/// The interpreter commands are handed to, as opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    /// Interpreter program.
    pub program: String,
    /// Arguments placed before the command text.
    pub args: Vec<String>,
}

impl Shell {
    /// Create a shell from a program and its leading arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `cmd /C` on Windows, `sh -c` elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::new("cmd", ["/C"])
        } else {
            Self::new("sh", ["-c"])
        }
    }

    /// Build a process for `command` without configuring stdio.
    pub(crate) fn process(&self, command: &Command) -> tokio::process::Command {
        let mut process = tokio::process::Command::new(&self.program);
        process.args(&self.args).arg(command.normalized());

        if let Some(ref dir) = command.working_dir {
            process.current_dir(dir);
        }
        process.envs(&command.env);
        process.kill_on_drop(true);
        process
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// A command to be run through the shell.
#[derive(Debug, Clone, Default)]
pub struct Command {
    /// The command text as written, possibly spanning several lines.
    pub text: String,
    /// Working directory override (if any).
    pub working_dir: Option<PathBuf>,
    /// Environment variables to set.
    pub env: HashMap<String, String>,
}

impl Command {
    /// Create a new command with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            working_dir: None,
            env: HashMap::new(),
        }
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add multiple environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    /// The single-line form handed to the shell.
    pub fn normalized(&self) -> String {
        normalize(&self.text)
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
