//! Command-line interface for shellkit.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run commands capturing their output, printing each result.
    Run {
        /// Commands, in order.
        commands: Vec<String>,
        /// Echo every command before running it.
        echo: bool,
    },
    /// Run commands attached to the terminal.
    Exec {
        /// Commands, in order.
        commands: Vec<String>,
        /// Do not echo commands before running them.
        quiet: bool,
    },
    /// Unpack a `.tar.gz` archive into a directory.
    Untar {
        /// Archive to read.
        archive: PathBuf,
        /// Destination directory.
        dest: PathBuf,
        /// Path prefixes to keep; empty keeps every regular file.
        only: Vec<PathBuf>,
    },
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Shell program (overrides config file).
    pub shell: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
    /// Requested action, if any.
    pub action: Option<Action>,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                let name = val.string()?;
                result.action = Some(parse_action(&name, &mut parser)?);
                break;
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn parse_action(name: &str, parser: &mut lexopt::Parser) -> Result<Action, ArgsError> {
    use lexopt::prelude::*;

    match name {
        "run" | "exec" => {
            let mut commands = Vec::new();
            let mut flag = false;

            while let Some(arg) = parser.next()? {
                match arg {
                    Short('e') | Long("echo") if name == "run" => flag = true,
                    Short('q') | Long("quiet") if name == "exec" => flag = true,
                    Value(val) => commands.push(val.string()?),
                    _ => return Err(arg.unexpected().into()),
                }
            }

            if commands.is_empty() {
                return Err(ArgsError::MissingArgument("<CMD>"));
            }

            Ok(if name == "run" {
                Action::Run {
                    commands,
                    echo: flag,
                }
            } else {
                Action::Exec {
                    commands,
                    quiet: flag,
                }
            })
        }
        "untar" => {
            let mut positional = Vec::new();
            let mut only = Vec::new();

            while let Some(arg) = parser.next()? {
                match arg {
                    Long("only") => only.push(parser.value()?.parse()?),
                    Value(val) if positional.len() < 2 => positional.push(PathBuf::from(val)),
                    Value(val) => {
                        return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()))
                    }
                    _ => return Err(arg.unexpected().into()),
                }
            }

            let mut positional = positional.into_iter();
            let archive = positional
                .next()
                .ok_or(ArgsError::MissingArgument("<ARCHIVE>"))?;
            let dest = positional
                .next()
                .ok_or(ArgsError::MissingArgument("<DIR>"))?;

            Ok(Action::Untar {
                archive,
                dest,
                only,
            })
        }
        other => Err(ArgsError::UnknownAction(other.to_string())),
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shellkit {version}
Run shell commands in sequence and unpack .tar.gz archives

USAGE:
    shellkit [OPTIONS] run [--echo] <CMD>...
    shellkit [OPTIONS] exec [--quiet] <CMD>...
    shellkit [OPTIONS] untar <ARCHIVE> <DIR> [--only <PREFIX>]...

ACTIONS:
    run                     Capture each command's output and print it
    exec                    Run each command attached to the terminal
    untar                   Unpack regular files from a gzip tar archive

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -s, --shell <PROG>      Shell program [default: sh, or cmd on Windows]
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    SHELLKIT_SHELL          Shell program (overrides config)
    SHELLKIT_ECHO           Echo commands before running (true/false)
    SHELLKIT_LOG_LEVEL      Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Stop at the first failing step
    shellkit exec "cargo fmt --check" "cargo test"

    # Capture output
    shellkit run "git rev-parse HEAD"

    # Unpack only the binaries
    shellkit untar release.tar.gz ./out --only bin
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("shellkit {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Unknown action name.
    UnknownAction(String),
    /// A required positional argument is missing.
    MissingArgument(&'static str),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::UnknownAction(name) => write!(f, "unknown action: '{}'", name),
            Self::MissingArgument(name) => write!(f, "missing argument {}", name),
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
