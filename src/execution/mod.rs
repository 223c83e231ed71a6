//! Command execution engine.
//!
//! This module provides command execution capabilities:
//! - Collecting runs that capture stdout/stderr as text
//! - Interactive runs attached to the terminal
//! - Strictly sequential batches that stop at the first failure
//!
//! # Example
//!
//! ```no_run
//! use shellkit::execution::{collect_output, collect_outputs, print_output};
//!
//! # async fn demo() -> shellkit::Result<()> {
//! let branch = collect_output("git rev-parse --abbrev-ref HEAD").await?;
//! let tags = collect_outputs(["git tag --list", "git describe --tags"]).await?;
//!
//! // Long multi-line commands are collapsed onto one line before running.
//! print_output(
//!     "cargo build
//!         --release
//!         --locked",
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

mod command;
mod executor;
mod result;
pub mod sequence;

pub use command::{normalize, Command, Shell};
pub use executor::{
    collect_output, collect_outputs, print_output, print_outputs, EchoPolicy, Runner,
};
pub use result::{sanitize, CapturedOutput};
