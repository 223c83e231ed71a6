//! # shellkit
//!
//! Small automation helpers for scripts written in Rust.
//!
//! ## Features
//!
//! - **Collecting runs**: run a shell command and get its output as text
//! - **Interactive runs**: run a command attached to the terminal
//! - **Ordered batches**: run commands one after another, stopping at the
//!   first failure
//! - **Archive extraction**: stream a `.tar.gz` and pick a destination per
//!   entry
//!
//! ## Quick Start
//!
//! ```no_run
//! use shellkit::{archive, execution};
//!
//! #[tokio::main]
//! async fn main() -> shellkit::Result<()> {
//!     shellkit::logging::try_init(None).ok();
//!
//!     let rev = execution::collect_output("git rev-parse --short HEAD").await?;
//!     println!("building {}", rev);
//!
//!     execution::print_outputs(["cargo build --release", "cargo test"]).await?;
//!
//!     let file = tokio::fs::File::open("dist.tar.gz").await?;
//!     let selector = archive::dir_selector("out").into_selector();
//!     archive::untar_files(file, selector).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;

// Re-export commonly used types
pub use archive::{extract, untar_files, EntryHeader, EntryKind, ExtractSummary};
pub use error::{ExecutionFailure, FailureReason, Result, ShellKitError};
pub use execution::{normalize, sanitize, Command, EchoPolicy, Runner, Shell};
