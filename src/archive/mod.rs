//! Streaming extraction of gzip-compressed tar archives.
//!
//! The caller decides, entry by entry, where bytes go:
//!
//! ```no_run
//! use std::fs::File;
//! use shellkit::archive::{extract, dir_selector};
//!
//! # fn demo() -> shellkit::Result<()> {
//! // Keep just the README, straight into a file.
//! let readme = File::create("README.md")?;
//! let mut readme = Some(readme);
//! extract(File::open("release.tar.gz")?, |header| {
//!     if header.path.ends_with("README.md") { readme.take() } else { None }
//! })?;
//!
//! // Or unpack everything under `bin/` into a directory.
//! let selector = dir_selector("out").only("bin");
//! extract(File::open("release.tar.gz")?, |header| selector.select(header))?;
//! # Ok(())
//! # }
//! ```

mod extractor;
mod header;
mod selector;

pub use extractor::{extract, untar_files, ExtractPhase, ExtractSummary};
pub use header::{EntryHeader, EntryKind};
pub use selector::{dir_selector, DirSelector, FileSink};
