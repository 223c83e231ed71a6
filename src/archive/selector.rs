//! Ready-made selector that unpacks entries into a directory.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use super::header::{EntryHeader, EntryKind};

/// Join an archive path onto `root`, refusing anything that escapes it.
fn safe_join(root: &Path, entry: &Path) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    let mut depth = 0usize;

    for component in entry.components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (depth > 0).then_some(out)
}

/// A file that is created on first write or flush.
///
/// Creation errors surface as write errors, which fail the extraction.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
    error: Option<io::Error>,
}

impl FileSink {
    /// Sink that will create `path` (and its parent directories) lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            error: None,
        }
    }

    /// Sink whose every write or flush reports `error`.
    fn failed(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self {
            error: Some(error),
            ..Self::new(path)
        }
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> io::Result<&mut File> {
        if let Some(e) = &self.error {
            return Err(io::Error::new(e.kind(), e.to_string()));
        }
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                File::create(&self.path)?
            }
        };
        Ok(self.file.insert(file))
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file()?.flush()
    }
}

/// Selects regular files (optionally filtered by path prefix) and writes
/// them under a root directory.
#[derive(Debug, Clone)]
pub struct DirSelector {
    root: PathBuf,
    prefixes: Vec<PathBuf>,
}

impl DirSelector {
    /// Unpack every regular file under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefixes: Vec::new(),
        }
    }

    /// Only unpack entries whose path starts with `prefix`.
    ///
    /// May be called several times; an entry matching any prefix is kept.
    pub fn only(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    fn wanted(&self, path: &Path) -> bool {
        self.prefixes.is_empty() || self.prefixes.iter().any(|p| path.starts_with(p))
    }

    /// Pick a sink for `header`, or `None` to skip it.
    ///
    /// Directories are created eagerly and otherwise skipped. A directory
    /// that cannot be created comes back as a sink that fails on flush, so
    /// the extraction fails too. Links, special files, and paths that would
    /// leave the root are skipped.
    pub fn select(&self, header: &EntryHeader) -> Option<FileSink> {
        if !self.wanted(&header.path) {
            return None;
        }

        let Some(target) = safe_join(&self.root, &header.path) else {
            warn!(path = %header.path.display(), "skipping entry outside extraction root");
            return None;
        };

        match header.kind {
            EntryKind::File => {
                debug!(path = %target.display(), size = header.size, "unpacking");
                Some(FileSink::new(target))
            }
            EntryKind::Directory => match fs::create_dir_all(&target) {
                Ok(()) => None,
                Err(e) => {
                    warn!(path = %target.display(), error = %e, "failed to create directory");
                    Some(FileSink::failed(target, e))
                }
            },
            _ => None,
        }
    }

    /// Turn this into a selector closure for [`super::extract`].
    pub fn into_selector(self) -> impl FnMut(&EntryHeader) -> Option<FileSink> + Send + 'static {
        move |header: &EntryHeader| self.select(header)
    }
}

/// Selector that unpacks all regular files under `root`.
pub fn dir_selector(root: impl Into<PathBuf>) -> DirSelector {
    DirSelector::new(root)
}
