//! Archive entry headers as seen by sink selectors.

use std::io::{self, Read};
use std::path::PathBuf;

use tar::EntryType;

/// Kind of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file with a byte body.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Hard link to an earlier entry.
    HardLink,
    /// Anything else (devices, fifos, vendor extensions).
    Other(u8),
}

impl From<EntryType> for EntryKind {
    fn from(kind: EntryType) -> Self {
        if kind.is_file() || kind.is_contiguous() {
            Self::File
        } else if kind.is_dir() {
            Self::Directory
        } else if kind.is_symlink() {
            Self::Symlink
        } else if kind.is_hard_link() {
            Self::HardLink
        } else {
            Self::Other(kind.as_byte())
        }
    }
}

/// Header of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    /// Path inside the archive, long-name extensions applied.
    pub path: PathBuf,
    /// Body size in bytes.
    pub size: u64,
    /// Entry kind.
    pub kind: EntryKind,
    /// Link target for symlinks and hard links.
    pub link_name: Option<PathBuf>,
    /// Permission bits, when the header carries valid ones.
    pub mode: Option<u32>,
}

impl EntryHeader {
    /// Read the header fields of a tar entry.
    pub(crate) fn from_entry<R: Read>(entry: &tar::Entry<'_, R>) -> io::Result<Self> {
        Ok(Self {
            path: entry.path()?.into_owned(),
            size: entry.size(),
            kind: entry.header().entry_type().into(),
            link_name: entry.link_name()?.map(|p| p.into_owned()),
            mode: entry.header().mode().ok(),
        })
    }

    /// Check if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
