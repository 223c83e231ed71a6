//! Gzip tar extraction pipeline.
//!
//! Three stages run in lockstep on one reader:
//! 1. decompressor: gzip members are inflated on demand
//! 2. demultiplexer: tar framing yields one entry at a time
//! 3. router: the selector picks a sink per entry, or the body is drained
//!
//! Each stage pulls from the previous one, so a slow sink slows the whole
//! pipeline down instead of buffering.

use std::io::{self, Read, Write};

use flate2::read::MultiGzDecoder;
use tokio::io::AsyncRead;
use tokio_util::io::SyncIoBridge;
use tracing::{debug, trace, warn};

use super::header::EntryHeader;
use crate::error::ShellKitError;
use crate::Result;

/// Progress of one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractPhase {
    /// Nothing read yet.
    #[default]
    Idle,
    /// Decompression started, waiting for the next header.
    Streaming,
    /// A header was parsed and handed to the selector.
    HeaderReceived,
    /// The entry body is being copied or drained.
    BodyStreaming,
    /// The entry body reached its end.
    BodyComplete,
    /// All entries were consumed.
    Finished,
    /// A stream error ended the extraction.
    Failed,
}

impl ExtractPhase {
    /// Check if transition to target phase is valid.
    ///
    /// Valid transitions:
    /// - Idle -> Streaming
    /// - Streaming | BodyComplete -> HeaderReceived
    /// - HeaderReceived -> BodyStreaming
    /// - BodyStreaming -> BodyComplete
    /// - Streaming | BodyComplete -> Finished
    /// - any non-terminal phase -> Failed
    pub fn can_transition_to(&self, target: ExtractPhase) -> bool {
        use ExtractPhase::*;
        match (*self, target) {
            (Idle, Streaming)
            | (Streaming | BodyComplete, HeaderReceived)
            | (HeaderReceived, BodyStreaming)
            | (BodyStreaming, BodyComplete)
            | (Streaming | BodyComplete, Finished) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Check if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExtractPhase::Finished | ExtractPhase::Failed)
    }
}

/// Counts reported after a successful extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractSummary {
    /// Entries visited.
    pub entries: usize,
    /// Entries routed to a sink.
    pub written: usize,
    /// Bytes copied into sinks.
    pub bytes_written: u64,
}

/// Stage 3: hands each entry to the selector and moves its body.
struct EntryRouter<F> {
    selector: F,
    phase: ExtractPhase,
    summary: ExtractSummary,
}

impl<F, W> EntryRouter<F>
where
    F: FnMut(&EntryHeader) -> Option<W>,
    W: Write,
{
    fn new(selector: F) -> Self {
        Self {
            selector,
            phase: ExtractPhase::Idle,
            summary: ExtractSummary::default(),
        }
    }

    fn advance(&mut self, target: ExtractPhase) -> io::Result<()> {
        if !self.phase.can_transition_to(target) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("invalid extraction phase change {:?} -> {:?}", self.phase, target),
            ));
        }
        trace!(from = ?self.phase, to = ?target, "extraction phase");
        self.phase = target;
        Ok(())
    }

    fn run<R: Read>(&mut self, reader: R) -> io::Result<ExtractSummary> {
        self.advance(ExtractPhase::Streaming)?;

        // Stages 1 and 2.
        let mut archive = tar::Archive::new(MultiGzDecoder::new(reader));
        for entry in archive.entries()? {
            self.route(entry?)?;
        }

        // Read past the end-of-archive blocks so gzip trailers get checked.
        io::copy(&mut archive.into_inner(), &mut io::sink())?;

        self.advance(ExtractPhase::Finished)?;
        Ok(self.summary)
    }

    fn route<R: Read>(&mut self, mut entry: tar::Entry<'_, R>) -> io::Result<()> {
        let header = EntryHeader::from_entry(&entry)?;
        self.advance(ExtractPhase::HeaderReceived)?;

        let sink = (self.selector)(&header);
        self.advance(ExtractPhase::BodyStreaming)?;

        match sink {
            Some(mut sink) => {
                let copied = io::copy(&mut entry, &mut sink)?;
                sink.flush()?;
                debug!(path = %header.path.display(), bytes = copied, "entry written");
                self.summary.written += 1;
                self.summary.bytes_written += copied;
            }
            None => {
                let drained = io::copy(&mut entry, &mut io::sink())?;
                trace!(path = %header.path.display(), bytes = drained, "entry skipped");
            }
        }

        self.advance(ExtractPhase::BodyComplete)?;
        self.summary.entries += 1;
        Ok(())
    }
}

/// Extract a gzip-compressed tar stream, routing entries through `selector`.
///
/// The selector runs once per entry, in archive order, before the entry's
/// body is read. A returned sink receives the full body and is flushed
/// before the next entry is read; `None` drains the body.
///
/// Any decompression, framing, or sink error fails the whole extraction.
/// Sinks completed before the error keep what they received.
pub fn extract<R, F, W>(reader: R, selector: F) -> Result<ExtractSummary>
where
    R: Read,
    F: FnMut(&EntryHeader) -> Option<W>,
    W: Write,
{
    let mut router = EntryRouter::new(selector);
    match router.run(reader) {
        Ok(summary) => {
            debug!(
                entries = summary.entries,
                written = summary.written,
                bytes = summary.bytes_written,
                "extraction finished"
            );
            Ok(summary)
        }
        Err(e) => {
            let _ = router.advance(ExtractPhase::Failed);
            warn!(error = %e, entries = router.summary.entries, "extraction failed");
            Err(ShellKitError::Archive(e))
        }
    }
}

/// Async form of [`extract`] for tokio readers.
///
/// The pipeline runs on the blocking pool; the reader is bridged into it
/// and sinks are created and written on that thread.
pub async fn untar_files<R, F, W>(reader: R, selector: F) -> Result<ExtractSummary>
where
    R: AsyncRead + Unpin + Send + 'static,
    F: FnMut(&EntryHeader) -> Option<W> + Send + 'static,
    W: Write + 'static,
{
    let bridge = SyncIoBridge::new(reader);
    tokio::task::spawn_blocking(move || extract(bridge, selector))
        .await
        .map_err(|e| ShellKitError::Join(e.to_string()))?
}
