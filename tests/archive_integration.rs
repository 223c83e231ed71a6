//! Archive extraction integration tests.
//!
//! Fixtures are built in memory with `tar` + `flate2`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use flate2::write::GzEncoder;
use flate2::Compression;
use shellkit::archive::{dir_selector, extract, untar_files, EntryKind};
use shellkit::ShellKitError;

/// Cloneable in-memory sink shared with the test body.
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn gzip_tar_bytes<'a>(files: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn gzip_tar(files: &[(&str, &str)]) -> Vec<u8> {
    gzip_tar_bytes(files.iter().map(|(path, data)| (*path, data.as_bytes())))
}

/// Bytes that deflate cannot shrink much, so truncating the gzip stream
/// cuts into the entry body.
fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_extract_selected_entry_only() {
    let archive = gzip_tar(&[("a.txt", "1"), ("b.txt", "2")]);
    let a_sink = SharedSink::default();
    let mut visited = Vec::new();

    let summary = extract(archive.as_slice(), |header| {
        visited.push(header.path.to_string_lossy().into_owned());
        (header.path.to_str() == Some("a.txt")).then(|| a_sink.clone())
    })
    .unwrap();

    assert_eq!(a_sink.contents(), b"1");
    assert_eq!(visited, vec!["a.txt", "b.txt"]);
    assert_eq!(summary.entries, 2);
    assert_eq!(summary.written, 1);
}

#[test]
fn test_extract_large_entry_streams_fully() {
    let big = noise(256 * 1024);
    let archive = gzip_tar_bytes([("big.bin", big.as_slice()), ("after.txt", b"tail".as_slice())]);
    let big_sink = SharedSink::default();
    let after_sink = SharedSink::default();

    extract(archive.as_slice(), |header| match header.path.to_str() {
        Some("big.bin") => Some(big_sink.clone()),
        Some("after.txt") => Some(after_sink.clone()),
        _ => None,
    })
    .unwrap();

    assert_eq!(big_sink.contents(), big);
    assert_eq!(after_sink.contents(), b"tail");
}

#[test]
fn test_extract_reports_headers() {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    dir.set_cksum();
    builder.append_data(&mut dir, "pkg/", io::empty()).unwrap();

    let mut link = tar::Header::new_gnu();
    link.set_entry_type(tar::EntryType::Symlink);
    link.set_size(0);
    link.set_link_name("v1").unwrap();
    builder
        .append_data(&mut link, "pkg/latest", io::empty())
        .unwrap();

    let archive = builder.into_inner().unwrap().finish().unwrap();

    let mut headers = Vec::new();
    extract(archive.as_slice(), |header| {
        headers.push(header.clone());
        None::<SharedSink>
    })
    .unwrap();

    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0].kind, EntryKind::Directory);
    assert_eq!(headers[0].mode, Some(0o755));
    assert_eq!(headers[1].kind, EntryKind::Symlink);
    assert_eq!(
        headers[1].link_name.as_deref(),
        Some(std::path::Path::new("v1"))
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_truncated_gzip_rejects() {
    let big = noise(64 * 1024);
    let archive = gzip_tar_bytes([("a.txt", b"1".as_slice()), ("big.bin", big.as_slice())]);
    let truncated = &archive[..archive.len() / 2];

    let a_sink = SharedSink::default();
    let big_sink = SharedSink::default();

    let result = extract(truncated, |header| match header.path.to_str() {
        Some("a.txt") => Some(a_sink.clone()),
        Some("big.bin") => Some(big_sink.clone()),
        _ => None,
    });

    assert!(matches!(result, Err(ShellKitError::Archive(_))));
    // The entry completed before the cut keeps its data.
    assert_eq!(a_sink.contents(), b"1");
    assert!(big_sink.contents().len() < big.len());
}

#[test]
fn test_truncated_trailer_rejects() {
    let archive = gzip_tar(&[("a.txt", "1")]);
    // Drop the CRC32/ISIZE trailer only.
    let truncated = &archive[..archive.len() - 4];

    let result = extract(truncated, |_| None::<SharedSink>);
    assert!(matches!(result, Err(ShellKitError::Archive(_))));
}

#[test]
fn test_bad_tar_framing_rejects() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&[b'x'; 1024]).unwrap();
    let not_a_tar = encoder.finish().unwrap();

    let result = extract(not_a_tar.as_slice(), |_| None::<SharedSink>);
    assert!(matches!(result, Err(ShellKitError::Archive(_))));
}

// ============================================================================
// Directory unpacking
// ============================================================================

#[tokio::test]
async fn test_untar_into_directory() {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data) in [("bin/tool", "#!/bin/sh\n"), ("share/doc/readme.txt", "docs")] {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, data.as_bytes()).unwrap();
    }
    // The builder refuses `..`, so write the name field by hand.
    let mut evil = tar::Header::new_old();
    evil.as_old_mut().name[..13].copy_from_slice(b"../escape.txt");
    evil.set_size(4);
    evil.set_mode(0o644);
    evil.set_cksum();
    builder.append(&evil, &b"nope"[..]).unwrap();
    let archive = builder.into_inner().unwrap().finish().unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let archive_path = tmp.path().join("dist.tar.gz");
    fs::write(&archive_path, &archive).unwrap();
    let out = tmp.path().join("out");

    let file = tokio::fs::File::open(&archive_path).await.unwrap();
    let summary = untar_files(file, dir_selector(&out).into_selector())
        .await
        .unwrap();

    assert_eq!(summary.entries, 3);
    assert_eq!(summary.written, 2);
    assert_eq!(fs::read_to_string(out.join("bin/tool")).unwrap(), "#!/bin/sh\n");
    assert_eq!(
        fs::read_to_string(out.join("share/doc/readme.txt")).unwrap(),
        "docs"
    );
    assert!(!tmp.path().join("escape.txt").exists());
}

#[tokio::test]
async fn test_untar_with_prefix_filter() {
    let archive = gzip_tar(&[("bin/tool", "x"), ("lib/libx.so", "y")]);
    let tmp = tempfile::tempdir().unwrap();

    let selector = dir_selector(tmp.path()).only("lib").into_selector();
    untar_files(std::io::Cursor::new(archive), selector)
        .await
        .unwrap();

    assert!(tmp.path().join("lib/libx.so").exists());
    assert!(!tmp.path().join("bin/tool").exists());
}

#[tokio::test]
async fn test_untar_sink_creation_failure() {
    let archive = gzip_tar(&[("blocked/file.txt", "data")]);
    let tmp = tempfile::tempdir().unwrap();
    // A regular file where a directory is needed.
    File::create(tmp.path().join("blocked")).unwrap();

    let result = untar_files(
        std::io::Cursor::new(archive),
        dir_selector(tmp.path()).into_selector(),
    )
    .await;

    assert!(matches!(result, Err(ShellKitError::Archive(_))));
}

#[tokio::test]
async fn test_untar_directory_creation_failure() {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    dir.set_cksum();
    builder.append_data(&mut dir, "blocked/", io::empty()).unwrap();
    let archive = builder.into_inner().unwrap().finish().unwrap();

    let tmp = tempfile::tempdir().unwrap();
    File::create(tmp.path().join("blocked")).unwrap();

    let result = untar_files(
        std::io::Cursor::new(archive),
        dir_selector(tmp.path()).into_selector(),
    )
    .await;

    assert!(matches!(result, Err(ShellKitError::Archive(_))));
    assert!(!tmp.path().join("blocked").is_dir());
}
