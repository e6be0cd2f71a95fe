// src/fetch/image.rs
// =============================================================================
// Makes sure one item's icon exists on disk.
//
// The image folder doubles as a cache between runs: if a file with the
// record's local filename is already there, nothing is downloaded. Existence
// is the only check, so a file truncated by an interrupted run is kept as-is
// until someone deletes it. The body is written straight into the final path
// (no temp file + rename).
// =============================================================================

use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::source::{ImageBody, ImageSource};
use crate::catalog::ItemRecord;
use crate::error::FetchError;

/// What ensure_image had to do for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    /// The file was already present; no request was made.
    Cached,
    /// The file was downloaded; `bytes` were written.
    Downloaded { bytes: u64 },
}

/// Downloads the record's image into `dir` unless it is already there.
pub async fn ensure_image<S: ImageSource>(
    source: &S,
    record: &ItemRecord,
    dir: &Path,
) -> Result<ImageOutcome, FetchError> {
    let path = dir.join(record.local_image_filename());

    let exists = fs::try_exists(&path).await.map_err(|source| FetchError::Io {
        path: path.clone(),
        source,
    })?;
    if exists {
        debug!(id = record.qualified_id(), path = %path.display(), "image already present");
        return Ok(ImageOutcome::Cached);
    }

    // Open the remote body first so a failed request leaves no empty file behind
    let mut body = source.open(record.remote_image_path()).await?;

    let io_error = |source: std::io::Error| FetchError::Io {
        path: path.clone(),
        source,
    };
    let mut file = File::create(&path).await.map_err(io_error)?;

    let mut bytes = 0u64;
    while let Some(chunk) = body.chunk().await? {
        file.write_all(&chunk).await.map_err(io_error)?;
        bytes += chunk.len() as u64;
    }
    file.flush().await.map_err(io_error)?;

    debug!(id = record.qualified_id(), bytes, "image downloaded");
    Ok(ImageOutcome::Downloaded { bytes })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::{HashSet, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source: serves the path itself as the image bytes, in two
    /// chunks, and fails every path listed in `failing`.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub calls: AtomicUsize,
        pub failing: HashSet<String>,
    }

    pub(crate) struct FakeBody(VecDeque<Bytes>);

    impl ImageBody for FakeBody {
        async fn chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
            Ok(self.0.pop_front())
        }
    }

    impl ImageSource for FakeSource {
        type Body = FakeBody;

        async fn open(&self, remote_path: &str) -> Result<FakeBody, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;

            if self.failing.contains(remote_path) {
                return Err(FetchError::Status {
                    url: remote_path.to_string(),
                    status: 503,
                });
            }

            let (head, tail) = remote_path.split_at(remote_path.len() / 2);
            Ok(FakeBody(VecDeque::from([
                Bytes::copy_from_slice(head.as_bytes()),
                Bytes::copy_from_slice(tail.as_bytes()),
            ])))
        }
    }

    fn stone() -> ItemRecord {
        ItemRecord::new("Stone", "minecraft:stone", 1, 0, "/images/stone.png").unwrap()
    }

    #[tokio::test]
    async fn test_downloads_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default();

        let outcome = ensure_image(&source, &stone(), dir.path()).await.unwrap();

        assert_eq!(outcome, ImageOutcome::Downloaded { bytes: 17 });
        let written = std::fs::read(dir.path().join("stone stone.png")).unwrap();
        assert_eq!(written, b"/images/stone.png");
    }

    #[tokio::test]
    async fn test_second_call_makes_no_request() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default();
        let record = stone();

        ensure_image(&source, &record, dir.path()).await.unwrap();
        let outcome = ensure_image(&source, &record, dir.path()).await.unwrap();

        assert_eq!(outcome, ImageOutcome::Cached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_existing_file_is_never_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stone stone.png");
        std::fs::write(&path, b"trunc").unwrap();
        let source = FakeSource::default();

        let outcome = ensure_image(&source, &stone(), dir.path()).await.unwrap();

        assert_eq!(outcome, ImageOutcome::Cached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read(&path).unwrap(), b"trunc");
    }

    #[tokio::test]
    async fn test_failed_request_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource {
            failing: HashSet::from(["/images/stone.png".to_string()]),
            ..Default::default()
        };

        let err = ensure_image(&source, &stone(), dir.path()).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert!(!dir.path().join("stone stone.png").exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-created");
        let source = FakeSource::default();

        let err = ensure_image(&source, &stone(), &missing).await.unwrap_err();

        assert!(matches!(err, FetchError::Io { .. }));
    }
}
