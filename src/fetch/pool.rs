// src/fetch/pool.rs
// =============================================================================
// Runs ensure_image for every record with a bounded number in flight.
//
// All downloads are queued up front as a stream of futures and driven with
// buffer_unordered(workers): at most `workers` run at once, results come back
// in completion order, and every single one is awaited. A failed item is
// logged and recorded in the report; it never stops its siblings.
//
// Catalog order is not affected: the report only counts outcomes, the
// records themselves stay in the order the extractor produced them.
// =============================================================================

use futures::stream::{self, StreamExt};
use std::path::Path;
use std::thread::available_parallelism;
use tracing::{info, warn};

use super::image::{ensure_image, ImageOutcome};
use super::source::ImageSource;
use crate::catalog::ItemRecord;
use crate::error::{FetchError, ItemFailure};

/// Summary of one fetch_all run.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Images downloaded during this run.
    pub downloaded: usize,
    /// Total size of the downloaded images.
    pub bytes: u64,
    /// Images that were already on disk.
    pub cached: usize,
    /// Items whose image could not be fetched or written.
    pub failures: Vec<ItemFailure>,
}

impl FetchReport {
    /// True when every record has its image on disk.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One worker per CPU, minus one for everything else, never less than one.
pub fn default_workers() -> usize {
    available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

/// Makes sure every record's image exists in `dir`, creating `dir` if needed.
///
/// Only failing to create `dir` is returned as an error; per-item failures
/// end up in [`FetchReport::failures`].
pub async fn fetch_all<S: ImageSource>(
    source: &S,
    records: &[ItemRecord],
    dir: &Path,
    workers: usize,
) -> Result<FetchReport, FetchError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| FetchError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let workers = workers.max(1);
    info!(records = records.len(), workers, dir = %dir.display(), "fetching images");

    let tasks = records.iter().map(|record| async move {
        let result = ensure_image(source, record, dir).await;
        (record, result)
    });

    let results: Vec<_> = stream::iter(tasks).buffer_unordered(workers).collect().await;

    let mut report = FetchReport::default();
    for (record, result) in results {
        match result {
            Ok(ImageOutcome::Cached) => report.cached += 1,
            Ok(ImageOutcome::Downloaded { bytes }) => {
                report.downloaded += 1;
                report.bytes += bytes;
            }
            Err(error) => {
                warn!(id = record.qualified_id(), error = %error, "image fetch failed");
                report.failures.push(ItemFailure {
                    qualified_id: record.qualified_id().to_string(),
                    error,
                });
            }
        }
    }

    info!(
        downloaded = report.downloaded,
        bytes = report.bytes,
        cached = report.cached,
        failed = report.failures.len(),
        "image fetch finished"
    );
    Ok(report)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why buffer_unordered instead of tokio::spawn per image?
//    - The futures borrow `source`, `records` and `dir`; spawned tasks would
//      need everything to be 'static (Arc + clones)
//    - buffer_unordered(N) polls up to N futures at once and yields results
//      as they finish
//
// 2. Why `async move` inside the map?
//    - It moves the *references* (record, source, dir) into each future,
//      not the data they point to
//
// 3. Why is creating the folder an error but a failed image is not?
//    - Without the folder no image can be written, so there is nothing to
//      attempt; a single bad image only affects its own item
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::image::tests::FakeSource;
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;

    fn records(count: usize) -> Vec<ItemRecord> {
        (0..count)
            .map(|i| {
                ItemRecord::new(
                    format!("Item {i}"),
                    format!("minecraft:item_{i}"),
                    i as i32,
                    0,
                    format!("/images/item_{i}.png"),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_default_workers_is_at_least_one() {
        assert!(default_workers() >= 1);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let records = records(8);
        let source = FakeSource {
            failing: HashSet::from(["/images/item_3.png".to_string()]),
            ..Default::default()
        };

        let report = fetch_all(&source, &records, dir.path(), 3).await.unwrap();

        assert_eq!(report.downloaded, 7);
        assert_eq!(report.cached, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].qualified_id, "minecraft:item_3");
        assert!(!report.is_clean());
        assert_eq!(source.calls.load(Ordering::SeqCst), 8);

        let written = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(written, 7);
    }

    #[tokio::test]
    async fn test_creates_directory_and_reuses_it() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("icons");
        let records = records(4);
        let source = FakeSource::default();

        let first = fetch_all(&source, &records, &dir, 2).await.unwrap();
        let second = fetch_all(&source, &records, &dir, 2).await.unwrap();

        assert_eq!(first.downloaded, 4);
        assert_eq!(first.bytes, 4 * "/images/item_0.png".len() as u64);
        assert!(first.is_clean());
        assert_eq!(second.downloaded, 0);
        assert_eq!(second.cached, 4);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_zero_workers_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default();

        let report = fetch_all(&source, &records(2), dir.path(), 0).await.unwrap();

        assert_eq!(report.downloaded, 2);
    }

    #[tokio::test]
    async fn test_directory_that_cannot_be_created_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let source = FakeSource::default();

        let result = fetch_all(&source, &records(1), &blocker.join("icons"), 1).await;

        assert!(matches!(result, Err(FetchError::Io { .. })));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
