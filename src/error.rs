// src/error.rs
// =============================================================================
// Typed errors for the two stages that can fail in interesting ways.
//
// - ExtractError: the listing page no longer looks the way we expect. Any of
//   these aborts the run, because a catalog built from a drifted page
//   cannot be trusted.
// - FetchError: one image could not be downloaded or written. These are
//   collected per item and never stop the other downloads.
//
// main.rs wraps everything else in anyhow, which is enough for an application
// that only needs to print the error and pick an exit code.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Raised when a listing row does not have the expected shape.
///
/// `row` is the 1-based data row number (the header row is not counted).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("listing page contains no <table>")]
    MissingTable,

    #[error("row {row}: expected 4 cells, found {found}")]
    CellCount { row: usize, found: usize },

    #[error("row {row}: image cell has no <img>")]
    MissingImage { row: usize },

    #[error("row {row}: <img> has no '{attr}' attribute")]
    MissingAttribute { row: usize, attr: &'static str },

    #[error("row {row}: name cell has no display name")]
    MissingName { row: usize },

    #[error("row {row}: name '{name}' does not match image alt text '{alt}'")]
    AltMismatch { row: usize, name: String, alt: String },

    #[error("row {row}: malformed qualified id '{raw}'")]
    QualifiedId { row: usize, raw: String },

    #[error("row {row} ({id}): variant '{raw}' is not an integer")]
    Variant { row: usize, id: String, raw: String },
}

/// Raised while fetching or storing a single image.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot build a URL from '{path}': {source}")]
    BadPath {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A fetch failure tagged with the item it belongs to.
#[derive(Debug, Error)]
#[error("{qualified_id}: {error}")]
pub struct ItemFailure {
    pub qualified_id: String,
    #[source]
    pub error: FetchError,
}
