// src/fetch/mod.rs
// =============================================================================
// Getting bytes off the source website.
//
// Submodules:
// - source: the HTTP client (listing page + image bodies) behind a small trait
// - image: download one record's icon unless it is already on disk
// - pool: run the image downloads for a whole catalog with bounded concurrency
// =============================================================================

mod image;
mod pool;
mod source;

pub use pool::{default_workers, fetch_all, FetchReport};
pub use source::{HttpSite, ImageSource, ListingSource};

#[cfg(test)]
pub(crate) use image::tests::FakeSource;
