// src/catalog/mod.rs
// =============================================================================
// Everything about the catalog itself: the record type, turning the listing
// page into records, and writing the flat catalog file.
//
// Submodules:
// - record: ItemRecord and the filename derivation
// - extract: listing HTML -> Vec<ItemRecord>
// - file: Vec<ItemRecord> -> catalog file on disk
// =============================================================================

mod extract;
mod file;
mod record;

pub use extract::extract;
pub use file::write_catalog;
pub use record::ItemRecord;
