// src/catalog/file.rs
// =============================================================================
// Writes the catalog as a flat, comma-space separated text file:
//
//   name, id_name, id, data_value, image_path
//   Oak Fence Gate, minecraft:fence_gate, 107, 0, images/fence_gate oak_fence_gate.png
//
// Values are written as-is. There is no quoting, so a name containing ", "
// would shift the columns of its line; no item on the source page does.
// =============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::record::ItemRecord;

const HEADER: &str = "name, id_name, id, data_value, image_path";
const SEPARATOR: &str = ", ";

/// Writes `records` to `path`, pointing each image_path into `image_dir`.
pub fn write_catalog(path: &Path, image_dir: &Path, records: &[ItemRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create catalog file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", HEADER)?;
    for record in records {
        writeln!(out, "{}", catalog_line(record, image_dir))?;
    }
    out.flush()
        .with_context(|| format!("cannot write catalog file {}", path.display()))?;

    Ok(())
}

fn catalog_line(record: &ItemRecord, image_dir: &Path) -> String {
    let image_path = format!("{}/{}", image_dir.display(), record.local_image_filename());

    [
        record.name().to_string(),
        record.qualified_id().to_string(),
        record.numeric_id().to_string(),
        record.variant().to_string(),
        image_path,
    ]
    .join(SEPARATOR)
}
