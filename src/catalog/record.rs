// src/catalog/record.rs
// =============================================================================
// One catalog entry.
//
// Records are built once by the extractor and never change afterwards, so the
// fields are private and only readable through accessors. The constructor is
// the single place where the qualified id is checked and the local image
// filename is derived.
// =============================================================================

use serde::Serialize;

/// Separator between the namespace and the rest of a qualified id
/// (`minecraft:oak_fence_gate`).
const NAMESPACE_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    name: String,
    #[serde(rename = "id_name")]
    qualified_id: String,
    #[serde(rename = "id")]
    numeric_id: i32,
    #[serde(rename = "data_value")]
    variant: i32,
    #[serde(rename = "image_src")]
    remote_image_path: String,
    #[serde(rename = "image_path")]
    local_image_filename: String,
}

impl ItemRecord {
    // Builds a record and derives its local image filename
    //
    // Parameters:
    //   name: display name as shown in the listing
    //   qualified_id: namespaced id, e.g. "minecraft:fence_gate"
    //   numeric_id: legacy numeric id
    //   variant: data value / sub-type
    //   remote_image_path: icon path relative to the source host
    //
    // Returns: None when the qualified id has no usable short id (see short_id_of)
    //
    // Example:
    //   ("Melon", "minecraft:melon", 360, 0, "/images/melon.png")
    //   -> local_image_filename = "melon melon.png"
    pub fn new(
        name: impl Into<String>,
        qualified_id: impl Into<String>,
        numeric_id: i32,
        variant: i32,
        remote_image_path: impl Into<String>,
    ) -> Option<Self> {
        let qualified_id = qualified_id.into();
        let remote_image_path = remote_image_path.into();

        // The short id goes in front of the basename, so items that share
        // one icon file still get their own file on disk
        let short_id = short_id_of(&qualified_id)?;
        let local_image_filename = format!("{} {}", short_id, basename(&remote_image_path));

        Some(Self {
            name: name.into(),
            qualified_id,
            numeric_id,
            variant,
            remote_image_path,
            local_image_filename,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_id(&self) -> &str {
        &self.qualified_id
    }

    pub fn numeric_id(&self) -> i32 {
        self.numeric_id
    }

    pub fn variant(&self) -> i32 {
        self.variant
    }

    pub fn remote_image_path(&self) -> &str {
        &self.remote_image_path
    }

    /// `<short id> <remote basename>`; unique even when two items share art.
    pub fn local_image_filename(&self) -> &str {
        &self.local_image_filename
    }

    /// The part of the qualified id after the namespace separator.
    pub fn short_id(&self) -> &str {
        // new() already proved the separator is there
        short_id_of(&self.qualified_id).unwrap_or_default()
    }
}

// Splits off the short id ("fence_gate" from "minecraft:fence_gate")
//
// Returns None when:
//   - there is no namespace separator
//   - nothing follows the separator
//   - the rest could leave the image folder once used as a filename
//     (path separators or "..")
fn short_id_of(qualified_id: &str) -> Option<&str> {
    match qualified_id.split_once(NAMESPACE_SEPARATOR) {
        Some((_, rest)) if !rest.is_empty() && is_plain_file_name(rest) => Some(rest),
        _ => None,
    }
}

fn is_plain_file_name(part: &str) -> bool {
    !part.contains(['/', '\\']) && !part.contains("..")
}

// Last path segment of the remote path; both slash kinds count as separators
// so the result is always a bare file name
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
