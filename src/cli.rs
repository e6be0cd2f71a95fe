// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
//   item-harvest <IMAGE_DIR> <CATALOG_FILE> [--base-url URL] [--listing-path PATH]
//                [--workers N] [--json]
//
// Both positional arguments are required. When one is missing clap prints the
// usage to stderr and exits with status 2.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "item-harvest",
    version,
    about = "Scrapes the item catalog and downloads every item icon",
    long_about = "item-harvest reads the item ID list from the reference site, downloads each item's \
                  icon into IMAGE_DIR (skipping icons already there) and writes a flat catalog \
                  file listing name, id name, id, data value and image path."
)]
pub struct Cli {
    /// Folder to save item icons into (created if missing)
    pub image_dir: PathBuf,

    /// Catalog file to write
    pub catalog_file: PathBuf,

    /// Site hosting the item list and the icons
    #[arg(long, default_value = "https://www.digminecraft.com")]
    pub base_url: String,

    /// Path of the item list page on the site
    #[arg(long, default_value = "/lists/item_id_list_pc_1_8.php")]
    pub listing_path: String,

    /// Concurrent downloads (default: CPU count - 1, at least 1)
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

fn parse_workers(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
