// src/config.rs
// =============================================================================
// Run configuration, built once from the command line.
//
// Nothing in here changes after startup; main.rs builds a Config and hands
// out references to it.
// =============================================================================

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use url::Url;

use crate::cli::Cli;
use crate::fetch::default_workers;

#[derive(Debug, Clone)]
pub struct Config {
    /// Host every listing and image path is relative to.
    pub base_url: Url,
    /// Path of the item listing page on `base_url`.
    pub listing_path: String,
    /// Maximum concurrent image downloads.
    pub workers: usize,
    pub image_dir: PathBuf,
    pub catalog_file: PathBuf,
    pub json: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let base_url = Url::parse(&cli.base_url)
            .map_err(|e| anyhow!("Invalid base URL '{}': {}", cli.base_url, e))?;

        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Base URL '{}' cannot have paths joined onto it", cli.base_url));
        }

        Ok(Self {
            base_url,
            listing_path: cli.listing_path,
            workers: cli.workers.unwrap_or_else(default_workers),
            image_dir: cli.image_dir,
            catalog_file: cli.catalog_file,
            json: cli.json,
        })
    }

    pub fn listing_url(&self) -> Result<Url> {
        self.base_url
            .join(&self.listing_path)
            .map_err(|e| anyhow!("Invalid listing path '{}': {}", self.listing_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults_point_at_item_list() {
        let config = Config::from_cli(parse(&["item-harvest", "icons", "items.csv"])).unwrap();

        assert_eq!(
            config.listing_url().unwrap().as_str(),
            "https://www.digminecraft.com/lists/item_id_list_pc_1_8.php"
        );
        assert!(config.workers >= 1);
        assert_eq!(config.image_dir, PathBuf::from("icons"));
        assert_eq!(config.catalog_file, PathBuf::from("items.csv"));
        assert!(!config.json);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_cli(parse(&[
            "item-harvest",
            "icons",
            "items.csv",
            "--base-url",
            "http://localhost:8080",
            "--listing-path",
            "/items.html",
            "--workers",
            "4",
            "--json",
        ]))
        .unwrap();

        assert_eq!(config.listing_url().unwrap().as_str(), "http://localhost:8080/items.html");
        assert_eq!(config.workers, 4);
        assert!(config.json);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let cli = parse(&["item-harvest", "icons", "items.csv", "--base-url", "not a url"]);
        assert!(Config::from_cli(cli).is_err());
    }
}
