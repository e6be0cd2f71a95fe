// src/main.rs
// =============================================================================
// Entry point.
//
// What happens here:
// 1. Parse command-line arguments and build the run Config
// 2. Download the item list page and extract the catalog from it
// 3. Download every item icon that is not on disk yet
// 4. Write the catalog file and print a summary
// 5. Exit with 0 = all good, 1 = some icons failed, 2 = the run failed
//
// The catalog is written even when some icons failed: the records come from
// the listing page and are complete either way, and the next run picks up the
// missing icons.
// =============================================================================

mod catalog;
mod cli;
mod config;
mod error;
mod fetch;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog::ItemRecord;
use cli::Cli;
use config::Config;
use fetch::{FetchReport, HttpSite, ImageSource, ListingSource};

#[tokio::main]
async fn main() {
    init_tracing();

    std::process::exit(exit_code(run().await));
}

// Maps the run result to the process exit code
//
// Returns:
//   0 = every icon is on disk
//   1 = catalog written, but some icons failed
//   2 = fatal error (listing, extraction, config, catalog file)
fn exit_code(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    }
}

// Logs go to stderr so --json output on stdout stays parseable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("item_harvest=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Reads the command line and runs against the real website.
async fn run() -> Result<i32> {
    let config = Config::from_cli(Cli::parse())?;
    let site = HttpSite::new(config.base_url.clone()).context("cannot build HTTP client")?;

    run_with(&config, &site).await
}

// The whole pipeline, against any site
//
// Parameters:
//   config: output paths, worker count, output mode
//   site: where the listing page and the icons come from
//
// Returns: Ok(0) or Ok(1) as described in exit_code; Err for fatal errors
async fn run_with<S>(config: &Config, site: &S) -> Result<i32>
where
    S: ImageSource + ListingSource,
{
    let listing_url = config.listing_url()?;

    info!(url = %listing_url, "downloading item list");
    let html = site
        .fetch_listing(&config.listing_path)
        .await
        .context("cannot download the item list")?;

    let records = catalog::extract(&html).context("item list is not in the expected format")?;
    if !config.json {
        println!("📄 Found {} item(s)", records.len());
    }

    let report = fetch::fetch_all(site, &records, &config.image_dir, config.workers)
        .await
        .with_context(|| format!("cannot prepare image folder {}", config.image_dir.display()))?;

    catalog::write_catalog(&config.catalog_file, &config.image_dir, &records)?;

    if config.json {
        print_json(config, &records, &report)?;
    } else {
        print_summary(&config.catalog_file, &records, &report);
    }

    Ok(if report.is_clean() { 0 } else { 1 })
}

#[derive(Serialize)]
struct RunSummary<'a> {
    catalog_file: &'a Path,
    image_dir: &'a Path,
    downloaded: usize,
    bytes: u64,
    cached: usize,
    failures: Vec<FailureSummary<'a>>,
    items: &'a [ItemRecord],
}

#[derive(Serialize)]
struct FailureSummary<'a> {
    id_name: &'a str,
    error: String,
}

fn print_json(config: &Config, records: &[ItemRecord], report: &FetchReport) -> Result<()> {
    let summary = RunSummary {
        catalog_file: &config.catalog_file,
        image_dir: &config.image_dir,
        downloaded: report.downloaded,
        bytes: report.bytes,
        cached: report.cached,
        failures: report
            .failures
            .iter()
            .map(|failure| FailureSummary {
                id_name: &failure.qualified_id,
                error: failure.error.to_string(),
            })
            .collect(),
        items: records,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_summary(catalog_file: &Path, records: &[ItemRecord], report: &FetchReport) {
    if !report.failures.is_empty() {
        println!("\n❌ Failed downloads:");
        for failure in &report.failures {
            println!("   {}", failure);
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   ⬇️  Downloaded: {} ({} bytes)", report.downloaded, report.bytes);
    println!("   💾 Already present: {}", report.cached);
    println!("   ❌ Failed: {}", report.failures.len());
    println!("   📋 Catalog: {} item(s) -> {}", records.len(), catalog_file.display());
}
