//! Feed Validation Binary
//!
//! Validates the persisted RSS feed before it is published:
//! - Reports errors (duplicate or missing links, bad guids, bad pubDates)
//! - Reports warnings (empty titles or descriptions)
//! - Exits with status 1 when any error is found

use std::fs;

use anyhow::{Context, Result};

use vacancy_feed::config::{load_config, FeedConfig};
use vacancy_feed::validate::validate_feed;

fn main() -> Result<()> {
    let root = std::env::var("ROOT").unwrap_or_else(|_| ".".to_string());

    println!("=== Feed Validator ===");

    let config = load_config(&root).context("Failed to load Config/feed.yaml")?;
    let path = FeedConfig::resolve(&root, &config.output.feed_file);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read feed from {:?}", path))?;

    let report = validate_feed(&content).with_context(|| format!("Failed to parse feed {:?}", path))?;

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("✓ All {} feed items are valid", report.items);
        return Ok(());
    }

    if !report.errors.is_empty() {
        println!("\n❌ ERRORS (must fix):");
        for error in &report.errors {
            println!("  - {}", error);
        }
    }

    if !report.warnings.is_empty() {
        println!("\n⚠️  WARNINGS:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    if !report.is_valid() {
        std::process::exit(1);
    }

    Ok(())
}
