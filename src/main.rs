use anyhow::{Context, Result};
use tracing::{error, info};

use vacancy_feed::config::{load_config, FeedConfig, SourceMode};
use vacancy_feed::filter::Classifier;
use vacancy_feed::scrapers::{
    default_strategies, CandidateSource, ExtractSettings, HttpPages, JsonCandidatePages,
    SnapshotPages, StrategyPages,
};
use vacancy_feed::{logging, pipeline};

fn build_source(root: &str, config: &FeedConfig) -> Result<Box<dyn CandidateSource>> {
    let source = &config.source;
    let settings = ExtractSettings {
        listing_url: source.listing_url.clone(),
        min_title_len: source.min_title_len,
    };

    let candidates: Box<dyn CandidateSource> = match source.mode {
        SourceMode::Http => {
            let pages = HttpPages::new(
                &source.listing_url,
                source.max_pages,
                source.timeout_secs,
                &source.user_agent,
            )?;
            Box::new(StrategyPages::new(pages, default_strategies(&settings)))
        }
        SourceMode::Snapshots => {
            let dir = FeedConfig::resolve(root, &source.snapshot_dir);
            let pages = SnapshotPages::new(&dir, &source.listing_url)?;
            Box::new(StrategyPages::new(pages, default_strategies(&settings)))
        }
        SourceMode::Candidates => {
            let path = FeedConfig::resolve(root, &source.candidates_file);
            Box::new(JsonCandidatePages::from_file(&path)?)
        }
    };

    Ok(candidates)
}

fn main() -> Result<()> {
    logging::init();

    let root = std::env::var("ROOT").unwrap_or_else(|_| ".".to_string());
    let config = load_config(&root).context("Failed to load Config/feed.yaml")?;
    let classifier = Classifier::new(config.policy.clone())?;
    let feed_path = FeedConfig::resolve(&root, &config.output.feed_file);
    let now = chrono::Utc::now();

    info!("Building feed {:?} from {:?} source", feed_path, config.source.mode);

    // Without a source the run still rewrites the existing feed
    let summary = match build_source(&root, &config) {
        Ok(mut source) => {
            pipeline::run(source.as_mut(), &classifier, &feed_path, &config.channel, now)?
        }
        Err(e) => {
            error!("Could not open page source: {:#}", e);
            let mut empty = JsonCandidatePages::new(Vec::new());
            let mut summary = pipeline::run(&mut empty, &classifier, &feed_path, &config.channel, now)?;
            summary.aborted = Some(format!("{:#}", e));
            summary
        }
    };

    println!("=== Feed Run Summary ===");
    println!("Pages scanned:     {}", summary.pages);
    println!("Postings included: {}", summary.included);
    println!("Existing items:    {}", summary.existing);
    println!("New items added:   {}", summary.added);
    println!("Total items:       {}", summary.total);
    if let Some(reason) = &summary.aborted {
        println!("Scraping stopped early: {}", reason);
    }

    Ok(())
}
