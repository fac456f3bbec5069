//! Integration tests for the vacancy feed pipeline
//! Runs saved listing pages through extraction, classification and feed reconciliation

use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vacancy_feed::config::{load_config, FeedConfig, SourceMode};
use vacancy_feed::feed::format_pub_date;
use vacancy_feed::filter::Classifier;
use vacancy_feed::guid::generate_id;
use vacancy_feed::pipeline::run;
use vacancy_feed::scrapers::{default_strategies, ExtractSettings, SnapshotPages, StrategyPages};
use vacancy_feed::storage::{load_feed, parse_feed};
use vacancy_feed::validate::validate_feed;
use vacancy_feed::RunSummary;

const LISTING_URL: &str = "https://www.unfpa.org/jobs";

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, day, 8, 0, 0).unwrap()
}

/// Copy the named fixture pages into `dir` as page-N.html
fn snapshot_dir(root: &Path, name: &str, fixtures: &[&str]) -> std::path::PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (i, fixture) in fixtures.iter().enumerate() {
        let html = fs::read_to_string(format!("tests/fixtures/{}", fixture))
            .expect("Failed to read fixture");
        fs::write(dir.join(format!("page-{}.html", i + 1)), html).unwrap();
    }
    dir
}

fn run_snapshots(snapshots: &Path, feed_path: &Path, config: &FeedConfig, now: DateTime<Utc>) -> RunSummary {
    let settings = ExtractSettings {
        listing_url: LISTING_URL.to_string(),
        min_title_len: config.source.min_title_len,
    };
    let pages = SnapshotPages::new(snapshots, LISTING_URL).unwrap();
    let mut source = StrategyPages::new(pages, default_strategies(&settings));
    let classifier = Classifier::new(config.policy.clone()).unwrap();

    run(&mut source, &classifier, feed_path, &config.channel, now).unwrap()
}

#[test]
fn test_listing_page_classified_into_feed() {
    let tmp = TempDir::new().unwrap();
    let snapshots = snapshot_dir(tmp.path(), "first", &["listing_page1.html"]);
    let feed_path = tmp.path().join("unfpa_jobs.xml");
    let config = FeedConfig::default();

    let summary = run_snapshots(&snapshots, &feed_path, &config, at(19));
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.included, 2);
    assert_eq!(summary.added, 2);
    assert!(summary.aborted.is_none());

    let xml = fs::read_to_string(&feed_path).unwrap();
    assert!(xml.contains(r#"<rss version="2.0""#));
    assert!(xml.contains(r#"rel="self""#));
    assert!(xml.contains(r#"<guid isPermaLink="false">"#));
    assert!(xml.contains("<![CDATA[UNFPA has a vacancy for the position of Programme Specialist"));

    let state = parse_feed(&xml).unwrap();
    let links: Vec<&str> = state.items.iter().map(|i| i.link.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://www.unfpa.org/jobs/programme-specialist-srh-dakar",
            "https://www.unfpa.org/jobs/communications-intern",
        ]
    );

    let first = &state.items[0];
    assert_eq!(first.title, "Programme Specialist, Sexual and Reproductive Health");
    assert!(first.description.contains("Location: Dakar, Senegal."));
    assert!(first.description.contains("Closing date: 30 November 2026."));
    assert_eq!(first.guid, generate_id(&first.link));
    assert_eq!(first.pub_date, format_pub_date(at(19)));

    let report = validate_feed(&xml).unwrap();
    assert!(report.is_valid(), "{:?}", report.errors);
    assert_eq!(report.items, 2);
}

#[test]
fn test_second_run_only_appends() {
    let tmp = TempDir::new().unwrap();
    let first_run = snapshot_dir(tmp.path(), "first", &["listing_page1.html"]);
    let second_run = snapshot_dir(tmp.path(), "second", &["listing_page1.html", "listing_page2.html"]);
    let feed_path = tmp.path().join("unfpa_jobs.xml");
    let config = FeedConfig::default();

    run_snapshots(&first_run, &feed_path, &config, at(19));
    let before = load_feed(&feed_path);

    let summary = run_snapshots(&second_run, &feed_path, &config, at(20));
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.existing, 2);
    assert_eq!(summary.added, 1);
    assert_eq!(summary.total, 3);

    let after = load_feed(&feed_path);
    assert_eq!(after.items[..2], before.items[..]);
    assert_eq!(after.items[2].link, "https://www.unfpa.org/jobs/representative-addis-ababa");
    assert_eq!(after.items[2].pub_date, format_pub_date(at(20)));
    assert_eq!(after.items[0].pub_date, format_pub_date(at(19)));

    // Same input again changes nothing but the channel date
    let summary = run_snapshots(&second_run, &feed_path, &config, at(21));
    assert_eq!(summary.added, 0);
    assert_eq!(load_feed(&feed_path).items, after.items);
}

#[test]
fn test_malformed_feed_is_replaced() {
    let tmp = TempDir::new().unwrap();
    let snapshots = snapshot_dir(tmp.path(), "first", &["listing_page1.html"]);
    let feed_path = tmp.path().join("unfpa_jobs.xml");
    fs::write(&feed_path, "<rss><channel><item><link>https://www.unfpa.org/jobs/x").unwrap();

    let summary = run_snapshots(&snapshots, &feed_path, &FeedConfig::default(), at(19));
    assert_eq!(summary.existing, 0);
    assert_eq!(summary.added, 2);
    assert_eq!(load_feed(&feed_path).len(), 2);
}

#[test]
fn test_config_policy_applies_to_run() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_str().unwrap();
    fs::create_dir_all(tmp.path().join("Config")).unwrap();
    fs::write(
        tmp.path().join("Config/feed.yaml"),
        r#"
source:
  mode: snapshots
  snapshot_dir: snapshots
policy:
  max_included: 1
output:
  feed_file: public/jobs.xml
"#,
    )
    .unwrap();
    snapshot_dir(tmp.path(), "snapshots", &["listing_page1.html", "listing_page2.html"]);

    let config = load_config(root).unwrap();
    assert_eq!(config.source.mode, SourceMode::Snapshots);
    assert_eq!(config.policy.max_included, 1);
    // Unset policy fields keep their defaults
    assert!(config.policy.included_grades.contains(&"P-3".to_string()));

    let snapshots = FeedConfig::resolve(root, &config.source.snapshot_dir);
    let feed_path = FeedConfig::resolve(root, &config.output.feed_file);
    let summary = run_snapshots(&snapshots, &feed_path, &config, at(19));

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.included, 1);
    assert!(feed_path.exists());
    assert_eq!(load_feed(&feed_path).len(), 1);
}
