//! Feed Configuration
//!
//! Loads Config/feed.yaml from the run root. Every field has a default, so a
//! missing file or a partial file both yield a complete configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub channel: ChannelConfig,
    pub policy: FilterPolicy,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

/// Fixed channel metadata written into every feed file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub self_link: String,
    pub source_url: String,
    pub source_label: String,
    /// Organisation named in synthesized item descriptions
    pub organisation: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            title: "UNFPA Job Vacancies".to_string(),
            link: "https://www.unfpa.org/jobs".to_string(),
            description: "List of vacancies at UNFPA".to_string(),
            language: "en".to_string(),
            self_link: "https://cinfoposte.github.io/unfpa-jobs/unfpa_jobs.xml".to_string(),
            source_url: "https://www.unfpa.org/jobs".to_string(),
            source_label: "UNFPA Job Vacancies".to_string(),
            organisation: "UNFPA".to_string(),
        }
    }
}

/// Grade sets, keyword lists and the per-run inclusion cap
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterPolicy {
    pub included_grades: Vec<String>,
    pub excluded_grade_families: Vec<String>,
    pub excluded_literal_grades: Vec<String>,
    pub grade_families: Vec<String>,
    pub consultant_keywords: Vec<String>,
    pub intern_keywords: Vec<String>,
    pub max_included: usize,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            included_grades: strings(&["P-1", "P-2", "P-3", "P-4", "P-5", "D-1", "D-2"]),
            excluded_grade_families: strings(&["G", "SB", "LSC"]),
            excluded_literal_grades: strings(&[
                "NOA", "NOB", "NOC", "NOD", "NO-A", "NO-B", "NO-C", "NO-D",
            ]),
            grade_families: strings(crate::normalize::GRADE_FAMILIES),
            consultant_keywords: strings(&["CONSULTANT", "CONSULTANCY"]),
            intern_keywords: strings(&["INTERN", "FELLOWSHIP", "FELLOW"]),
            max_included: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Fetch the live listing over HTTP and follow the pager
    Http,
    /// Replay saved listing pages from a directory
    Snapshots,
    /// Read pre-extracted candidate lists from a JSON file
    Candidates,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub mode: SourceMode,
    pub listing_url: String,
    pub snapshot_dir: PathBuf,
    pub candidates_file: PathBuf,
    pub max_pages: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub min_title_len: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Http,
            listing_url: "https://www.unfpa.org/jobs".to_string(),
            snapshot_dir: PathBuf::from("snapshots"),
            candidates_file: PathBuf::from("candidates.json"),
            max_pages: 20,
            timeout_secs: 60,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            min_title_len: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub feed_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            feed_file: PathBuf::from("unfpa_jobs.xml"),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Load configuration from `<root>/Config/feed.yaml`, defaults when absent
pub fn load_config(root: &str) -> Result<FeedConfig> {
    let path = Path::new(root).join("Config").join("feed.yaml");
    if !path.exists() {
        return Ok(FeedConfig::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;

    let config: FeedConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config YAML {:?}", path))?;

    Ok(config)
}

impl FeedConfig {
    /// Resolve a configured path against the run root
    pub fn resolve(root: &str, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            PathBuf::from(root).join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.policy.max_included, 50);
        assert_eq!(config.channel.language, "en");
        assert_eq!(config.source.mode, SourceMode::Http);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("Config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("feed.yaml"),
            "policy:\n  max_included: 5\nsource:\n  mode: snapshots\n  snapshot_dir: pages\n",
        )
        .unwrap();

        let config = load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.policy.max_included, 5);
        assert_eq!(config.policy.included_grades.len(), 7);
        assert_eq!(config.source.mode, SourceMode::Snapshots);
        assert_eq!(config.source.snapshot_dir, PathBuf::from("pages"));
        assert_eq!(config.source.max_pages, 20);
        assert_eq!(config.channel.title, "UNFPA Job Vacancies");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("Config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("feed.yaml"), "policy: [not, a, map]\n").unwrap();

        assert!(load_config(dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_resolve_relative_paths_against_root() {
        assert_eq!(
            FeedConfig::resolve("/srv/feed", Path::new("unfpa_jobs.xml")),
            PathBuf::from("/srv/feed/unfpa_jobs.xml")
        );
        assert_eq!(
            FeedConfig::resolve("/srv/feed", Path::new("/tmp/out.xml")),
            PathBuf::from("/tmp/out.xml")
        );
    }
}
