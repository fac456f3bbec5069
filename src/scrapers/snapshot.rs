use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{Page, PageFetcher};
use crate::error::AcquisitionError;

/// Replays saved listing pages (`*.html`, in file-name order) as if fetched
/// from `url`
pub struct SnapshotPages {
    url: String,
    files: VecDeque<PathBuf>,
}

impl SnapshotPages {
    pub fn new(dir: &Path, url: &str) -> Result<Self, AcquisitionError> {
        let io_error = |source| AcquisitionError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("html") {
                files.push(path);
            }
        }
        files.sort();

        info!("Found {} snapshot pages in {:?}", files.len(), dir);
        Ok(Self {
            url: url.to_string(),
            files: files.into(),
        })
    }
}

impl PageFetcher for SnapshotPages {
    fn next_page(&mut self) -> Result<Option<Page>, AcquisitionError> {
        let path = match self.files.pop_front() {
            Some(path) => path,
            None => return Ok(None),
        };

        let html = fs::read_to_string(&path).map_err(|source| AcquisitionError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(Some(Page {
            url: self.url.clone(),
            html,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshots_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("page-2.html"), "<p>two</p>").unwrap();
        fs::write(dir.path().join("page-1.html"), "<p>one</p>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut pages = SnapshotPages::new(dir.path(), "https://www.unfpa.org/jobs").unwrap();
        let first = pages.next_page().unwrap().unwrap();
        assert_eq!(first.html, "<p>one</p>");
        assert_eq!(first.url, "https://www.unfpa.org/jobs");
        assert_eq!(pages.next_page().unwrap().unwrap().html, "<p>two</p>");
        assert!(pages.next_page().unwrap().is_none());
    }

    #[test]
    fn test_missing_directory_is_acquisition_error() {
        let dir = TempDir::new().unwrap();
        let result = SnapshotPages::new(&dir.path().join("absent"), "https://www.unfpa.org/jobs");
        assert!(matches!(result, Err(AcquisitionError::Io { .. })));
    }
}
