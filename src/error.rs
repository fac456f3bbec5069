use std::path::PathBuf;

use thiserror::Error;

/// A single strategy could not read candidates from a page.
/// The page and the other strategies are unaffected.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("page markup not usable: {0}")]
    Markup(String),
}

/// The page-acquisition collaborator cannot continue; ends the page loop.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
