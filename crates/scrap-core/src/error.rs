//! Error types

use scrap_dom::DomError;
use scrap_html::ParseError;

/// Persistence port failures
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// Scrap subsystem errors
#[derive(Debug, thiserror::Error)]
pub enum ScrapError {
    #[error("invalid text span: start {start} is not before end {end}")]
    InvalidSpan { start: usize, end: usize },

    #[error("unknown scrap {0}")]
    UnknownScrap(String),

    #[error("no content root in document")]
    NoContentRoot,

    #[error("invalid document url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to read document: {0}")]
    Content(#[from] std::io::Error),

    #[error("scrap service failed: {0}")]
    Service(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

pub type ScrapResult<T> = Result<T, ScrapError>;
