//! Document content sources

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::ScrapResult;

/// Where the document markup comes from
#[async_trait(?Send)]
pub trait ContentSource {
    /// Fetch the document HTML
    async fn fetch(&self) -> ScrapResult<String>;

    /// Location of the document, when it has one
    fn location(&self) -> Option<Url> {
        None
    }
}

/// Inline HTML
#[derive(Debug, Clone)]
pub struct StaticContent {
    html: String,
}

impl StaticContent {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait(?Send)]
impl ContentSource for StaticContent {
    async fn fetch(&self) -> ScrapResult<String> {
        Ok(self.html.clone())
    }
}

/// An HTML file on disk
#[derive(Debug, Clone)]
pub struct FileContent {
    path: PathBuf,
}

impl FileContent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait(?Send)]
impl ContentSource for FileContent {
    async fn fetch(&self) -> ScrapResult<String> {
        tracing::debug!(path = %self.path.display(), "reading document");
        Ok(smol::fs::read_to_string(&self.path).await?)
    }

    fn location(&self) -> Option<Url> {
        let path = std::path::absolute(&self.path).ok()?;
        Url::from_file_path(path).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.html");
        std::fs::write(&path, "<p>hello</p>").unwrap();

        let source = FileContent::new(&path);
        assert_eq!(smol::block_on(source.fetch()).unwrap(), "<p>hello</p>");
        let location = source.location().unwrap();
        assert_eq!(location.scheme(), "file");
        assert!(location.path().ends_with("/doc.html"));
    }

    #[test]
    fn test_missing_file() {
        let source = FileContent::new("/definitely/not/here.html");
        assert!(smol::block_on(source.fetch()).is_err());
    }

    #[test]
    fn test_static_content_has_no_location() {
        let source = StaticContent::new("<p>x</p>");
        assert!(source.location().is_none());
        assert_eq!(smol::block_on(source.fetch()).unwrap(), "<p>x</p>");
    }
}
