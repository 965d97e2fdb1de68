//! Scrap records
//!
//! The persisted description of a highlight: where it is (a text span over
//! the content root's plain text) and what it said when it was made.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ScrapError, ScrapResult};

/// Opaque scrap identifier, serialized as a JSON string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrapId(String);

impl ScrapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScrapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScrapId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ScrapId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Half-open `[start, end)` range of UTF-16 code units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    /// Checked constructor; empty spans are rejected
    pub fn new(start: usize, end: usize) -> ScrapResult<Self> {
        if start >= end {
            return Err(ScrapError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two spans share at least one code unit
    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Span with `end` clamped to `total`; `None` when nothing is left to
    /// address
    pub fn clamp(&self, total: usize) -> Option<TextSpan> {
        let end = self.end.min(total);
        (self.start < end).then_some(TextSpan {
            start: self.start,
            end,
        })
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A saved highlight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapRecord {
    pub id: ScrapId,
    pub offset: TextSpan,
    /// Captured text, or marker-wrapped markup for migrated records
    pub content: String,
    pub timestamp: String,
    pub url: String,
}

impl ScrapRecord {
    /// Captured text with any markup removed
    pub fn display_text(&self) -> String {
        if !self.content.contains('<') {
            return self.content.clone();
        }
        match scrap_html::fragment_text(&self.content) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(id = %self.id, "keeping raw scrap content: {}", err);
                self.content.clone()
            }
        }
    }
}

/// What the scrap service receives when a scrap is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapDraft {
    pub content: String,
    pub offset: TextSpan,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str) -> ScrapRecord {
        ScrapRecord {
            id: ScrapId::new("1"),
            offset: TextSpan { start: 0, end: 3 },
            content: content.to_string(),
            timestamp: String::new(),
            url: String::new(),
        }
    }

    #[test]
    fn test_span_checks() {
        assert!(matches!(
            TextSpan::new(5, 2),
            Err(ScrapError::InvalidSpan { start: 5, end: 2 })
        ));
        assert!(matches!(TextSpan::new(4, 4), Err(ScrapError::InvalidSpan { .. })));
        let span = TextSpan::new(2, 5).unwrap();
        assert_eq!(span.len(), 3);
        assert!(span.overlaps(&TextSpan { start: 4, end: 9 }));
        assert!(!span.overlaps(&TextSpan { start: 5, end: 9 }));
    }

    #[test]
    fn test_span_clamp() {
        let span = TextSpan { start: 4, end: 90 };
        assert_eq!(span.clamp(20), Some(TextSpan { start: 4, end: 20 }));
        assert_eq!(span.clamp(3), None);
        assert_eq!(span.clamp(4), None);
        assert_eq!(TextSpan { start: 2, end: 2 }.clamp(20), None);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(record("quick").display_text(), "quick");
        assert_eq!(
            record(r#"<b class="highlight-scrap" data-scrap-id="1">foo</b>"#).display_text(),
            "foo"
        );
    }

    #[test]
    fn test_id_serializes_as_string() {
        let json = serde_json::to_string(&record("x")).unwrap();
        assert!(json.starts_with(r#"{"id":"1","offset":{"start":0,"end":3}"#));
    }
}
