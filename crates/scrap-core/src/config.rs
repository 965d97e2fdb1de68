//! Scrap Configuration

use std::time::Duration;

use chrono::Locale;

/// How highlight markers are built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpec {
    /// Marker element tag
    pub tag: String,
    /// Class identifying marker elements
    pub class: String,
    /// Attribute carrying the scrap id
    pub id_attribute: String,
}

impl Default for MarkerSpec {
    fn default() -> Self {
        Self {
            tag: "b".to_string(),
            class: "highlight-scrap".to_string(),
            id_attribute: "data-scrap-id".to_string(),
        }
    }
}

/// What happens when a new scrap overlaps an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Store it; the reconciler nests the markers
    #[default]
    Allow,
    /// Refuse it with `CreateOutcome::Overlap`
    Reject,
}

/// Scrap configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Marker element
    pub marker: MarkerSpec,

    /// Class of the element whose text is addressed (falls back to `<body>`)
    pub content_class: String,

    /// Tags normalized after markers are removed
    pub content_tags: Vec<String>,

    /// Tags a selection must start inside to be scrappable
    pub eligible_tags: Vec<String>,

    /// Storage key of the scrap collection
    pub storage_key: String,

    /// Storage key of the highlighted content snapshot
    pub snapshot_key: String,

    /// Open from the saved snapshot when it holds a marker
    pub restore_snapshot: bool,

    /// Creation-time handling of overlapping scraps
    pub overlap_policy: OverlapPolicy,

    /// Locate scraps by their text when the offsets no longer resolve
    pub content_fallback: bool,

    /// Delay between pointer-up and reading the selection
    pub selection_settle: Duration,

    /// Round-trip latency of the simulated remote service
    pub remote_latency: Duration,

    /// Location recorded on new scraps
    pub document_url: String,

    /// Locale of scrap timestamps
    pub locale: Locale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker: MarkerSpec::default(),
            content_class: "content".to_string(),
            content_tags: vec!["p".to_string(), "h2".to_string()],
            eligible_tags: vec!["p".to_string(), "h2".to_string()],
            storage_key: "scrappedTexts".to_string(),
            snapshot_key: "highlightedContent".to_string(),
            restore_snapshot: false,
            overlap_policy: OverlapPolicy::Allow,
            content_fallback: false,
            selection_settle: Duration::from_millis(10),
            remote_latency: Duration::from_millis(100),
            document_url: "about:blank".to_string(),
            locale: Locale::ko_KR,
        }
    }
}
