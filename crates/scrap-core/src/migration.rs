//! Loading stored collections, including older record layouts
//!
//! Early versions stored `{ id, text }` without offsets and used numeric
//! ids. Such records are upgraded on load, and records that address no
//! text are dropped; the caller re-saves the collection when anything
//! changed.

use serde::Deserialize;
use serde_json::Value;

use scrap_dom::{DomTree, utf16_len};
use scrap_html::get_outer_html;

use crate::{HighlightReconciler, MarkerSpec, ScrapId, ScrapRecord, ScrapResult, TextSpan};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredId {
    Text(String),
    Number(serde_json::Number),
}

impl From<StoredId> for ScrapId {
    fn from(id: StoredId) -> Self {
        match id {
            StoredId::Text(id) => ScrapId::new(id),
            StoredId::Number(n) => ScrapId::new(n.to_string()),
        }
    }
}

/// Any record layout ever written
#[derive(Debug, Deserialize)]
struct StoredScrap {
    id: StoredId,
    #[serde(default)]
    offset: Option<TextSpan>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Result of loading a stored collection
#[derive(Debug, Default)]
pub struct Migration {
    pub records: Vec<ScrapRecord>,
    /// Records were upgraded or dropped; the collection should be re-saved
    pub changed: bool,
}

/// Parse a stored collection, upgrading legacy records.
///
/// Fails only when `raw` is not a JSON array.
pub fn migrate(raw: &str, marker: &MarkerSpec) -> ScrapResult<Migration> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;
    let mut migration = Migration::default();

    for entry in entries {
        let stored: StoredScrap = match serde_json::from_value(entry) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!("dropping unreadable scrap record: {}", err);
                migration.changed = true;
                continue;
            }
        };

        let legacy_id = matches!(stored.id, StoredId::Number(_));
        let id = ScrapId::from(stored.id);
        let (offset, content) = match (stored.offset, stored.content, stored.text) {
            (Some(offset), content, text) => (offset, content.or(text).unwrap_or_default()),
            (None, _, Some(text)) => {
                tracing::info!(%id, "upgrading legacy scrap record");
                migration.changed = true;
                let offset = TextSpan {
                    start: 0,
                    end: utf16_len(&text),
                };
                (offset, legacy_markup(marker, &id, &text)?)
            }
            (None, _, None) => {
                tracing::warn!(%id, "dropping scrap record without offset or text");
                migration.changed = true;
                continue;
            }
        };

        if offset.is_empty() {
            tracing::warn!(%id, span = %offset, "dropping scrap record with an empty span");
            migration.changed = true;
            continue;
        }

        migration.changed |= legacy_id;
        migration.records.push(ScrapRecord {
            id,
            offset,
            content,
            timestamp: stored.timestamp.unwrap_or_default(),
            url: stored.url.unwrap_or_default(),
        });
    }
    Ok(migration)
}

/// `<b class="highlight-scrap" data-scrap-id="{id}">{text}</b>`
fn legacy_markup(marker: &MarkerSpec, id: &ScrapId, text: &str) -> ScrapResult<String> {
    let mut tree = DomTree::new();
    let element = HighlightReconciler::new(marker.clone()).create_marker(&mut tree, id)?;
    let content = tree.create_text(text);
    tree.append_child(element, content)?;
    Ok(get_outer_html(&tree, element))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_records_pass_through() {
        let raw = r#"[{"id":"1","offset":{"start":4,"end":9},"content":"quick","timestamp":"t","url":"u"}]"#;
        let migration = migrate(raw, &MarkerSpec::default()).unwrap();
        assert!(!migration.changed);
        assert_eq!(migration.records[0].offset, TextSpan { start: 4, end: 9 });
        assert_eq!(migration.records[0].content, "quick");
    }

    #[test]
    fn test_legacy_text_record() {
        let raw = r#"[{"id":"1","text":"foo"}]"#;
        let migration = migrate(raw, &MarkerSpec::default()).unwrap();
        assert!(migration.changed);

        let record = &migration.records[0];
        assert_eq!(record.offset, TextSpan { start: 0, end: 3 });
        assert_eq!(
            record.content,
            r#"<b class="highlight-scrap" data-scrap-id="1">foo</b>"#
        );
        assert_eq!(record.display_text(), "foo");
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let raw = r#"[{"id":1760600000000,"offset":{"start":0,"end":1},"content":"a","timestamp":"t","url":"u"}]"#;
        let migration = migrate(raw, &MarkerSpec::default()).unwrap();
        assert!(migration.changed);
        assert_eq!(migration.records[0].id.as_str(), "1760600000000");
    }

    #[test]
    fn test_records_without_location_are_dropped() {
        let raw = r#"[{"id":"1"},{"nonsense":true},{"id":"2","text":"ok"}]"#;
        let migration = migrate(raw, &MarkerSpec::default()).unwrap();
        assert!(migration.changed);
        assert_eq!(migration.records.len(), 1);
        assert_eq!(migration.records[0].id.as_str(), "2");
    }

    #[test]
    fn test_empty_spans_are_dropped() {
        let raw = concat!(
            r#"[{"id":"1","text":""},"#,
            r#"{"id":"2","offset":{"start":5,"end":5},"content":"","timestamp":"t","url":"u"},"#,
            r#"{"id":"3","offset":{"start":0,"end":1},"content":"a","timestamp":"t","url":"u"}]"#
        );
        let migration = migrate(raw, &MarkerSpec::default()).unwrap();
        assert!(migration.changed);
        assert_eq!(migration.records.len(), 1);
        assert_eq!(migration.records[0].id.as_str(), "3");
    }

    #[test]
    fn test_malformed_collection_fails() {
        assert!(migrate("{not json", &MarkerSpec::default()).is_err());
        assert!(migrate(r#"{"id":"1"}"#, &MarkerSpec::default()).is_err());
    }
}
