//! Scrap store
//!
//! Ordered in-memory collection of scrap records, flushed to the
//! persistence port after every mutation.

use url::Url;

use crate::clock::{Clock, IdGenerator, SystemClock, format_timestamp};
use crate::migration::migrate;
use crate::{
    Config, KeyValueStore, MarkerSpec, OverlapPolicy, ScrapError, ScrapId, ScrapRecord,
    ScrapResult, TextSpan,
};

/// Result of a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new record was stored
    Created(ScrapRecord),
    /// A record with the same span exists; nothing stored
    Duplicate,
    /// The span overlaps a record and overlaps are rejected; nothing stored
    Overlap,
    /// There was no usable selection to create from
    NoSelection,
    /// The selection lies outside the content root or the eligible
    /// elements; nothing stored
    Ineligible,
}

/// Scrap collection for one document
pub struct ScrapStore<S> {
    storage: S,
    records: Vec<ScrapRecord>,
    storage_key: String,
    document_url: Url,
    overlap_policy: OverlapPolicy,
    locale: chrono::Locale,
    clock: Box<dyn Clock>,
    ids: IdGenerator,
}

impl<S: KeyValueStore> ScrapStore<S> {
    /// Hydrate the collection from `storage`.
    ///
    /// Unreadable data leaves the store empty. Legacy records are upgraded
    /// and written back right away.
    pub fn load(storage: S, config: &Config) -> ScrapResult<Self> {
        let document_url = Url::parse(&config.document_url).map_err(|source| ScrapError::InvalidUrl {
            url: config.document_url.clone(),
            source,
        })?;

        let mut store = Self {
            storage,
            records: Vec::new(),
            storage_key: config.storage_key.clone(),
            document_url,
            overlap_policy: config.overlap_policy,
            locale: config.locale,
            clock: Box::new(SystemClock),
            ids: IdGenerator::new(),
        };
        store.hydrate(&config.marker);
        Ok(store)
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn hydrate(&mut self, marker: &MarkerSpec) {
        let raw = match self.storage.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(key = %self.storage_key, "failed to read scraps, starting empty: {}", err);
                return;
            }
        };

        match migrate(&raw, marker) {
            Ok(migration) => {
                self.records = migration.records;
                tracing::info!("Loaded {} scraps from storage", self.records.len());
                if migration.changed {
                    if let Err(err) = self.persist() {
                        tracing::warn!("failed to re-save migrated scraps: {}", err);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(key = %self.storage_key, "malformed scrap data, starting empty: {}", err);
            }
        }
    }

    /// Create a scrap with a locally generated id
    pub fn create(&mut self, text: &str, start: usize, end: usize) -> ScrapResult<CreateOutcome> {
        let span = TextSpan::new(start, end)?;
        if let Some(outcome) = self.check(span) {
            return Ok(outcome);
        }
        let id = self.ids.next_id(&self.clock.now());
        self.insert(id, text, span)
    }

    /// Store a scrap whose id was issued by the scrap service
    pub fn insert_issued(&mut self, id: ScrapId, text: &str, start: usize, end: usize) -> ScrapResult<CreateOutcome> {
        let span = TextSpan::new(start, end)?;
        if let Some(outcome) = self.check(span) {
            return Ok(outcome);
        }
        self.insert(id, text, span)
    }

    /// The no-op outcome `span` would get, if any
    pub fn check(&self, span: TextSpan) -> Option<CreateOutcome> {
        if self.is_duplicate(span.start, span.end) {
            tracing::debug!(%span, "duplicate scrap ignored");
            return Some(CreateOutcome::Duplicate);
        }
        if self.overlap_policy == OverlapPolicy::Reject && self.overlaps(span.start, span.end) {
            tracing::debug!(%span, "overlapping scrap rejected");
            return Some(CreateOutcome::Overlap);
        }
        None
    }

    fn insert(&mut self, id: ScrapId, text: &str, offset: TextSpan) -> ScrapResult<CreateOutcome> {
        let record = ScrapRecord {
            id,
            offset,
            content: text.to_string(),
            timestamp: format_timestamp(&self.clock.now(), self.locale),
            url: self.document_url.to_string(),
        };
        tracing::info!(id = %record.id, span = %offset, "created scrap");
        self.records.push(record.clone());
        self.persist()?;
        Ok(CreateOutcome::Created(record))
    }

    /// Remove a scrap; `false` when no record has that id
    pub fn delete(&mut self, id: &ScrapId) -> ScrapResult<bool> {
        let before = self.records.len();
        self.records.retain(|record| &record.id != id);
        if self.records.len() == before {
            return Ok(false);
        }
        tracing::info!(%id, "deleted scrap");
        self.persist()?;
        Ok(true)
    }

    /// Remove every scrap
    pub fn clear_all(&mut self) -> ScrapResult<()> {
        self.records.clear();
        tracing::info!("cleared all scraps");
        self.persist()
    }

    pub fn is_duplicate(&self, start: usize, end: usize) -> bool {
        self.records
            .iter()
            .any(|r| r.offset.start == start && r.offset.end == end)
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        let span = TextSpan { start, end };
        self.records.iter().any(|r| r.offset.overlaps(&span))
    }

    /// Records in insertion order
    pub fn list(&self) -> &[ScrapRecord] {
        &self.records
    }

    pub fn get(&self, id: &ScrapId) -> Option<&ScrapRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// The store's time source
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn persist(&mut self) -> ScrapResult<()> {
        let json = serde_json::to_string(&self.records)?;
        self.storage.set(&self.storage_key, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::MemoryStore;
    use chrono::{Local, TimeZone};

    fn clock() -> FixedClock {
        FixedClock(Local.with_ymd_and_hms(2025, 10, 16, 9, 30, 0).unwrap())
    }

    fn store(config: &Config) -> ScrapStore<MemoryStore> {
        ScrapStore::load(MemoryStore::new(), config).unwrap().with_clock(clock())
    }

    #[test]
    fn test_create_and_persist() {
        let mut store = store(&Config::default());
        let outcome = store.create("quick", 4, 9).unwrap();
        let CreateOutcome::Created(record) = &outcome else {
            panic!("expected a new record, got {outcome:?}");
        };
        assert_eq!(record.content, "quick");
        assert_eq!(record.url, "about:blank");
        assert!(record.timestamp.starts_with("2025. 10. 16. "));

        let saved = store.storage().get("scrappedTexts").unwrap().unwrap();
        let parsed: Vec<ScrapRecord> = serde_json::from_str(&saved).unwrap();
        assert_eq!(parsed, vec![record.clone()]);
    }

    #[test]
    fn test_duplicate_is_dropped() {
        let mut store = store(&Config::default());
        store.create("quick", 4, 9).unwrap();
        assert_eq!(store.create("quick", 4, 9).unwrap(), CreateOutcome::Duplicate);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_differ_within_one_millisecond() {
        let mut store = store(&Config::default());
        store.create("a", 0, 1).unwrap();
        store.create("b", 1, 2).unwrap();
        let ids: Vec<_> = store.list().iter().map(|r| r.id.as_str().to_string()).collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_overlap_policy() {
        let mut allow = store(&Config::default());
        allow.create("quick", 4, 9).unwrap();
        assert!(matches!(allow.create("ick bro", 6, 13).unwrap(), CreateOutcome::Created(_)));

        let config = Config {
            overlap_policy: OverlapPolicy::Reject,
            ..Config::default()
        };
        let mut reject = store(&config);
        reject.create("quick", 4, 9).unwrap();
        assert_eq!(reject.create("ick bro", 6, 13).unwrap(), CreateOutcome::Overlap);
        // Touching spans do not overlap
        assert!(matches!(reject.create(" brown", 9, 15).unwrap(), CreateOutcome::Created(_)));
    }

    #[test]
    fn test_invalid_span() {
        let mut store = store(&Config::default());
        assert!(matches!(store.create("x", 9, 4), Err(ScrapError::InvalidSpan { .. })));
        assert!(matches!(store.create("", 4, 4), Err(ScrapError::InvalidSpan { .. })));
        assert!(matches!(
            store.insert_issued(ScrapId::new("s1"), "", 20, 20),
            Err(ScrapError::InvalidSpan { start: 20, end: 20 })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_and_clear() {
        let mut store = store(&Config::default());
        store.create("a", 0, 1).unwrap();
        store.create("b", 2, 3).unwrap();
        let id = store.list()[0].id.clone();

        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert_eq!(store.len(), 1);

        store.clear_all().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.storage().get("scrappedTexts").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_malformed_storage_starts_empty() {
        let mut storage = MemoryStore::new();
        storage.set("scrappedTexts", "not json").unwrap();
        let store = ScrapStore::load(storage, &Config::default()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_legacy_records_are_resaved() {
        let mut storage = MemoryStore::new();
        storage.set("scrappedTexts", r#"[{"id":"1","text":"foo"}]"#).unwrap();
        let store = ScrapStore::load(storage, &Config::default()).unwrap();

        assert_eq!(store.list()[0].offset, TextSpan { start: 0, end: 3 });
        let saved = store.storage().get("scrappedTexts").unwrap().unwrap();
        assert!(saved.contains(r#""offset":{"start":0,"end":3}"#));
    }

    #[test]
    fn test_invalid_document_url() {
        let config = Config {
            document_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            ScrapStore::load(MemoryStore::new(), &config),
            Err(ScrapError::InvalidUrl { .. })
        ));
    }
}
