//! Scrap Core
//!
//! Offset-addressed text highlights. A scrap is stored as a UTF-16
//! `[start, end)` span over the concatenated text of a content root, and is
//! rendered by wrapping that span in a marker element. Markers are always
//! removed before being re-applied, so the stored offsets keep addressing
//! the unhighlighted text.
//!
//! # Example
//!
//! ```no_run
//! use scrap_core::{Config, LocalScrapService, MemoryStore, ScrapSession, StaticContent};
//!
//! # fn main() -> Result<(), scrap_core::ScrapError> {
//! smol::block_on(async {
//!     let source = StaticContent::new("<div class=\"content\"><p>The quick brown fox.</p></div>");
//!     let mut session = ScrapSession::open(
//!         &source,
//!         MemoryStore::new(),
//!         Box::new(LocalScrapService::new()),
//!         Config::default(),
//!     )
//!     .await?;
//!
//!     session.select_offsets(4, 9)?;
//!     session.create_from_selection().await?;
//!     println!("{}", session.content_html());
//!     Ok(())
//! })
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod migration;
pub mod offsets;
pub mod reconciler;
pub mod record;
pub mod resolver;
pub mod selection;
pub mod service;
pub mod session;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, IdGenerator, SystemClock, format_timestamp};
pub use config::{Config, MarkerSpec, OverlapPolicy};
pub use content::{ContentSource, FileContent, StaticContent};
pub use error::{ScrapError, ScrapResult, StorageError};
pub use migration::{Migration, migrate};
pub use offsets::{boundary_offset, span_for_range, text_offset, total_length};
pub use reconciler::{HighlightReconciler, ReconcileReport};
pub use record::{ScrapDraft, ScrapId, ScrapRecord, TextSpan};
pub use resolver::{range_for_offsets, range_for_text};
pub use selection::{ClickDisposition, CurrentSelection, SelectionController, SelectionOutcome, TooltipState};
pub use service::{LocalScrapService, SaveReceipt, ScrapService, SimulatedRemoteService};
pub use session::{Activation, ScrapSession};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{CreateOutcome, ScrapStore};
