//! Persistence: the ordered score table and its durable, integrity-checked
//! store.
//!
//! # Invariants
//! - Segments are append-only; nothing already written is rewritten.
//! - Every segment is hash-chained in the manifest and verified before use.
//! - Schema and hash mismatches fail closed.
//! - Rows are ordered by time, then by insertion.

mod store;
mod table;

pub use store::{IntegrityManifest, ManifestEntry, ScoreStore, StoreError, StoreMeta};
pub use table::{ScoreRecord, ScoreTable};

pub fn crate_info() -> &'static str {
    "neoncity-persist v0.1.0"
}
