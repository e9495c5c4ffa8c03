//! File-backed score persistence.
//!
//! Layout inside the store directory:
//! ```text
//! leaderboard.meta.json        - schema version and counters
//! segments/
//!   000001.scores.cbor.zst     - one submitted batch, CBOR then zstd
//! integrity/
//!   manifest.json              - digest chain over the segments
//! ```
//!
//! Segments are append-only. Opening replays every segment into the
//! in-memory table, checking each against the manifest first.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::table::{ScoreRecord, ScoreTable};

const SCORE_SCHEMA_VERSION: u32 = 1;
const META_FILE: &str = "leaderboard.meta.json";
const SEGMENT_DIR: &str = "segments";
const MANIFEST_FILE: &str = "integrity/manifest.json";
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("score store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot encode score segment: {0}")]
    CborEncode(String),
    #[error("cannot decode score segment: {0}")]
    CborDecode(String),
    #[error("store metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("segment digest mismatch: manifest has {expected}, found {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("score store schema v{file_version} is not supported (expected v{expected_version})")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("segment {0} is missing from the integrity manifest")]
    Untracked(String),
}

/// Counters kept next to the segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub schema_version: u32,
    pub segment_count: u32,
    pub record_count: u64,
}

/// One link of the digest chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub segment: String,
    pub digest: String,
    pub prev_digest: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub entries: Vec<ManifestEntry>,
}

impl IntegrityManifest {
    fn entry(&self, segment: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.segment == segment)
    }

    fn head(&self) -> Option<String> {
        self.entries.last().map(|e| e.digest.clone())
    }
}

/// Durable leaderboard: the sorted table plus its on-disk segments.
#[derive(Debug)]
pub struct ScoreStore {
    root: PathBuf,
    meta: StoreMeta,
    manifest: IntegrityManifest,
    table: ScoreTable,
}

impl ScoreStore {
    /// Open or create a store. Safe to call repeatedly on the same path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join(SEGMENT_DIR))?;
        std::fs::create_dir_all(root.join("integrity"))?;

        let meta_path = root.join(META_FILE);
        let manifest_path = root.join(MANIFEST_FILE);
        let (meta, manifest) = if meta_path.exists() {
            let meta: StoreMeta = read_json(&meta_path)?;
            if meta.schema_version != SCORE_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: meta.schema_version,
                    expected_version: SCORE_SCHEMA_VERSION,
                });
            }
            let manifest = if manifest_path.exists() {
                read_json(&manifest_path)?
            } else {
                IntegrityManifest::default()
            };
            (meta, manifest)
        } else {
            let meta = StoreMeta {
                schema_version: SCORE_SCHEMA_VERSION,
                segment_count: 0,
                record_count: 0,
            };
            write_json(&meta_path, &meta)?;
            write_json(&manifest_path, &IntegrityManifest::default())?;
            tracing::info!(root = %root.display(), "score store created");
            (meta, IntegrityManifest::default())
        };

        let mut store = Self {
            root,
            meta,
            manifest,
            table: ScoreTable::new(),
        };
        for index in 1..=store.meta.segment_count {
            for record in store.load_segment(index)? {
                store.table.restore(record);
            }
        }
        tracing::debug!(
            segments = store.meta.segment_count,
            records = store.table.len(),
            "score store opened"
        );
        Ok(store)
    }

    /// Persist one score and add it to the table.
    pub fn insert(&mut self, alias: &str, time_ms: u64) -> Result<ScoreRecord, StoreError> {
        let mut records = self.insert_batch([(alias, time_ms)])?;
        Ok(records.remove(0))
    }

    /// Persist several scores as a single segment. The table only changes
    /// once the segment is on disk.
    pub fn insert_batch<'a, I>(&mut self, scores: I) -> Result<Vec<ScoreRecord>, StoreError>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let first = self.table.next_seq();
        let records: Vec<ScoreRecord> = scores
            .into_iter()
            .zip(first..)
            .map(|((alias, time_ms), seq)| ScoreRecord {
                alias: alias.to_owned(),
                time_ms,
                seq,
            })
            .collect();
        if records.is_empty() {
            return Ok(records);
        }
        self.append_segment(&records)?;
        for record in &records {
            self.table.restore(record.clone());
        }
        Ok(records)
    }

    /// Ranked page, fastest first.
    pub fn page(&self, offset: usize, limit: usize) -> &[ScoreRecord] {
        self.table.page(offset, limit)
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    /// Re-read every segment and walk the digest chain from the start.
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        let mut prev: Option<String> = None;
        for entry in &self.manifest.entries {
            if entry.prev_digest != prev {
                return Err(StoreError::IntegrityMismatch {
                    expected: prev.unwrap_or_else(|| "<chain start>".into()),
                    actual: entry.prev_digest.clone().unwrap_or_else(|| "<chain start>".into()),
                });
            }
            let bytes = std::fs::read(self.segment_path(&entry.segment))?;
            check_digest(entry, &bytes)?;
            prev = Some(entry.digest.clone());
        }
        tracing::debug!(segments = self.manifest.entries.len(), "score store verified");
        Ok(())
    }

    fn segment_path(&self, segment: &str) -> PathBuf {
        self.root.join(SEGMENT_DIR).join(segment)
    }

    fn append_segment(&mut self, records: &[ScoreRecord]) -> Result<(), StoreError> {
        let index = self.meta.segment_count + 1;
        let segment = segment_name(index);
        let bytes = encode_segment(records)?;
        std::fs::write(self.segment_path(&segment), &bytes)?;

        let mut manifest = self.manifest.clone();
        manifest.entries.push(ManifestEntry {
            segment,
            digest: sha256_hex(&bytes),
            prev_digest: self.manifest.head(),
        });
        let meta = StoreMeta {
            segment_count: index,
            record_count: self.meta.record_count + records.len() as u64,
            ..self.meta.clone()
        };
        write_json(&self.root.join(MANIFEST_FILE), &manifest)?;
        write_json(&self.root.join(META_FILE), &meta)?;

        // Only a fully written segment becomes visible in memory.
        self.manifest = manifest;
        self.meta = meta;
        tracing::debug!(segment = index, records = records.len(), "score segment written");
        Ok(())
    }

    fn load_segment(&self, index: u32) -> Result<Vec<ScoreRecord>, StoreError> {
        let segment = segment_name(index);
        let bytes = std::fs::read(self.segment_path(&segment))?;
        let entry = self
            .manifest
            .entry(&segment)
            .ok_or_else(|| StoreError::Untracked(segment.clone()))?;
        check_digest(entry, &bytes)?;
        decode_segment(&bytes)
    }
}

fn segment_name(index: u32) -> String {
    format!("{index:06}.scores.cbor.zst")
}

fn encode_segment(records: &[ScoreRecord]) -> Result<Vec<u8>, StoreError> {
    let mut cbor = Vec::new();
    ciborium::into_writer(records, &mut cbor).map_err(|e| StoreError::CborEncode(e.to_string()))?;
    Ok(zstd::encode_all(cbor.as_slice(), ZSTD_LEVEL)?)
}

fn decode_segment(bytes: &[u8]) -> Result<Vec<ScoreRecord>, StoreError> {
    let cbor = zstd::decode_all(bytes)?;
    ciborium::from_reader(cbor.as_slice()).map_err(|e| StoreError::CborDecode(e.to_string()))
}

fn check_digest(entry: &ManifestEntry, bytes: &[u8]) -> Result<(), StoreError> {
    let actual = sha256_hex(bytes);
    if actual != entry.digest {
        return Err(StoreError::IntegrityMismatch {
            expected: entry.digest.clone(),
            actual,
        });
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    Ok(serde_json::from_reader(std::fs::File::open(path)?)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    serde_json::to_writer_pretty(std::fs::File::create(path)?, value)?;
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scores");
        let store = ScoreStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert!(store.root().join(SEGMENT_DIR).is_dir());
        assert!(store.root().join(META_FILE).is_file());
        drop(store);

        let again = ScoreStore::open(&path).unwrap();
        assert_eq!(again.meta().segment_count, 0);
        assert_eq!(again.meta().schema_version, SCORE_SCHEMA_VERSION);
    }

    #[test]
    fn scores_survive_reopen_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scores");
        {
            let mut store = ScoreStore::open(&path).unwrap();
            store.insert("SLOW", 99_000).unwrap();
            store.insert("AB", 65_432).unwrap();
            store.insert_batch([("C", 70_000), ("D", 65_432)]).unwrap();
        }
        let mut store = ScoreStore::open(&path).unwrap();
        let aliases: Vec<_> = store.page(0, 10).iter().map(|r| r.alias.clone()).collect();
        assert_eq!(aliases, ["AB", "D", "C", "SLOW"]);
        assert_eq!(store.meta().segment_count, 3);
        assert_eq!(store.meta().record_count, 4);

        // Sequence numbers continue after a reopen.
        let next = store.insert("E", 1).unwrap();
        assert_eq!(next.seq, 4);
        assert_eq!(store.page(0, 1)[0].alias, "E");
        store.verify_integrity().unwrap();
    }

    #[test]
    fn empty_batch_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = ScoreStore::open(tmp.path()).unwrap();
        assert!(store.insert_batch(Vec::<(&str, u64)>::new()).unwrap().is_empty());
        assert_eq!(store.meta().segment_count, 0);
    }

    #[test]
    fn failed_metadata_write_leaves_store_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scores");
        let mut store = ScoreStore::open(&path).unwrap();
        store.insert("AB", 5_000).unwrap();
        let before = store.meta().clone();

        // A directory in place of the meta file makes the second write fail.
        let meta_path = path.join(META_FILE);
        std::fs::remove_file(&meta_path).unwrap();
        std::fs::create_dir(&meta_path).unwrap();
        assert!(matches!(store.insert("CD", 4_000), Err(StoreError::Io(_))));
        assert_eq!(store.meta(), &before);
        assert_eq!(store.len(), 1);
        assert_eq!(store.manifest.entries.len(), 1);

        // Once the disk recovers the retry reuses the same segment index.
        std::fs::remove_dir(&meta_path).unwrap();
        store.insert("CD", 4_000).unwrap();
        assert_eq!(store.meta().segment_count, 2);
        assert_eq!(store.meta().record_count, 2);
        store.verify_integrity().unwrap();
        drop(store);

        let reopened = ScoreStore::open(&path).unwrap();
        let aliases: Vec<_> = reopened.page(0, 10).iter().map(|r| r.alias.clone()).collect();
        assert_eq!(aliases, ["CD", "AB"]);
        reopened.verify_integrity().unwrap();
    }

    #[test]
    fn corruption_fails_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scores");
        let mut store = ScoreStore::open(&path).unwrap();
        store.insert("AB", 65_432).unwrap();
        drop(store);

        let segment = path.join(SEGMENT_DIR).join(segment_name(1));
        let mut bytes = std::fs::read(&segment).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&segment, &bytes).unwrap();

        match ScoreStore::open(&path) {
            Err(StoreError::IntegrityMismatch { .. }) => {}
            other => panic!("expected IntegrityMismatch, got {other:?}"),
        }
    }

    #[test]
    fn schema_mismatch_fails_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scores");
        let _store = ScoreStore::open(&path).unwrap();

        let meta_path = path.join(META_FILE);
        let mut meta: StoreMeta = read_json(&meta_path).unwrap();
        meta.schema_version = 999;
        write_json(&meta_path, &meta).unwrap();

        match ScoreStore::open(&path) {
            Err(StoreError::SchemaMismatch {
                file_version,
                expected_version,
            }) => {
                assert_eq!(file_version, 999);
                assert_eq!(expected_version, SCORE_SCHEMA_VERSION);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn untracked_segment_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scores");
        let mut store = ScoreStore::open(&path).unwrap();
        store.insert("AB", 1).unwrap();
        drop(store);

        std::fs::write(path.join(MANIFEST_FILE), r#"{ "entries": [] }"#).unwrap();
        assert!(matches!(ScoreStore::open(&path), Err(StoreError::Untracked(_))));
    }

    #[test]
    fn broken_chain_is_reported_by_verify() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = ScoreStore::open(tmp.path()).unwrap();
        store.insert("A", 10).unwrap();
        store.insert("B", 20).unwrap();
        store.verify_integrity().unwrap();

        store.manifest.entries[1].prev_digest = None;
        assert!(matches!(
            store.verify_integrity(),
            Err(StoreError::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn segment_codec_keeps_records() {
        let records = vec![ScoreRecord {
            alias: "AB".into(),
            time_ms: 65_432,
            seq: 0,
        }];
        let bytes = encode_segment(&records).unwrap();
        assert_eq!(decode_segment(&bytes).unwrap(), records);
        assert!(matches!(decode_segment(b"not zstd"), Err(StoreError::Io(_))));
    }
}
