use serde::{Deserialize, Serialize};

/// One stored leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub alias: String,
    pub time_ms: u64,
    /// Insertion sequence number; breaks ties between equal times.
    pub seq: u64,
}

/// In-memory score table kept sorted by `(time_ms, seq)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    records: Vec<ScoreRecord>,
    next_seq: u64,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new score and return the stored record.
    pub fn insert(&mut self, alias: impl Into<String>, time_ms: u64) -> ScoreRecord {
        let record = ScoreRecord {
            alias: alias.into(),
            time_ms,
            seq: self.next_seq,
        };
        self.restore(record.clone());
        record
    }

    /// Re-insert a previously stored record, keeping its sequence number.
    pub fn restore(&mut self, record: ScoreRecord) {
        self.next_seq = self.next_seq.max(record.seq + 1);
        let key = (record.time_ms, record.seq);
        let at = self.records.partition_point(|r| (r.time_ms, r.seq) < key);
        self.records.insert(at, record);
    }

    /// Up to `limit` records starting at rank `offset` (zero-based), fastest
    /// first. Out-of-range offsets yield an empty page.
    pub fn page(&self, offset: usize, limit: usize) -> &[ScoreRecord] {
        let start = offset.min(self.records.len());
        let end = start.saturating_add(limit).min(self.records.len());
        &self.records[start..end]
    }

    /// Sequence number the next inserted record will receive.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreRecord> {
        self.records.iter()
    }
}
