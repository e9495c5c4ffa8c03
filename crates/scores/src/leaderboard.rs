use crate::entry::{ScoreEntry, ScoreSubmission};
use crate::error::ScoreError;
use crate::format::{format_rank, format_time};
use crate::service::{PAGE_SIZE, ScoreService};

/// One rendered leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// One-based, zero-padded rank.
    pub rank: String,
    pub alias: String,
    pub time: String,
    pub time_ms: u64,
    /// Highlight for the player's own submission.
    pub is_me: bool,
}

/// A page fetch handed out by [`Leaderboard::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
    generation: u64,
}

/// Paginated leaderboard view.
///
/// At most one page is in flight. Results that arrive after the view was
/// reset or closed, or for an offset the view has moved past, are dropped.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    page_size: usize,
    me: Option<ScoreSubmission>,
    rows: Vec<LeaderboardRow>,
    current_offset: usize,
    is_loading: bool,
    has_more: bool,
    generation: u64,
    last_error: Option<String>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Leaderboard {
    pub fn new(me: Option<ScoreSubmission>) -> Self {
        Self::with_page_size(me, PAGE_SIZE)
    }

    pub fn with_page_size(me: Option<ScoreSubmission>, page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            me,
            rows: Vec::new(),
            current_offset: 0,
            is_loading: false,
            has_more: true,
            generation: 0,
            last_error: None,
        }
    }

    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn current_offset(&self) -> usize {
        self.current_offset
    }

    /// Message from the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start over, e.g. after a new submission. Invalidates any page in
    /// flight.
    pub fn reset(&mut self, me: Option<ScoreSubmission>) {
        let generation = self.generation + 1;
        *self = Self::with_page_size(me, self.page_size);
        self.generation = generation;
    }

    /// The view was hidden; any page in flight is dropped when it lands.
    pub fn close(&mut self) {
        self.generation += 1;
        self.is_loading = false;
    }

    /// Claim the next page. `None` while a page is in flight or once the
    /// board is exhausted.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.is_loading || !self.has_more {
            tracing::trace!(
                loading = self.is_loading,
                has_more = self.has_more,
                "leaderboard load skipped"
            );
            return None;
        }
        self.is_loading = true;
        Some(PageRequest {
            offset: self.current_offset,
            limit: self.page_size,
            generation: self.generation,
        })
    }

    /// Apply a fetched page. Returns `false` when the result was stale and
    /// discarded.
    pub fn finish_load(
        &mut self,
        request: PageRequest,
        result: Result<Vec<ScoreEntry>, ScoreError>,
    ) -> bool {
        if request.generation != self.generation || request.offset != self.current_offset {
            tracing::debug!(
                offset = request.offset,
                current = self.current_offset,
                "discarding stale leaderboard page"
            );
            return false;
        }
        self.is_loading = false;
        let scores = match result {
            Ok(scores) => scores,
            Err(err) => {
                tracing::warn!(error = %err, offset = request.offset, "leaderboard fetch failed");
                self.last_error = Some(err.to_string());
                return true;
            }
        };
        self.last_error = None;
        if scores.len() < self.page_size {
            self.has_more = false;
        }
        let base = self.current_offset;
        self.rows.extend(scores.iter().enumerate().map(|(idx, entry)| LeaderboardRow {
            rank: format_rank(base + idx + 1),
            alias: entry.alias.clone(),
            time: format_time(entry.time_ms),
            time_ms: entry.time_ms,
            is_me: self.me.as_ref().is_some_and(|me| me.matches(entry)),
        }));
        self.current_offset += scores.len();
        true
    }

    /// Fetch and apply the next page from `service`. Returns `false` when no
    /// fetch was started or its result was discarded.
    pub async fn load_more<S: ScoreService>(&mut self, service: &S) -> bool {
        let Some(request) = self.begin_load() else {
            return false;
        };
        let result = service.top_scores(request.limit, request.offset).await;
        self.finish_load(request, result)
    }
}
