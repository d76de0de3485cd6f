use crate::game::{GamePhase, GameSession};
use crate::query::DEFAULT_MAX_COMPANIES;
use crate::view_model::{AppViewModel, GameView, LeaderboardRowView, SearchView};

pub type RequestId = u64;

/// Shown in place of the results after any transport or decoding failure.
pub const SEARCH_FAILED_TEXT: &str = "An error occurred while searching. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Dispatching,
    Streaming,
    Completed,
    Errored,
}

impl SearchPhase {
    pub fn is_active(self) -> bool {
        matches!(self, SearchPhase::Dispatching | SearchPhase::Streaming)
    }
}

/// One rendered search result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompanyRow {
    pub company_name: String,
    pub employee_count: Option<u64>,
    pub website: Option<String>,
    pub sources: Vec<String>,
    /// Per-source count breakdown, sorted by source label.
    pub counts: Vec<(String, u64)>,
    /// Set when the server could not look this company up.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient user-facing message. `id` increases with every notice so the
/// front-end can tell a repeated text from a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SearchSession {
    request_id: Option<RequestId>,
    phase: SearchPhase,
    processed: usize,
    total: usize,
    rows: Vec<CompanyRow>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    search_input: String,
    max_companies: Option<usize>,
    next_request_id: RequestId,
    search: SearchSession,
    game: GameSession,
    leaderboard: Vec<LeaderboardEntry>,
    leaderboard_revision: u64,
    /// Counts started games so a late score reply can tell whose it was.
    game_serial: u64,
    /// Serial of the game whose score POST awaits a reply. Outlives resets.
    score_in_flight: Option<u64>,
    notice: Option<Notice>,
    next_notice_id: u64,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            search_input: String::new(),
            max_companies: Some(DEFAULT_MAX_COMPANIES),
            next_request_id: 1,
            search: SearchSession::default(),
            game: GameSession::default(),
            leaderboard: Vec::new(),
            leaderboard_revision: 0,
            game_serial: 0,
            score_in_flight: None,
            notice: None,
            next_notice_id: 1,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` lifts the per-search company limit.
    pub fn with_max_companies(mut self, max: Option<usize>) -> Self {
        self.max_companies = max;
        self
    }

    pub fn view(&self) -> AppViewModel {
        let search = &self.search;
        let loading = search.phase.is_active();
        AppViewModel {
            search: SearchView {
                phase: search.phase,
                request_id: search.request_id,
                processed: search.processed,
                total: search.total,
                rows: search.rows.clone(),
                error: search.error.clone(),
                loading,
                search_enabled: !loading,
            },
            game: GameView {
                phase: self.game.phase(),
                attempts: self.game.attempts(),
                message: self.game.message().map(ToOwned::to_owned),
                can_submit_score: self.game.phase() == GamePhase::Won
                    && self.score_in_flight.is_none(),
            },
            leaderboard: self
                .leaderboard
                .iter()
                .enumerate()
                .map(|(index, entry)| LeaderboardRowView {
                    rank: index + 1,
                    name: entry.name.clone(),
                    score: entry.score,
                    date: entry.date.clone(),
                })
                .collect(),
            leaderboard_revision: self.leaderboard_revision,
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// True while a search channel is open.
    pub fn is_searching(&self) -> bool {
        self.search.phase.is_active()
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn search_input(&self) -> &str {
        &self.search_input
    }

    pub(crate) fn set_search_input(&mut self, text: String) {
        if self.search_input != text {
            self.search_input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn max_companies(&self) -> Option<usize> {
        self.max_companies
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        self.notice = Some(Notice {
            id,
            level,
            text: text.into(),
        });
        self.mark_dirty();
    }

    // Search session.

    /// Request id of the search whose channel is still open, if any.
    pub(crate) fn active_request(&self) -> Option<RequestId> {
        self.search
            .request_id
            .filter(|_| self.search.phase.is_active())
    }

    /// Resets the results view for a new search and returns its request id.
    pub(crate) fn begin_search(&mut self, total: usize) -> RequestId {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.search = SearchSession {
            request_id: Some(request_id),
            phase: SearchPhase::Dispatching,
            processed: 0,
            total,
            rows: Vec::new(),
            error: None,
        };
        self.mark_dirty();
        request_id
    }

    /// True when `request_id` belongs to the search that is still running.
    pub(crate) fn is_live(&self, request_id: RequestId) -> bool {
        self.active_request() == Some(request_id)
    }

    pub(crate) fn mark_streaming(&mut self) {
        if self.search.phase == SearchPhase::Dispatching {
            self.search.phase = SearchPhase::Streaming;
            self.mark_dirty();
        }
    }

    /// Appends a row; returns true when this row completed the search.
    pub(crate) fn push_row(&mut self, row: CompanyRow) -> bool {
        self.search.phase = SearchPhase::Streaming;
        self.search.processed += 1;
        self.search.rows.push(row);
        self.mark_dirty();
        if self.search.processed >= self.search.total {
            self.search.phase = SearchPhase::Completed;
            true
        } else {
            false
        }
    }

    pub(crate) fn fail_search(&mut self) {
        self.search.phase = SearchPhase::Errored;
        self.search.rows.clear();
        self.search.error = Some(SEARCH_FAILED_TEXT.to_string());
        self.mark_dirty();
    }

    pub(crate) fn search_progress(&self) -> (usize, usize) {
        (self.search.processed, self.search.total)
    }

    // Game session.

    pub(crate) fn game(&self) -> &GameSession {
        &self.game
    }

    pub(crate) fn game_mut(&mut self) -> &mut GameSession {
        self.mark_dirty();
        &mut self.game
    }

    pub(crate) fn start_game(&mut self, target: u32) {
        self.game = GameSession::start(target);
        self.game_serial += 1;
        self.mark_dirty();
    }

    pub(crate) fn score_in_flight(&self) -> bool {
        self.score_in_flight.is_some()
    }

    pub(crate) fn begin_score_submission(&mut self) {
        self.score_in_flight = Some(self.game_serial);
        self.mark_dirty();
    }

    /// Clears the in-flight submission; true when it belonged to the
    /// game still on screen.
    pub(crate) fn finish_score_submission(&mut self) -> bool {
        self.mark_dirty();
        self.score_in_flight.take() == Some(self.game_serial)
    }

    pub(crate) fn set_leaderboard(&mut self, entries: Vec<LeaderboardEntry>) {
        self.leaderboard = entries;
        self.leaderboard_revision += 1;
        self.mark_dirty();
    }
}
