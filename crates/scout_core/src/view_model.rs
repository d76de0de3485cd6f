use crate::{CompanyRow, GamePhase, Notice, RequestId, SearchPhase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub search: SearchView,
    pub game: GameView,
    pub leaderboard: Vec<LeaderboardRowView>,
    /// Bumped on every leaderboard load, even when the rows are unchanged.
    pub leaderboard_revision: u64,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchView {
    pub phase: SearchPhase,
    pub request_id: Option<RequestId>,
    pub processed: usize,
    pub total: usize,
    pub rows: Vec<CompanyRow>,
    /// Replaces `rows` when the search failed.
    pub error: Option<String>,
    pub loading: bool,
    pub search_enabled: bool,
}

impl SearchView {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.processed.min(self.total) as f64 / self.total as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameView {
    pub phase: GamePhase,
    pub attempts: u32,
    pub message: Option<String>,
    pub can_submit_score: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRowView {
    pub rank: usize,
    pub name: String,
    pub score: u32,
    pub date: Option<String>,
}
