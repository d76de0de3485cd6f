//! Scout core: pure state machine and view-model helpers.
mod effect;
mod game;
mod msg;
mod query;
mod state;
mod update;
mod view_model;

pub use effect::{CloseReason, Effect};
pub use game::{GamePhase, GuessOutcome, GUESS_RANGE};
pub use msg::Msg;
pub use query::{CompanyQuery, QueryError, DEFAULT_MAX_COMPANIES};
pub use state::{
    AppState, CompanyRow, LeaderboardEntry, Notice, NoticeLevel, RequestId, SearchPhase,
    SEARCH_FAILED_TEXT,
};
pub use update::update;
pub use view_model::{AppViewModel, GameView, LeaderboardRowView, SearchView};
