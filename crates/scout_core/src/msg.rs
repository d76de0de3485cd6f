use crate::{CompanyRow, LeaderboardEntry, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the company list (newline-delimited).
    SearchInputChanged(String),
    /// User submitted the current company list.
    SearchSubmitted,
    /// Engine opened the result channel for a search.
    SearchOpened { request_id: RequestId },
    /// Engine decoded one result record.
    SearchRecord {
        request_id: RequestId,
        row: CompanyRow,
    },
    /// Engine saw the result channel end.
    SearchEnded { request_id: RequestId },
    /// Engine reported a transport or decoding failure.
    SearchFailed {
        request_id: RequestId,
        message: String,
    },
    /// Front-end picked a fresh hidden number.
    NewGame { target: u32 },
    /// User entered a guess (raw text).
    GuessSubmitted(String),
    /// User asked to submit the current score under `name`.
    ScoreSubmitted { name: String },
    /// Server accepted the score.
    ScoreAccepted,
    /// Score submission failed.
    ScoreRejected { message: String },
    /// User asked for the leaderboard.
    LeaderboardRequested,
    /// Server returned the leaderboard, in display order.
    LeaderboardLoaded(Vec<LeaderboardEntry>),
    /// Leaderboard fetch failed.
    LeaderboardFailed { message: String },
}
