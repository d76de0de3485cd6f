use crate::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartSearch {
        request_id: RequestId,
        companies: Vec<String>,
    },
    CloseSearch {
        request_id: RequestId,
        reason: CloseReason,
    },
    NewGameRequested,
    SubmitScore { name: String, score: u32 },
    FetchLeaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Every expected record arrived.
    Completed,
    /// Transport or decoding error.
    Failed,
    /// A newer search replaced this one.
    Superseded,
}
