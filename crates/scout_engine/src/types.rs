use std::fmt;

use crate::wire::{CompanyRecord, LeaderboardRecord, ScoreReceipt};

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SearchOpened {
        request_id: RequestId,
    },
    SearchRecord {
        request_id: RequestId,
        record: CompanyRecord,
    },
    /// The result channel ended on its own after `received` records.
    SearchFinished {
        request_id: RequestId,
        received: usize,
    },
    SearchFailed {
        request_id: RequestId,
        error: ClientError,
    },
    LeaderboardFetched(Result<Vec<LeaderboardRecord>, ClientError>),
    ScoreSubmitted(Result<ScoreReceipt, ClientError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body was not the expected JSON or schema.
    Decode,
    /// Result stream ended before every record arrived.
    StreamClosed,
    /// Server answered but reported failure.
    Rejected,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::StreamClosed => write!(f, "stream closed early"),
            FailureKind::Rejected => write!(f, "rejected by server"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
