//! Canonical JSON shapes exchanged with the scout server.
//!
//! Result records follow schema version [`SCHEMA_VERSION`]. The version is
//! announced in the [`SCHEMA_HEADER`] request header; a record that names a
//! different version is rejected rather than guessed at.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ClientError, FailureKind};

pub const SCHEMA_VERSION: u32 = 1;
pub const SCHEMA_HEADER: &str = "x-result-schema";

/// One company's search outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    pub company_name: String,
    #[serde(default)]
    pub employee_count: Option<u64>,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    /// Per-source employee counts, keyed by source label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_counts: Option<BTreeMap<String, u64>>,
    /// Server-side lookup failure for this company only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompanyRecord {
    pub fn from_json(text: &str) -> Result<Self, ClientError> {
        let record: CompanyRecord = serde_json::from_str(text)
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
        record.checked()
    }

    pub(crate) fn from_value(value: serde_json::Value) -> Result<Self, ClientError> {
        let record: CompanyRecord = serde_json::from_value(value)
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
        record.checked()
    }

    fn checked(self) -> Result<Self, ClientError> {
        match self.schema_version {
            Some(version) if version != SCHEMA_VERSION => Err(ClientError::new(
                FailureKind::Decode,
                format!("unsupported result schema version {version}"),
            )),
            _ => Ok(self),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub companies: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRecord {
    pub name: String,
    pub score: u32,
    #[serde(default)]
    pub date: Option<String>,
}

/// Outcome of a score submission. Some servers answer with the updated
/// leaderboard, others with a bare success flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreReceipt {
    pub leaderboard: Option<Vec<LeaderboardRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LeaderboardPayload {
    Entries(Vec<LeaderboardRecord>),
    Wrapped { leaderboard: Vec<LeaderboardRecord> },
}

pub(crate) fn parse_leaderboard(bytes: &[u8]) -> Result<Vec<LeaderboardRecord>, ClientError> {
    let payload: LeaderboardPayload = serde_json::from_slice(bytes)
        .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
    Ok(match payload {
        LeaderboardPayload::Entries(entries) => entries,
        LeaderboardPayload::Wrapped { leaderboard } => leaderboard,
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScoreReply {
    Entries(Vec<LeaderboardRecord>),
    Status {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default)]
        leaderboard: Option<Vec<LeaderboardRecord>>,
        #[serde(default)]
        error: Option<String>,
    },
}

pub(crate) fn parse_score_reply(bytes: &[u8]) -> Result<ScoreReceipt, ClientError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ScoreReceipt::default());
    }
    let reply: ScoreReply = serde_json::from_slice(bytes)
        .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
    match reply {
        ScoreReply::Entries(entries) => Ok(ScoreReceipt {
            leaderboard: Some(entries),
        }),
        ScoreReply::Status {
            success: Some(false),
            error,
            ..
        } => Err(ClientError::new(
            FailureKind::Rejected,
            error.unwrap_or_else(|| "server reported failure".to_string()),
        )),
        ScoreReply::Status {
            success: None,
            error: Some(error),
            ..
        } => Err(ClientError::new(FailureKind::Rejected, error)),
        ScoreReply::Status { leaderboard, .. } => Ok(ScoreReceipt { leaderboard }),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
