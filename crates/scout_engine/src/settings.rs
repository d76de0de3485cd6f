use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ClientError, FailureKind};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// How search results travel back from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Server-sent events, one record per message.
    #[default]
    Streaming,
    /// One JSON array with every record.
    Batch,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "streaming" | "stream" | "sse" => Ok(TransportKind::Streaming),
            "batch" | "json" => Ok(TransportKind::Batch),
            other => Err(format!(
                "unknown transport '{other}' (expected 'streaming' or 'batch')"
            )),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Streaming => write!(f, "streaming"),
            TransportKind::Batch => write!(f, "batch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub transport: TransportKind,
    pub connect_timeout: Duration,
    /// Whole-request limit for batch search, leaderboard and score calls.
    pub request_timeout: Duration,
    /// Longest quiet gap tolerated on a result stream. `None` waits forever.
    pub stream_idle_timeout: Option<Duration>,
    pub search_path: String,
    pub submit_score_path: String,
    pub leaderboard_path: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: TransportKind::Streaming,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            stream_idle_timeout: None,
            search_path: "/search".to_string(),
            submit_score_path: "/submit-score".to_string(),
            leaderboard_path: "/leaderboard".to_string(),
        }
    }
}

impl ClientSettings {
    /// Resolves an endpoint path below `base_url`, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let mut base = Url::parse(&self.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be a base url", self.base_url),
            ));
        }
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_base(base: &str) -> ClientSettings {
        ClientSettings {
            base_url: base.to_string(),
            ..ClientSettings::default()
        }
    }

    #[test]
    fn endpoint_joins_below_base_path() {
        let settings = with_base("http://localhost:8080/api");
        assert_eq!(
            settings.endpoint("/search").unwrap().as_str(),
            "http://localhost:8080/api/search"
        );
        assert_eq!(
            with_base("http://localhost:8080")
                .endpoint("leaderboard")
                .unwrap()
                .as_str(),
            "http://localhost:8080/leaderboard"
        );
    }

    #[test]
    fn invalid_base_is_reported() {
        let err = with_base("not a url").endpoint("/search").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
        let err = with_base("mailto:someone@example.com")
            .endpoint("/search")
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }

    #[test]
    fn transport_parses_aliases() {
        assert_eq!("SSE".parse::<TransportKind>(), Ok(TransportKind::Streaming));
        assert_eq!("batch".parse::<TransportKind>(), Ok(TransportKind::Batch));
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }
}
