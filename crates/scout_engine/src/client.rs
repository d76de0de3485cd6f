use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use scout_logging::{scout_debug, scout_info, scout_trace, scout_warn};

use crate::sse::SseDecoder;
use crate::wire::{parse_leaderboard, parse_score_reply, ErrorBody};
use crate::{
    ClientError, ClientSettings, CompanyRecord, FailureKind, LeaderboardRecord, ScoreReceipt,
    ScoreSubmission, SearchRequest, TransportKind, SCHEMA_HEADER, SCHEMA_VERSION,
};

const EVENT_STREAM: &str = "text/event-stream";
const JSON: &str = "application/json";

/// The three server endpoints the client talks to.
#[async_trait::async_trait]
pub trait ScoutApi: Send + Sync {
    /// Sends the search and returns a stream over its results.
    async fn open_search(&self, companies: &[String]) -> Result<ResultStream, ClientError>;

    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardRecord>, ClientError>;

    async fn submit_score(&self, submission: &ScoreSubmission)
        -> Result<ScoreReceipt, ClientError>;
}

type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

enum Source {
    Buffered(VecDeque<Result<CompanyRecord, ClientError>>),
    Events {
        body: BodyStream,
        decoder: SseDecoder,
        pending: VecDeque<String>,
    },
}

/// Finite, one-at-a-time sequence of search results.
///
/// Yields at most the number of records the search asked for. After the last
/// record, an error, or the end of the body, the underlying connection is
/// dropped and every further call returns `None`.
pub struct ResultStream {
    source: Source,
    remaining: usize,
    idle_timeout: Option<Duration>,
}

impl ResultStream {
    /// A stream over already decoded items.
    pub fn buffered(items: Vec<Result<CompanyRecord, ClientError>>, expected: usize) -> Self {
        Self {
            source: Source::Buffered(items.into()),
            remaining: expected,
            idle_timeout: None,
        }
    }

    fn events(body: BodyStream, expected: usize, idle_timeout: Option<Duration>) -> Self {
        Self {
            source: Source::Events {
                body,
                decoder: SseDecoder::new(),
                pending: VecDeque::new(),
            },
            remaining: expected,
            idle_timeout,
        }
    }

    /// Records still expected before the stream closes itself.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub async fn next(&mut self) -> Option<Result<CompanyRecord, ClientError>> {
        if self.remaining == 0 {
            self.close();
            return None;
        }

        let item = match &mut self.source {
            Source::Buffered(queue) => queue.pop_front(),
            Source::Events {
                body,
                decoder,
                pending,
            } => next_event(body, decoder, pending, self.idle_timeout).await,
        };

        match item {
            Some(Ok(record)) => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.close();
                }
                Some(Ok(record))
            }
            Some(Err(err)) => {
                self.remaining = 0;
                self.close();
                Some(Err(err))
            }
            None => {
                self.remaining = 0;
                self.close();
                None
            }
        }
    }

    fn close(&mut self) {
        if !matches!(&self.source, Source::Buffered(queue) if queue.is_empty()) {
            self.source = Source::Buffered(VecDeque::new());
        }
    }
}

async fn next_event(
    body: &mut BodyStream,
    decoder: &mut SseDecoder,
    pending: &mut VecDeque<String>,
    idle_timeout: Option<Duration>,
) -> Option<Result<CompanyRecord, ClientError>> {
    loop {
        if let Some(data) = pending.pop_front() {
            return Some(CompanyRecord::from_json(&data));
        }

        let chunk = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, body.next()).await {
                Ok(chunk) => chunk,
                Err(_) => {
                    return Some(Err(ClientError::new(
                        FailureKind::Timeout,
                        format!("result stream idle for {limit:?}"),
                    )))
                }
            },
            None => body.next().await,
        };

        match chunk {
            Some(Ok(bytes)) => {
                for event in decoder.feed(&bytes) {
                    if event.is_message() && !event.data.is_empty() {
                        pending.push_back(event.data);
                    } else {
                        scout_trace!("Skipping event {:?}", event.event);
                    }
                }
            }
            Some(Err(err)) => return Some(Err(map_reqwest_error(err))),
            None => {
                if decoder.finish() {
                    scout_debug!("Result stream ended inside an event; discarded it");
                }
                return None;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestScoutApi {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestScoutApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        // Timeouts are per request; result streams have none.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl ScoutApi for ReqwestScoutApi {
    async fn open_search(&self, companies: &[String]) -> Result<ResultStream, ClientError> {
        let url = self.settings.endpoint(&self.settings.search_path)?;
        let body = encode_json(&SearchRequest { companies })?;
        let transport = self.settings.transport;
        scout_info!(
            "POST {} companies={} transport={}",
            url,
            companies.len(),
            transport
        );

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON)
            .header(SCHEMA_HEADER, SCHEMA_VERSION.to_string())
            .body(body);
        request = match transport {
            TransportKind::Streaming => request.header(ACCEPT, EVENT_STREAM),
            TransportKind::Batch => request
                .header(ACCEPT, JSON)
                .timeout(self.settings.request_timeout),
        };

        let response = request.send().await.map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;

        match transport {
            TransportKind::Streaming => {
                let content_type = content_type_of(&response);
                if !content_type
                    .as_deref()
                    .is_some_and(|ct| ct.eq_ignore_ascii_case(EVENT_STREAM))
                {
                    scout_warn!(
                        "Search response content type {:?} is not {}",
                        content_type,
                        EVENT_STREAM
                    );
                }
                Ok(ResultStream::events(
                    Box::pin(response.bytes_stream()),
                    companies.len(),
                    self.settings.stream_idle_timeout,
                ))
            }
            TransportKind::Batch => {
                let bytes = response.bytes().await.map_err(map_reqwest_error)?;
                let values: Vec<serde_json::Value> = serde_json::from_slice(&bytes)
                    .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
                let items = values
                    .into_iter()
                    .map(CompanyRecord::from_value)
                    .collect();
                Ok(ResultStream::buffered(items, companies.len()))
            }
        }
    }

    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardRecord>, ClientError> {
        let url = self.settings.endpoint(&self.settings.leaderboard_path)?;
        scout_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        parse_leaderboard(&bytes)
    }

    async fn submit_score(
        &self,
        submission: &ScoreSubmission,
    ) -> Result<ScoreReceipt, ClientError> {
        let url = self.settings.endpoint(&self.settings.submit_score_path)?;
        scout_info!("POST {} score={}", url, submission.score);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .timeout(self.settings.request_timeout)
            .body(encode_json(submission)?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        parse_score_reply(&bytes)
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(value).map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
}

/// Turns a non-2xx response into an error, preferring the server's
/// `{"error": ...}` message over the bare status line.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string()),
        Err(_) => status.to_string(),
    };
    Err(ClientError::new(
        FailureKind::HttpStatus(status.as_u16()),
        message,
    ))
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::Decode, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;

    fn record(name: &str) -> CompanyRecord {
        CompanyRecord {
            company_name: name.to_string(),
            ..CompanyRecord::default()
        }
    }

    #[tokio::test]
    async fn buffered_stream_stops_at_expected_count() {
        let mut stream =
            ResultStream::buffered(vec![Ok(record("a")), Ok(record("b")), Ok(record("c"))], 2);
        assert_eq!(stream.next().await, Some(Ok(record("a"))));
        assert_eq!(stream.next().await, Some(Ok(record("b"))));
        assert_eq!(stream.remaining(), 0);
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn error_ends_the_stream() {
        let failure = ClientError::new(FailureKind::Decode, "bad");
        let mut stream =
            ResultStream::buffered(vec![Err(failure.clone()), Ok(record("late"))], 2);
        assert_eq!(stream.next().await, Some(Err(failure)));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn quiet_stream_times_out() {
        let first: Result<Bytes, reqwest::Error> =
            Ok(Bytes::from_static(b"data: {\"company_name\":\"Acme\"}\n\n"));
        let body: BodyStream = Box::pin(stream::iter(vec![first]).chain(stream::pending()));
        let mut results = ResultStream::events(body, 2, Some(Duration::from_millis(50)));

        assert_eq!(results.next().await, Some(Ok(record("Acme"))));
        match results.next().await {
            Some(Err(err)) => assert_eq!(err.kind, FailureKind::Timeout),
            other => panic!("expected idle timeout, got {other:?}"),
        }
        assert_eq!(results.next().await, None);
    }

    #[tokio::test]
    async fn short_source_ends_with_none() {
        let mut stream = ResultStream::buffered(vec![Ok(record("a"))], 3);
        assert!(stream.next().await.is_some());
        assert_eq!(stream.next().await, None);
        assert_eq!(stream.remaining(), 0);
    }
}
