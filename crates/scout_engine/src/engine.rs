use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use scout_logging::{scout_debug, scout_info, scout_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{ReqwestScoutApi, ScoutApi};
use crate::{ClientError, ClientSettings, EngineEvent, RequestId, ScoreSubmission};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] ClientError),
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    StartSearch {
        request_id: RequestId,
        companies: Vec<String>,
    },
    CloseSearch {
        request_id: RequestId,
    },
    FetchLeaderboard,
    SubmitScore(ScoreSubmission),
}

/// Handle to the background IO thread.
///
/// Events are read either through the handle or, after [`take_events`],
/// by whoever owns the receiver.
///
/// [`take_events`]: EngineHandle::take_events
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Option<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let api = ReqwestScoutApi::new(settings)?;
        Self::with_api(Arc::new(api))
    }

    pub fn with_api(api: Arc<dyn ScoutApi>) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("scout-io")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("scout-engine".to_string())
            .spawn(move || run_engine(runtime, api, cmd_rx, event_tx))?;

        Ok(Self {
            cmd_tx,
            event_rx: Some(event_rx),
        })
    }

    /// Opens a result channel for `request_id`, closing any channel still open.
    pub fn start_search(&self, request_id: RequestId, companies: Vec<String>) {
        let _ = self.cmd_tx.send(EngineCommand::StartSearch {
            request_id,
            companies,
        });
    }

    /// Closes the channel of `request_id` if it is the open one.
    pub fn close_search(&self, request_id: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::CloseSearch { request_id });
    }

    pub fn fetch_leaderboard(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchLeaderboard);
    }

    pub fn submit_score(&self, name: impl Into<String>, score: u32) {
        let _ = self.cmd_tx.send(EngineCommand::SubmitScore(ScoreSubmission {
            name: name.into(),
            score,
        }));
    }

    /// Hands the event queue to a dedicated consumer. Afterwards the
    /// handle's own `try_recv`/`recv_timeout` always return `None`.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<EngineEvent>> {
        self.event_rx.take()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.as_ref()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.as_ref()?.recv_timeout(timeout).ok()
    }
}

fn run_engine(
    runtime: tokio::runtime::Runtime,
    api: Arc<dyn ScoutApi>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut active: Option<(RequestId, CancellationToken)> = None;

    while let Ok(command) = cmd_rx.recv() {
        let api = api.clone();
        let sink = ChannelEventSink::new(event_tx.clone());
        match command {
            EngineCommand::StartSearch {
                request_id,
                companies,
            } => {
                if let Some((previous, token)) = active.take() {
                    scout_debug!("Closing search {} before opening {}", previous, request_id);
                    token.cancel();
                }
                let token = CancellationToken::new();
                active = Some((request_id, token.clone()));
                runtime.spawn(async move {
                    run_search(api.as_ref(), request_id, companies, token, &sink).await;
                });
            }
            EngineCommand::CloseSearch { request_id } => {
                if matches!(&active, Some((open, _)) if *open == request_id) {
                    if let Some((_, token)) = active.take() {
                        scout_debug!("Closing search {}", request_id);
                        token.cancel();
                    }
                }
            }
            EngineCommand::FetchLeaderboard => {
                runtime.spawn(async move {
                    let result = api.fetch_leaderboard().await;
                    if let Err(err) = &result {
                        scout_warn!("Leaderboard fetch failed: {}", err);
                    }
                    sink.emit(EngineEvent::LeaderboardFetched(result));
                });
            }
            EngineCommand::SubmitScore(submission) => {
                runtime.spawn(async move {
                    let result = api.submit_score(&submission).await;
                    if let Err(err) = &result {
                        scout_warn!("Score submission failed: {}", err);
                    }
                    sink.emit(EngineEvent::ScoreSubmitted(result));
                });
            }
        }
    }

    if let Some((_, token)) = active.take() {
        token.cancel();
    }
    runtime.shutdown_timeout(Duration::from_millis(500));
    scout_debug!("Engine stopped");
}

/// Drives one search to its end, reporting through `sink`.
///
/// Once `cancel` fires nothing more is emitted for `request_id` and the
/// response body is dropped.
pub async fn run_search(
    api: &dyn ScoutApi,
    request_id: RequestId,
    companies: Vec<String>,
    cancel: CancellationToken,
    sink: &dyn EventSink,
) {
    let total = companies.len();
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            scout_debug!("Search {} closed before the server answered", request_id);
            return;
        }
        opened = api.open_search(&companies) => opened,
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(error) => {
            scout_warn!("Search {} could not start: {}", request_id, error);
            sink.emit(EngineEvent::SearchFailed { request_id, error });
            return;
        }
    };
    sink.emit(EngineEvent::SearchOpened { request_id });

    let mut received = 0usize;
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                scout_debug!(
                    "Search {} closed after {} of {} results",
                    request_id,
                    received,
                    total
                );
                return;
            }
            next = stream.next() => next,
        };
        match next {
            Some(Ok(record)) => {
                received += 1;
                sink.emit(EngineEvent::SearchRecord { request_id, record });
            }
            Some(Err(error)) => {
                scout_warn!(
                    "Search {} failed after {} of {} results: {}",
                    request_id,
                    received,
                    total,
                    error
                );
                sink.emit(EngineEvent::SearchFailed { request_id, error });
                return;
            }
            None => break,
        }
    }

    scout_info!("Search {} received {} of {} results", request_id, received, total);
    sink.emit(EngineEvent::SearchFinished {
        request_id,
        received,
    });
}
