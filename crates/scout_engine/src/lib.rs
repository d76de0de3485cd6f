//! Scout engine: HTTP client, result streams and effect execution.
mod client;
mod engine;
mod settings;
mod sse;
mod types;
mod wire;

pub use client::{ReqwestScoutApi, ResultStream, ScoutApi};
pub use engine::{run_search, ChannelEventSink, EngineError, EngineHandle, EventSink};
pub use settings::{ClientSettings, TransportKind, DEFAULT_BASE_URL};
pub use sse::{SseDecoder, SseEvent};
pub use types::{ClientError, EngineEvent, FailureKind, RequestId};
pub use wire::{
    CompanyRecord, LeaderboardRecord, ScoreReceipt, ScoreSubmission, SearchRequest,
    SCHEMA_HEADER, SCHEMA_VERSION,
};
