use std::sync::mpsc;
use std::thread;

use rand::Rng;
use scout_core::{CompanyRow, Effect, LeaderboardEntry, Msg, GUESS_RANGE};
use scout_engine::{CompanyRecord, EngineEvent, EngineHandle, LeaderboardRecord};
use scout_logging::{scout_debug, scout_info, scout_warn};

use super::app::Inbound;

/// Executes core effects against the engine and feeds engine events back
/// into the control loop as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    inbound: mpsc::Sender<Inbound>,
    /// Leaderboard and score requests sent but not yet answered.
    pending_requests: usize,
}

impl EffectRunner {
    pub fn new(mut engine: EngineHandle, inbound: mpsc::Sender<Inbound>) -> Self {
        match engine.take_events() {
            Some(events) => spawn_event_loop(events, inbound.clone()),
            None => scout_warn!("Engine events already taken; replies will not arrive"),
        }
        Self {
            engine,
            inbound,
            pending_requests: 0,
        }
    }

    /// True while a leaderboard or score request awaits its reply.
    pub fn has_pending_requests(&self) -> bool {
        self.pending_requests > 0
    }

    /// Called for every `Inbound::RequestDone`.
    pub fn request_done(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartSearch {
                    request_id,
                    companies,
                } => {
                    scout_info!(
                        "StartSearch request_id={} companies={}",
                        request_id,
                        companies.len()
                    );
                    self.engine.start_search(request_id, companies);
                }
                Effect::CloseSearch { request_id, reason } => {
                    scout_info!("CloseSearch request_id={} reason={:?}", request_id, reason);
                    self.engine.close_search(request_id);
                }
                Effect::NewGameRequested => {
                    let target = rand::thread_rng().gen_range(GUESS_RANGE);
                    scout_debug!("NewGameRequested");
                    let _ = self.inbound.send(Inbound::Msg(Msg::NewGame { target }));
                }
                Effect::SubmitScore { name, score } => {
                    scout_info!("SubmitScore score={}", score);
                    self.pending_requests += 1;
                    self.engine.submit_score(name, score);
                }
                Effect::FetchLeaderboard => {
                    scout_debug!("FetchLeaderboard");
                    self.pending_requests += 1;
                    self.engine.fetch_leaderboard();
                }
            }
        }
    }

}

/// Forwards engine events in arrival order. A request's `RequestDone`
/// follows its messages on the same channel.
fn spawn_event_loop(events: mpsc::Receiver<EngineEvent>, inbound: mpsc::Sender<Inbound>) {
    thread::spawn(move || {
        while let Ok(event) = events.recv() {
            let done = answers_request(&event);
            for msg in map_event(event) {
                if inbound.send(Inbound::Msg(msg)).is_err() {
                    return;
                }
            }
            if done && inbound.send(Inbound::RequestDone).is_err() {
                return;
            }
        }
    });
}

fn answers_request(event: &EngineEvent) -> bool {
    matches!(
        event,
        EngineEvent::LeaderboardFetched(_) | EngineEvent::ScoreSubmitted(_)
    )
}

pub(crate) fn map_event(event: EngineEvent) -> Vec<Msg> {
    match event {
        EngineEvent::SearchOpened { request_id } => vec![Msg::SearchOpened { request_id }],
        EngineEvent::SearchRecord { request_id, record } => vec![Msg::SearchRecord {
            request_id,
            row: map_record(record),
        }],
        EngineEvent::SearchFinished { request_id, .. } => vec![Msg::SearchEnded { request_id }],
        EngineEvent::SearchFailed { request_id, error } => vec![Msg::SearchFailed {
            request_id,
            message: error.to_string(),
        }],
        EngineEvent::LeaderboardFetched(Ok(entries)) => {
            vec![Msg::LeaderboardLoaded(map_leaderboard(entries))]
        }
        EngineEvent::LeaderboardFetched(Err(error)) => vec![Msg::LeaderboardFailed {
            message: error.to_string(),
        }],
        EngineEvent::ScoreSubmitted(Ok(receipt)) => match receipt.leaderboard {
            // Show the server's answer right away; the core still re-fetches.
            Some(entries) => vec![
                Msg::LeaderboardLoaded(map_leaderboard(entries)),
                Msg::ScoreAccepted,
            ],
            None => vec![Msg::ScoreAccepted],
        },
        EngineEvent::ScoreSubmitted(Err(error)) => vec![Msg::ScoreRejected {
            message: error.to_string(),
        }],
    }
}

fn map_record(record: CompanyRecord) -> CompanyRow {
    CompanyRow {
        company_name: record.company_name,
        employee_count: record.employee_count,
        website: record.company_website,
        sources: record.sources,
        counts: record
            .all_counts
            .map(|counts| counts.into_iter().collect())
            .unwrap_or_default(),
        error: record.error,
    }
}

fn map_leaderboard(entries: Vec<LeaderboardRecord>) -> Vec<LeaderboardEntry> {
    entries
        .into_iter()
        .map(|entry| LeaderboardEntry {
            name: entry.name,
            score: entry.score,
            date: entry.date,
        })
        .collect()
}
