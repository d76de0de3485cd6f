use scout_logging::{scout_debug, scout_info, scout_warn};

use crate::game::{parse_guess, GamePhase, GuessOutcome};
use crate::{AppState, CloseReason, CompanyQuery, Effect, Msg, NoticeLevel};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SearchInputChanged(text) => {
            state.set_search_input(text);
            Vec::new()
        }
        Msg::SearchSubmitted => submit_search(&mut state),
        Msg::SearchOpened { request_id } => {
            if state.is_live(request_id) {
                state.mark_streaming();
            }
            Vec::new()
        }
        Msg::SearchRecord { request_id, row } => {
            if !state.is_live(request_id) {
                scout_debug!("Dropping record for inactive search {}", request_id);
                return (state, Vec::new());
            }
            if state.push_row(row) {
                let (processed, _) = state.search_progress();
                scout_info!("Search {} completed with {} results", request_id, processed);
                vec![Effect::CloseSearch {
                    request_id,
                    reason: CloseReason::Completed,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::SearchEnded { request_id } => {
            if !state.is_live(request_id) {
                return (state, Vec::new());
            }
            let (processed, total) = state.search_progress();
            scout_warn!(
                "Search {} stream closed early after {} of {} results",
                request_id,
                processed,
                total
            );
            state.fail_search();
            vec![Effect::CloseSearch {
                request_id,
                reason: CloseReason::Failed,
            }]
        }
        Msg::SearchFailed {
            request_id,
            message,
        } => {
            if !state.is_live(request_id) {
                scout_debug!("Ignoring failure for inactive search {}: {}", request_id, message);
                return (state, Vec::new());
            }
            scout_warn!("Search {} failed: {}", request_id, message);
            state.fail_search();
            vec![Effect::CloseSearch {
                request_id,
                reason: CloseReason::Failed,
            }]
        }
        Msg::NewGame { target } => {
            state.start_game(target);
            state.notify(NoticeLevel::Success, "New game started!");
            Vec::new()
        }
        Msg::GuessSubmitted(raw) => make_guess(&mut state, &raw),
        Msg::ScoreSubmitted { name } => submit_score(&mut state, &name),
        Msg::ScoreAccepted => {
            if !state.score_in_flight() {
                return (state, Vec::new());
            }
            let same_game = state.finish_score_submission();
            state.notify(NoticeLevel::Success, "Score submitted successfully!");
            let mut effects = vec![Effect::FetchLeaderboard];
            if same_game {
                effects.push(Effect::NewGameRequested);
            }
            effects
        }
        Msg::ScoreRejected { message } => {
            if !state.score_in_flight() {
                return (state, Vec::new());
            }
            scout_warn!("Score submission failed: {}", message);
            state.finish_score_submission();
            state.notify(NoticeLevel::Error, "Error submitting score");
            Vec::new()
        }
        Msg::LeaderboardRequested => vec![Effect::FetchLeaderboard],
        Msg::LeaderboardLoaded(entries) => {
            state.set_leaderboard(entries);
            Vec::new()
        }
        Msg::LeaderboardFailed { message } => {
            scout_warn!("Leaderboard fetch failed: {}", message);
            state.notify(NoticeLevel::Error, "Could not load the leaderboard");
            Vec::new()
        }
    };

    (state, effects)
}

fn submit_search(state: &mut AppState) -> Vec<Effect> {
    let query = match CompanyQuery::parse(state.search_input(), state.max_companies()) {
        Ok(query) => query,
        Err(err) => {
            state.notify(NoticeLevel::Error, err.to_string());
            return Vec::new();
        }
    };

    let mut effects = Vec::with_capacity(2);
    // Close-before-reopen: only one result channel may be open.
    if let Some(previous) = state.active_request() {
        effects.push(Effect::CloseSearch {
            request_id: previous,
            reason: CloseReason::Superseded,
        });
    }
    let request_id = state.begin_search(query.len());
    scout_info!("Search {} dispatched for {} companies", request_id, query.len());
    effects.push(Effect::StartSearch {
        request_id,
        companies: query.into_companies(),
    });
    effects
}

fn make_guess(state: &mut AppState, raw: &str) -> Vec<Effect> {
    if state.game().phase() != GamePhase::Playing {
        return vec![Effect::NewGameRequested];
    }
    let Some(value) = parse_guess(raw) else {
        state.notify(
            NoticeLevel::Error,
            "Please enter a valid number between 1 and 100",
        );
        return Vec::new();
    };
    if state.game_mut().guess(value) == GuessOutcome::Correct {
        state.notify(NoticeLevel::Success, "You won!");
    }
    Vec::new()
}

fn submit_score(state: &mut AppState, name: &str) -> Vec<Effect> {
    let name = name.trim();
    if name.is_empty() {
        state.notify(NoticeLevel::Error, "Please enter your name");
        return Vec::new();
    }
    if state.game().phase() != GamePhase::Won {
        state.notify(
            NoticeLevel::Error,
            "Finish a game before submitting a score",
        );
        return Vec::new();
    }
    if state.score_in_flight() {
        state.notify(NoticeLevel::Info, "Score submission already in progress");
        return Vec::new();
    }
    let score = state.game().attempts();
    state.begin_score_submission();
    vec![Effect::SubmitScore {
        name: name.to_string(),
        score,
    }]
}
