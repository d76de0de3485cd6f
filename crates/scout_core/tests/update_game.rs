use pretty_assertions::assert_eq;
use scout_core::{update, AppState, Effect, GamePhase, LeaderboardEntry, Msg, NoticeLevel};

fn init_logging() {
    scout_logging::initialize_for_tests();
}

fn new_game(target: u32) -> AppState {
    let (state, effects) = update(AppState::new(), Msg::NewGame { target });
    assert!(effects.is_empty());
    state
}

fn guess(state: AppState, raw: &str) -> (AppState, Vec<Effect>) {
    update(state, Msg::GuessSubmitted(raw.to_string()))
}

fn won_game(target: u32, misses: &[&str]) -> AppState {
    let mut state = new_game(target);
    for miss in misses {
        state = guess(state, miss).0;
    }
    guess(state, &target.to_string()).0
}

fn entry(name: &str, score: u32) -> LeaderboardEntry {
    LeaderboardEntry {
        name: name.to_string(),
        score,
        date: Some("2024-05-01".to_string()),
    }
}

#[test]
fn new_game_resets_session() {
    init_logging();
    let state = new_game(42);
    let view = state.view();

    assert_eq!(view.game.phase, GamePhase::Playing);
    assert_eq!(view.game.attempts, 0);
    assert_eq!(view.game.message, None);
    assert!(!view.game.can_submit_score);
    assert_eq!(view.notice.unwrap().text, "New game started!");
}

#[test]
fn guess_above_target_says_lower_then_win_freezes_attempts() {
    init_logging();
    let (state, effects) = guess(new_game(42), "50");
    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.game.message.as_deref().unwrap().contains("lower"));
    assert_eq!(view.game.attempts, 1);

    let (state, _) = guess(state, "10");
    assert!(state.view().game.message.unwrap().contains("higher"));

    let (state, effects) = guess(state, "42");
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.game.phase, GamePhase::Won);
    assert_eq!(view.game.attempts, 3);
    assert!(view.game.can_submit_score);
    assert_eq!(
        view.game.message.as_deref(),
        Some("Congratulations! You found the number in 3 attempts!")
    );
    assert_eq!(view.notice.unwrap().level, NoticeLevel::Success);

    // Another guess starts over instead of counting.
    let (state, effects) = guess(state, "7");
    assert_eq!(effects, vec![Effect::NewGameRequested]);
    assert_eq!(state.view().game.attempts, 3);
}

#[test]
fn invalid_guess_does_not_count() {
    init_logging();
    for raw in ["0", "101", "abc", ""] {
        let (state, effects) = guess(new_game(42), raw);
        assert!(effects.is_empty());
        let view = state.view();
        assert_eq!(view.game.attempts, 0, "input {raw:?} counted");
        let notice = view.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, "Please enter a valid number between 1 and 100");
    }
}

#[test]
fn guess_before_any_game_requests_one() {
    init_logging();
    let (_, effects) = guess(AppState::new(), "5");
    assert_eq!(effects, vec![Effect::NewGameRequested]);
}

#[test]
fn score_submission_requires_name_and_win() {
    init_logging();
    let (state, effects) = update(
        won_game(42, &[]),
        Msg::ScoreSubmitted {
            name: "   ".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().notice.unwrap().text, "Please enter your name");

    let (state, effects) = update(
        new_game(42),
        Msg::ScoreSubmitted {
            name: "Ada".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().notice.unwrap().text,
        "Finish a game before submitting a score"
    );
}

#[test]
fn accepted_score_refetches_leaderboard_and_starts_new_game() {
    init_logging();
    let state = won_game(42, &["10", "90"]);
    let (state, effects) = update(
        state,
        Msg::ScoreSubmitted {
            name: "  Ada ".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::SubmitScore {
            name: "Ada".to_string(),
            score: 3,
        }]
    );
    assert!(!state.view().game.can_submit_score);

    // Double submit while the first is in flight is refused.
    let (state, effects) = update(
        state,
        Msg::ScoreSubmitted {
            name: "Ada".to_string(),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::ScoreAccepted);
    assert_eq!(
        effects,
        vec![Effect::FetchLeaderboard, Effect::NewGameRequested]
    );
    assert_eq!(
        state.view().notice.unwrap().text,
        "Score submitted successfully!"
    );

    let server_rows = vec![entry("Ada", 3), entry("Bob", 5), entry("Cy", 9)];
    let (state, effects) = update(state, Msg::LeaderboardLoaded(server_rows.clone()));
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.leaderboard.len(), server_rows.len());
    let names: Vec<_> = view.leaderboard.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Bob", "Cy"]);
    let ranks: Vec<_> = view.leaderboard.iter().map(|row| row.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn score_reply_still_lands_after_new_game() {
    init_logging();
    let (state, _) = update(
        won_game(42, &[]),
        Msg::ScoreSubmitted {
            name: "Ada".to_string(),
        },
    );
    let (state, _) = update(state, Msg::NewGame { target: 7 });

    // The old game is gone; a reset must not double-submit either.
    let (state, effects) = guess(state, "7");
    assert!(effects.is_empty());
    assert!(!state.view().game.can_submit_score);

    let (state, effects) = update(state, Msg::ScoreAccepted);
    assert_eq!(effects, vec![Effect::FetchLeaderboard]);
    assert_eq!(
        state.view().notice.unwrap().text,
        "Score submitted successfully!"
    );
    assert!(state.view().game.can_submit_score);
}

#[test]
fn score_rejection_after_new_game_is_reported() {
    init_logging();
    let (state, _) = update(
        won_game(42, &[]),
        Msg::ScoreSubmitted {
            name: "Ada".to_string(),
        },
    );
    let (state, _) = update(state, Msg::NewGame { target: 7 });
    let (state, effects) = update(
        state,
        Msg::ScoreRejected {
            message: "timeout".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.game.phase, GamePhase::Playing);
    assert_eq!(view.notice.unwrap().text, "Error submitting score");
}

#[test]
fn rejected_score_keeps_win_for_retry() {
    init_logging();
    let state = won_game(42, &[]);
    let (state, _) = update(
        state,
        Msg::ScoreSubmitted {
            name: "Ada".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::ScoreRejected {
            message: "http status 500".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.game.phase, GamePhase::Won);
    assert!(view.game.can_submit_score);
    assert_eq!(view.notice.unwrap().text, "Error submitting score");
}

#[test]
fn leaderboard_failure_keeps_previous_rows() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::LeaderboardLoaded(vec![entry("Ada", 3)]),
    );
    let (state, effects) = update(
        state,
        Msg::LeaderboardFailed {
            message: "timeout".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.leaderboard.len(), 1);
    assert_eq!(view.notice.unwrap().level, NoticeLevel::Error);
}

#[test]
fn leaderboard_request_emits_fetch() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::LeaderboardRequested);
    assert_eq!(effects, vec![Effect::FetchLeaderboard]);
}
