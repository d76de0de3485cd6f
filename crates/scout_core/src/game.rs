use std::cmp::Ordering;
use std::ops::RangeInclusive;

/// Valid guesses and targets.
pub const GUESS_RANGE: RangeInclusive<u32> = 1..=100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// No game has been started yet.
    #[default]
    Idle,
    Playing,
    /// Target found; attempts are frozen until the next game.
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Higher,
    Lower,
    Correct,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct GameSession {
    target: u32,
    attempts: u32,
    phase: GamePhase,
    message: Option<String>,
}

impl GameSession {
    pub(crate) fn start(target: u32) -> Self {
        Self {
            target,
            attempts: 0,
            phase: GamePhase::Playing,
            message: None,
        }
    }

    pub(crate) fn phase(&self) -> GamePhase {
        self.phase
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Records one guess. Only valid while `Playing`.
    pub(crate) fn guess(&mut self, value: u32) -> GuessOutcome {
        self.attempts += 1;
        let outcome = match value.cmp(&self.target) {
            Ordering::Less => GuessOutcome::Higher,
            Ordering::Greater => GuessOutcome::Lower,
            Ordering::Equal => GuessOutcome::Correct,
        };
        self.message = Some(match outcome {
            GuessOutcome::Higher => format!("Try higher! Attempts: {}", self.attempts),
            GuessOutcome::Lower => format!("Try lower! Attempts: {}", self.attempts),
            GuessOutcome::Correct => {
                self.phase = GamePhase::Won;
                format!(
                    "Congratulations! You found the number in {} attempts!",
                    self.attempts
                )
            }
        });
        outcome
    }
}

pub(crate) fn parse_guess(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| GUESS_RANGE.contains(value))
}
