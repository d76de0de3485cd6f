//! Line-oriented command parsing for the terminal front-end.

/// Line that ends a multi-line company list.
pub const LIST_TERMINATOR: &str = ".";

pub const HELP_TEXT: &str = "\
Commands:
  /search            enter company names, one per line; finish with a line containing only '.'
  /search NAME       search a single company
  /guess N  or  N    guess a number between 1 and 100
  /new               start a new game
  /score NAME        submit your winning score
  /leaderboard       show the leaderboard
  /help              show this help
  /quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Newline-delimited company list, exactly as typed.
    Search(String),
    Guess(String),
    NewGame,
    Score(String),
    Leaderboard,
    Help,
    Quit,
    Unknown(String),
}

/// Accumulates lines into commands. `/search` without arguments switches to
/// list mode until the terminator line.
#[derive(Debug, Default)]
pub struct InputReader {
    pending_list: Option<Vec<String>>,
}

impl InputReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a multi-line company list is being collected.
    pub fn collecting(&self) -> bool {
        self.pending_list.is_some()
    }

    pub fn push_line(&mut self, line: &str) -> Option<Command> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);

        if let Some(list) = self.pending_list.as_mut() {
            if line.trim() == LIST_TERMINATOR {
                let list = self.pending_list.take().unwrap_or_default();
                return Some(Command::Search(list.join("\n")));
            }
            list.push(line.to_string());
            return None;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if !trimmed.starts_with('/') {
            // Bare input is a guess; anything else still goes to the game so
            // the user sees its validation message.
            return Some(Command::Guess(trimmed.to_string()));
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };
        let command = match name.to_ascii_lowercase().as_str() {
            "/search" | "/s" if rest.is_empty() => {
                self.pending_list = Some(Vec::new());
                return None;
            }
            "/search" | "/s" => Command::Search(rest.to_string()),
            "/guess" | "/g" => Command::Guess(rest.to_string()),
            "/new" => Command::NewGame,
            "/score" => Command::Score(rest.to_string()),
            "/leaderboard" | "/lb" => Command::Leaderboard,
            "/help" | "/?" => Command::Help,
            "/quit" | "/exit" | "/q" => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        };
        Some(command)
    }

    /// Input ended. A half-typed list is dropped; returns true if there was one.
    pub fn finish(&mut self) -> bool {
        self.pending_list.take().is_some()
    }
}
