use scout_core::{
    AppViewModel, CompanyRow, LeaderboardRowView, NoticeLevel, RequestId, SearchPhase, SearchView,
};

/// Turns successive view models into terminal output.
///
/// The terminal is append-only, so the renderer remembers what it already
/// printed and emits only the difference: new notices, newly appended
/// result rows, progress changes, and so on.
#[derive(Debug, Default)]
pub struct Renderer {
    last_notice_id: u64,
    request_id: Option<RequestId>,
    search_phase: SearchPhase,
    rows_shown: usize,
    progress_shown: Option<(usize, usize)>,
    error_shown: bool,
    game_message: Option<String>,
    leaderboard_revision: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_notice(view, &mut lines);
        self.render_search(&view.search, &mut lines);
        self.render_game(view, &mut lines);
        self.render_leaderboard(view, &mut lines);
        lines
    }

    fn render_notice(&mut self, view: &AppViewModel, lines: &mut Vec<String>) {
        let Some(notice) = &view.notice else {
            return;
        };
        if notice.id <= self.last_notice_id {
            return;
        }
        self.last_notice_id = notice.id;
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        lines.push(format!("> [{tag}] {}", notice.text));
    }

    fn render_search(&mut self, search: &SearchView, lines: &mut Vec<String>) {
        if search.request_id != self.request_id {
            self.request_id = search.request_id;
            self.search_phase = SearchPhase::Idle;
            self.rows_shown = 0;
            self.progress_shown = None;
            self.error_shown = false;
        }

        if search.phase == SearchPhase::Dispatching && self.search_phase == SearchPhase::Idle {
            lines.push(format!("Searching {} companies...", search.total));
        }

        if let Some(error) = &search.error {
            if !self.error_shown {
                self.error_shown = true;
                lines.push(format!("!! {error}"));
            }
        } else {
            for (index, row) in search.rows.iter().enumerate().skip(self.rows_shown) {
                lines.push(format_company_row(index + 1, row));
            }
            self.rows_shown = search.rows.len();

            let progress = (search.processed, search.total);
            if search.processed > 0 && self.progress_shown != Some(progress) {
                self.progress_shown = Some(progress);
                lines.push(format!(
                    "Processed {}/{} ({:.1}%)",
                    search.processed,
                    search.total,
                    search.percent()
                ));
            }
        }

        if search.phase == SearchPhase::Completed && self.search_phase != SearchPhase::Completed {
            lines.push("Search complete.".to_string());
        }
        self.search_phase = search.phase;
    }

    fn render_game(&mut self, view: &AppViewModel, lines: &mut Vec<String>) {
        if view.game.message == self.game_message {
            return;
        }
        self.game_message = view.game.message.clone();
        if let Some(message) = &view.game.message {
            lines.push(message.clone());
            if view.game.can_submit_score {
                lines.push("Submit your score with /score NAME".to_string());
            }
        }
    }

    fn render_leaderboard(&mut self, view: &AppViewModel, lines: &mut Vec<String>) {
        if view.leaderboard_revision == self.leaderboard_revision {
            return;
        }
        self.leaderboard_revision = view.leaderboard_revision;
        lines.extend(format_leaderboard(&view.leaderboard));
    }
}

pub fn format_company_row(position: usize, row: &CompanyRow) -> String {
    if let Some(error) = &row.error {
        return format!("{position:>3}. {} (Error: {error})", row.company_name);
    }
    let employees = row
        .employee_count
        .map(format_with_commas)
        .unwrap_or_else(|| "Not specified".to_string());
    let website = row.website.as_deref().unwrap_or("N/A");
    let mut line = format!(
        "{position:>3}. {} | employees: {employees} | {website}",
        row.company_name
    );
    if !row.sources.is_empty() {
        line.push_str(&format!(" | sources: {}", row.sources.join(", ")));
    }
    if !row.counts.is_empty() {
        let counts = row
            .counts
            .iter()
            .map(|(label, count)| format!("{label}: {}", format_with_commas(*count)))
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!(" [{counts}]"));
    }
    line
}

pub fn format_leaderboard(rows: &[LeaderboardRowView]) -> Vec<String> {
    let mut lines = vec!["Leaderboard".to_string()];
    if rows.is_empty() {
        lines.push("  (no scores yet)".to_string());
        return lines;
    }
    lines.push(format!("{:>4}  {:<20} {:>8}  {}", "#", "Name", "Attempts", "Date"));
    for row in rows {
        lines.push(format!(
            "{:>4}  {:<20} {:>8}  {}",
            row.rank,
            row.name,
            row.score,
            row.date.as_deref().unwrap_or("")
        ));
    }
    lines
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use scout_core::{update, AppState, Msg};

    use super::*;

    fn row(name: &str) -> CompanyRow {
        CompanyRow {
            company_name: name.to_string(),
            ..CompanyRow::default()
        }
    }

    fn search(state: AppState, input: &str) -> AppState {
        let (state, _) = update(state, Msg::SearchInputChanged(input.to_string()));
        update(state, Msg::SearchSubmitted).0
    }

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1000), "1,000");
        assert_eq!(format_with_commas(1234567), "1,234,567");
    }

    #[test]
    fn company_row_formats() {
        let full = CompanyRow {
            company_name: "Acme".to_string(),
            employee_count: Some(12000),
            website: Some("https://acme.example".to_string()),
            sources: vec!["LinkedIn".to_string(), "Company Website".to_string()],
            counts: vec![("LinkedIn".to_string(), 12000)],
            error: None,
        };
        assert_eq!(
            format_company_row(1, &full),
            "  1. Acme | employees: 12,000 | https://acme.example | sources: LinkedIn, Company Website [LinkedIn: 12,000]"
        );
        assert_eq!(
            format_company_row(2, &row("Beta")),
            "  2. Beta | employees: Not specified | N/A"
        );
        let failed = CompanyRow {
            error: Some("blocked".to_string()),
            ..row("Gamma")
        };
        assert_eq!(format_company_row(3, &failed), "  3. Gamma (Error: blocked)");
    }

    #[test]
    fn rows_are_printed_once_as_they_arrive() {
        let mut renderer = Renderer::new();
        let state = search(AppState::new(), "a\nb");
        let first = renderer.render(&state.view());
        assert!(first.contains(&"Searching 2 companies...".to_string()));

        let (state, _) = update(
            state,
            Msg::SearchRecord {
                request_id: 1,
                row: row("a"),
            },
        );
        let second = renderer.render(&state.view());
        assert_eq!(
            second,
            vec![
                "  1. a | employees: Not specified | N/A".to_string(),
                "Processed 1/2 (50.0%)".to_string(),
            ]
        );
        assert!(renderer.render(&state.view()).is_empty());

        let (state, _) = update(
            state,
            Msg::SearchRecord {
                request_id: 1,
                row: row("b"),
            },
        );
        let third = renderer.render(&state.view());
        assert_eq!(third.len(), 3);
        assert_eq!(third[2], "Search complete.");
    }

    #[test]
    fn error_block_is_printed_exactly_once() {
        let mut renderer = Renderer::new();
        let state = search(AppState::new(), "a\nb");
        renderer.render(&state.view());
        let (state, _) = update(
            state,
            Msg::SearchFailed {
                request_id: 1,
                message: "reset".to_string(),
            },
        );
        let lines = renderer.render(&state.view());
        let errors = lines.iter().filter(|line| line.starts_with("!! ")).count();
        assert_eq!(errors, 1);

        let (state, _) = update(
            state,
            Msg::SearchFailed {
                request_id: 1,
                message: "reset again".to_string(),
            },
        );
        assert!(renderer.render(&state.view()).is_empty());
    }

    #[test]
    fn new_search_starts_a_fresh_block() {
        let mut renderer = Renderer::new();
        let state = search(AppState::new(), "a");
        renderer.render(&state.view());
        let (state, _) = update(
            state,
            Msg::SearchRecord {
                request_id: 1,
                row: row("a"),
            },
        );
        renderer.render(&state.view());

        let state = search(state, "b");
        let lines = renderer.render(&state.view());
        assert_eq!(lines, vec!["Searching 1 companies...".to_string()]);
    }

    #[test]
    fn leaderboard_rows_match_server_length() {
        let rows: Vec<_> = (1..=3)
            .map(|rank| LeaderboardRowView {
                rank,
                name: format!("player{rank}"),
                score: rank as u32 * 2,
                date: None,
            })
            .collect();
        let lines = format_leaderboard(&rows);
        // Title and header, then one line per entry.
        assert_eq!(lines.len(), 2 + rows.len());
        assert!(lines[2].contains("player1"));
        assert_eq!(format_leaderboard(&[]), vec!["Leaderboard", "  (no scores yet)"]);
    }

    #[test]
    fn game_messages_and_notices_print_on_change() {
        let mut renderer = Renderer::new();
        let (state, _) = update(AppState::new(), Msg::NewGame { target: 42 });
        let lines = renderer.render(&state.view());
        assert!(lines[0].contains("New game started!"));

        let (state, _) = update(state, Msg::GuessSubmitted("42".to_string()));
        let lines = renderer.render(&state.view());
        assert!(lines.iter().any(|line| line.contains("[ok] You won!")));
        assert!(lines
            .iter()
            .any(|line| line.contains("found the number in 1 attempts")));
        assert!(lines.iter().any(|line| line.contains("/score NAME")));
    }

    #[test]
    fn every_leaderboard_load_is_printed() {
        let mut renderer = Renderer::new();
        let (state, _) = update(AppState::new(), Msg::LeaderboardLoaded(Vec::new()));
        assert_eq!(
            renderer.render(&state.view()),
            vec!["Leaderboard", "  (no scores yet)"]
        );
        assert!(renderer.render(&state.view()).is_empty());

        let (state, _) = update(state, Msg::LeaderboardLoaded(Vec::new()));
        assert_eq!(renderer.render(&state.view()).len(), 2);
    }
}
