use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use rand::Rng;
use scout_core::{update, AppState, Msg, GUESS_RANGE};
use scout_engine::EngineHandle;
use scout_logging::{scout_info, scout_warn};

use super::cli::Cli;
use super::config;
use super::effects::EffectRunner;
use super::input::{Command, InputReader, HELP_TEXT};
use super::logging;
use super::ui::render::Renderer;

/// Everything the control loop reacts to.
pub(crate) enum Inbound {
    Msg(Msg),
    Command(Command),
    /// A leaderboard or score request got its reply.
    RequestDone,
    /// Stdin reached end of file.
    InputClosed,
}

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(cli.log);

    let file = config::load_file(cli.config.as_deref())?;
    let config = config::resolve(file, &cli);
    scout_info!(
        "Starting scout client base_url={} transport={} max_companies={:?}",
        config.client.base_url,
        config.client.transport,
        config.max_companies
    );

    let engine = EngineHandle::new(config.client.clone()).context("starting engine")?;
    let (inbound_tx, inbound_rx) = mpsc::channel::<Inbound>();
    let runner = EffectRunner::new(engine, inbound_tx.clone());
    spawn_stdin_reader(inbound_tx.clone());

    let stdout = io::stdout();
    let mut controller = Controller {
        state: AppState::new().with_max_companies(config.max_companies),
        runner,
        renderer: Renderer::new(),
        out: stdout.lock(),
    };

    controller.print(&["Scout: company search and guessing game.", HELP_TEXT])?;
    controller.dispatch(Msg::NewGame {
        target: random_target(),
    })?;
    controller.dispatch(Msg::LeaderboardRequested)?;

    // After end of input, keep running until outstanding work has settled.
    let mut input_closed = false;
    while let Ok(inbound) = inbound_rx.recv() {
        match inbound {
            Inbound::Msg(msg) => controller.dispatch(msg)?,
            Inbound::RequestDone => controller.runner.request_done(),
            Inbound::InputClosed => {
                scout_info!("Input closed; waiting for outstanding requests");
                input_closed = true;
            }
            Inbound::Command(Command::Quit) => break,
            Inbound::Command(Command::Help) => controller.print(&[HELP_TEXT])?,
            Inbound::Command(Command::Unknown(text)) => {
                let hint = format!("Unknown command '{text}'. Type /help.");
                controller.print(&[hint.as_str()])?;
            }
            Inbound::Command(command) => {
                for msg in command_messages(command) {
                    controller.dispatch(msg)?;
                }
            }
        }
        if input_closed && controller.is_idle() {
            break;
        }
    }

    scout_info!("Scout client exiting");
    Ok(())
}

struct Controller<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    out: W,
}

impl<W: Write> Controller<W> {
    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;
        self.runner.enqueue(effects);

        if was_dirty {
            let lines = self.renderer.render(&view);
            for line in &lines {
                writeln!(self.out, "{line}")?;
            }
            self.out.flush()?;
        }
        Ok(())
    }

    /// No search is open and no request awaits a reply.
    fn is_idle(&self) -> bool {
        !self.state.is_searching() && !self.runner.has_pending_requests()
    }

    fn print(&mut self, lines: &[&str]) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

fn command_messages(command: Command) -> Vec<Msg> {
    match command {
        Command::Search(text) => vec![Msg::SearchInputChanged(text), Msg::SearchSubmitted],
        Command::Guess(text) => vec![Msg::GuessSubmitted(text)],
        Command::NewGame => vec![Msg::NewGame {
            target: random_target(),
        }],
        Command::Score(name) => vec![Msg::ScoreSubmitted { name }],
        Command::Leaderboard => vec![Msg::LeaderboardRequested],
        Command::Help | Command::Quit | Command::Unknown(_) => Vec::new(),
    }
}

fn random_target() -> u32 {
    rand::thread_rng().gen_range(GUESS_RANGE)
}

fn spawn_stdin_reader(inbound: mpsc::Sender<Inbound>) {
    thread::spawn(move || {
        let mut reader = InputReader::new();
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    scout_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            if let Some(command) = reader.push_line(&line) {
                if inbound.send(Inbound::Command(command)).is_err() {
                    return;
                }
            }
        }
        if reader.finish() {
            scout_warn!("Input ended inside a company list; list dropped");
        }
        let _ = inbound.send(Inbound::InputClosed);
    });
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use scout_engine::ClientSettings;

    use super::*;

    fn controller() -> Controller<Vec<u8>> {
        let engine = EngineHandle::new(ClientSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ClientSettings::default()
        })
        .unwrap();
        let (tx, _rx) = mpsc::channel();
        Controller {
            state: AppState::new(),
            runner: EffectRunner::new(engine, tx),
            renderer: Renderer::new(),
            out: Vec::new(),
        }
    }

    #[test]
    fn open_search_keeps_the_loop_busy() {
        let mut controller = controller();
        assert!(controller.is_idle());

        for msg in command_messages(Command::Search("Acme".to_string())) {
            controller.dispatch(msg).unwrap();
        }
        assert!(!controller.is_idle());

        controller
            .dispatch(Msg::SearchFailed {
                request_id: 1,
                message: "network error".to_string(),
            })
            .unwrap();
        assert!(controller.is_idle());
        let output = String::from_utf8(controller.out.clone()).unwrap();
        assert!(output.contains("Searching 1 companies..."));
        assert!(output.contains("!! An error occurred while searching."));
    }

    #[test]
    fn pending_leaderboard_keeps_the_loop_busy() {
        let mut controller = controller();
        controller.dispatch(Msg::LeaderboardRequested).unwrap();
        assert!(!controller.is_idle());

        controller.runner.request_done();
        assert!(controller.is_idle());
    }

    #[test]
    fn search_command_sets_input_then_submits() {
        assert_eq!(
            command_messages(Command::Search("Acme\nBeta".to_string())),
            vec![
                Msg::SearchInputChanged("Acme\nBeta".to_string()),
                Msg::SearchSubmitted,
            ]
        );
    }

    #[test]
    fn new_game_target_is_in_range() {
        for _ in 0..100 {
            match command_messages(Command::NewGame).as_slice() {
                [Msg::NewGame { target }] => assert!(GUESS_RANGE.contains(target)),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn local_commands_produce_no_messages() {
        assert!(command_messages(Command::Help).is_empty());
        assert!(command_messages(Command::Quit).is_empty());
    }
}
