//! Terminal front-end: wires stdin, the core state machine and the engine.
mod app;
pub mod cli;
mod config;
mod effects;
mod input;
mod logging;
mod ui;

pub use app::run_app;
