//! Start-up configuration: optional RON file, then command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use scout_core::DEFAULT_MAX_COMPANIES;
use scout_engine::{ClientSettings, TransportKind};
use scout_logging::scout_info;
use serde::{Deserialize, Serialize};

use super::cli::Cli;

const DEFAULT_CONFIG_FILENAME: &str = "scout.ron";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FileConfig {
    pub base_url: Option<String>,
    pub transport: Option<TransportKind>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub stream_idle_timeout_ms: Option<u64>,
    /// 0 removes the limit.
    pub max_companies: Option<usize>,
    pub search_path: Option<String>,
    pub submit_score_path: Option<String>,
    pub leaderboard_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    pub client: ClientSettings,
    pub max_companies: Option<usize>,
}

/// Reads `explicit`, or `./scout.ron` when no path was given. Only an
/// explicitly named file has to exist.
pub(crate) fn load_file(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
    };
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };
    let config = ron::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    scout_info!("Loaded config from {:?}", path);
    Ok(config)
}

pub(crate) fn resolve(file: FileConfig, cli: &Cli) -> AppConfig {
    let mut client = ClientSettings::default();
    if let Some(base_url) = cli.base_url.clone().or(file.base_url) {
        client.base_url = base_url;
    }
    if let Some(transport) = cli.transport.or(file.transport) {
        client.transport = transport;
    }
    if let Some(ms) = file.connect_timeout_ms {
        client.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = file.request_timeout_ms {
        client.request_timeout = Duration::from_millis(ms);
    }
    client.stream_idle_timeout = file.stream_idle_timeout_ms.map(Duration::from_millis);
    if let Some(path) = file.search_path {
        client.search_path = path;
    }
    if let Some(path) = file.submit_score_path {
        client.submit_score_path = path;
    }
    if let Some(path) = file.leaderboard_path {
        client.leaderboard_path = path;
    }

    let max_companies = match cli.max_companies.or(file.max_companies) {
        Some(0) => None,
        Some(max) => Some(max),
        None => Some(DEFAULT_MAX_COMPANIES),
    };

    AppConfig {
        client,
        max_companies,
    }
}
