use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Diagnostic output for the headless tools.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

/// The terminal UI owns stdout, so its tracing output goes to a file.
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("race_standings=debug,info"))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
