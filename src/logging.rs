use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Pick the tracing filter: `RUST_LOG` wins, then the configured level, then `info`
pub fn build_filter(env_value: Option<&str>, configured: &str) -> EnvFilter {
    if let Some(filter) = env_value.and_then(|v| v.parse::<EnvFilter>().ok()) {
        return filter;
    }
    match configured.parse::<EnvFilter>() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info"),
    }
}

/// Send tracing output to an append-only log file.
///
/// The terminal belongs to the UI, so nothing is written to stdout or stderr.
pub fn init(log_path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let env_value = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env_value.as_deref(), level);

    // A subscriber may already be installed (tests, repeated init); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(())
}
