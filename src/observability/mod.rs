use crate::config::ObservabilityConfig;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Parse a configured level name ("info", "DEBUG", ...).
pub fn parse_level(level: &str) -> Result<Level> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| anyhow::anyhow!("Unknown log level '{level}'"))
}

/// Open `path` for appending, creating it and its parent directory.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Install the global fmt subscriber. Logs go to stderr unless a log file
/// is configured.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let level = parse_level(&config.level)?;
    let builder = FmtSubscriber::builder().with_max_level(level);

    match &config.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            let subscriber = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Setting default subscriber failed")?;
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Setting default subscriber failed")?;
        }
    }
    Ok(())
}
