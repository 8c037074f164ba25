use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Sends tracing output to the log file in the data directory; the terminal
/// belongs to the TUI.
pub fn init(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file())?;

    tracing_subscriber::registry()
        .with(EnvFilter::new(config.log_level.as_str().to_lowercase()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}
