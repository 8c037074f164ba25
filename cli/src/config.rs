//! Runtime configuration, read from the environment at startup. A `.env`
//! file in the working directory is honoured outside of tests.

use std::path::PathBuf;

use tracing::Level;

const DATA_DIR_VAR: &str = "WORKOUTLOG_DATA_DIR";
const LOG_LEVEL_VAR: &str = "WORKOUTLOG_LOG";
const DEFAULT_DIR_NAME: &str = ".workoutlog";
const LOG_FILE_NAME: &str = "workoutlog.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine home directory; set {0}")]
    NoHomeDir(&'static str),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup(DATA_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir(DATA_DIR_VAR))?
                .join(DEFAULT_DIR_NAME),
        };

        let log_level_str = lookup(LOG_LEVEL_VAR).unwrap_or_else(|| "info".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                LOG_LEVEL_VAR.to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            data_dir,
            log_level,
        })
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}
