//! File logging. The terminal belongs to the UI, so log lines go to
//! `bucketview.log` next to the config file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LoggingConfig, config_dir};
use crate::errors::{AppError, AppResult};

pub fn log_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("bucketview.log"))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Returns the log path, or `None` when logging is off.
pub fn init_logging(config: &LoggingConfig) -> AppResult<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }
    let path = log_file().ok_or_else(|| AppError::Config("no config directory".to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_logging_installs_nothing() {
        let config = LoggingConfig { enabled: false, level: "debug".to_string() };
        assert!(init_logging(&config).unwrap().is_none());
    }
}
