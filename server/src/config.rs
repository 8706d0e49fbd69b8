//! Configuration management for the server.

use fieldcheck_engine::SessionConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory holding the persisted snapshot
    pub data_dir: PathBuf,
    /// Timing knobs handed to the session
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            sync_latency_ms: parse_or(&lookup, "FIELDCHECK_SYNC_LATENCY_MS", defaults.sync_latency_ms)?,
            auto_sync_delay_ms: parse_or(
                &lookup,
                "FIELDCHECK_AUTO_SYNC_DELAY_MS",
                defaults.auto_sync_delay_ms,
            )?,
            event_interval_ms: parse_or(
                &lookup,
                "FIELDCHECK_EVENT_INTERVAL_MS",
                defaults.event_interval_ms,
            )?,
            event_probability: parse_probability(&lookup, defaults.event_probability)?,
            cancel_sync_on_offline: parse_flag(
                &lookup,
                "FIELDCHECK_CANCEL_SYNC_ON_OFFLINE",
                defaults.cancel_sync_on_offline,
            )?,
            ..defaults
        };

        Ok(Self {
            host,
            port,
            data_dir,
            session,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

fn parse_probability(
    lookup: &impl Fn(&str) -> Option<String>,
    default: f64,
) -> Result<f64, ConfigError> {
    const NAME: &str = "FIELDCHECK_EVENT_PROBABILITY";
    let p: f64 = parse_or(lookup, NAME, default)?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(ConfigError::InvalidValue {
            name: NAME,
            value: p.to_string(),
        })
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(name) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}
