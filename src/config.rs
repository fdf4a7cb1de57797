use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LottoError, Result};

pub const DEFAULT_DB_PATH: &str = "data/lottery.db";
pub const DEFAULT_SOURCE_URL: &str = "https://lotto.api.rayriffy.com";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: PathBuf,
    pub source_url: String,
    pub collect_interval: Option<Duration>,
    pub busy_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: PathBuf::from(DEFAULT_DB_PATH),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            collect_interval: None,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

pub fn load() -> Result<Config> {
    from_lookup(|key| env::var(key).ok())
}

/// Builds a config from any key lookup, so tests need not touch the process environment.
pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let database_url = lookup("LOTTERY_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or(defaults.database_url);

    let source_url = lookup("LOTTERY_SOURCE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or(defaults.source_url);

    let collect_interval = match lookup("LOTTERY_COLLECT_INTERVAL_SECS") {
        Some(raw) => Some(Duration::from_secs(parse_u64("LOTTERY_COLLECT_INTERVAL_SECS", &raw)?)),
        None => None,
    };

    let busy_timeout = match lookup("LOTTERY_BUSY_TIMEOUT_MS") {
        Some(raw) => Duration::from_millis(parse_u64("LOTTERY_BUSY_TIMEOUT_MS", &raw)?),
        None => defaults.busy_timeout,
    };

    Ok(Config {
        database_url,
        source_url,
        collect_interval,
        busy_timeout,
    })
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|e| LottoError::Config {
        key,
        message: format!("{:?} is not a non-negative integer ({})", raw, e),
    })
}
