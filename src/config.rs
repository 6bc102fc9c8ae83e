//! Runtime configuration
//!
//! Everything comes from environment variables:
//!
//! | Variable | Default |
//! |---|---|
//! | `FITPLAN_DATABASE_PATH` | `<project>/data/fitplan.db` |
//! | `FITPLAN_RATE_LIMIT_MAX` | `120` (`off` disables limiting) |
//! | `FITPLAN_RATE_LIMIT_WINDOW_SECS` | `60` |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::rate_limit::{FixedWindowStore, NoopStore, RateLimitStore};

pub const ENV_DATABASE_PATH: &str = "FITPLAN_DATABASE_PATH";
pub const ENV_RATE_LIMIT_MAX: &str = "FITPLAN_RATE_LIMIT_MAX";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "FITPLAN_RATE_LIMIT_WINDOW_SECS";

const DEFAULT_RATE_LIMIT_MAX: u32 = 120;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Rate limit settings; `None` max means limiting is off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: Option<u32>,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: Some(DEFAULT_RATE_LIMIT_MAX),
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    /// Build the store the service will consult
    pub fn build_store(&self) -> Arc<dyn RateLimitStore> {
        match self.max_requests {
            Some(max) => Arc::new(FixedWindowStore::new(max, self.window)),
            None => Arc::new(NoopStore),
        }
    }

    /// e.g. "120 requests per 60s per tool", or "off"
    pub fn describe(&self) -> String {
        match self.max_requests {
            Some(max) => format!("{} requests per {}s per tool", max, self.window.as_secs()),
            None => "off".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(ENV_DATABASE_PATH)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let max_requests = match lookup(ENV_RATE_LIMIT_MAX) {
            None => Some(DEFAULT_RATE_LIMIT_MAX),
            Some(raw) if raw.trim().eq_ignore_ascii_case("off") => None,
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_RATE_LIMIT_MAX,
                value: raw.clone(),
            })?),
        };

        let window_secs = match lookup(ENV_RATE_LIMIT_WINDOW_SECS) {
            None => DEFAULT_RATE_LIMIT_WINDOW_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_RATE_LIMIT_WINDOW_SECS,
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            database_path,
            rate_limit: RateLimitConfig {
                max_requests,
                window: Duration::from_secs(window_secs),
            },
        })
    }
}

/// `<project root>/data/fitplan.db`, where the project root is found by
/// walking up out of `target/{debug,release}` from the running executable
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|target| target.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("fitplan.db");
    path
}
