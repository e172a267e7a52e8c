//! Process configuration.
//!
//! Secrets and endpoints come from the environment (a `.env` file is
//! honored); operational knobs come from CLI flags. Missing required
//! configuration fails fast at startup, before the poll loop begins.

use dealwatch_alerts::TierEndpoints;
use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Pricing API credential.
    pub api_key: String,
    /// One webhook endpoint per discount tier.
    pub endpoints: TierEndpoints,
    /// Seconds between poll cycles.
    pub poll_interval_secs: u64,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

impl AppConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required("DEALWATCH_API_KEY")?;
        let endpoints = TierEndpoints {
            tier90: required("DEALWATCH_WEBHOOK_TIER90")?,
            tier80: required("DEALWATCH_WEBHOOK_TIER80")?,
            tier70: required("DEALWATCH_WEBHOOK_TIER70")?,
            tier20: required("DEALWATCH_WEBHOOK_TIER20")?,
        };

        let poll_interval_secs = match std::env::var("DEALWATCH_POLL_INTERVAL_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: "DEALWATCH_POLL_INTERVAL_SECS",
                value: raw,
            })?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        Ok(Self {
            api_key,
            endpoints,
            poll_interval_secs,
        })
    }
}
