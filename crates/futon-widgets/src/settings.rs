//! Retry tunables, read once at startup.
//!
//! Sources, lowest precedence first: built-in defaults, an optional settings
//! file (format taken from its extension), then `FUTON_*` environment
//! variables (`FUTON_MAX_RETRIES`, `FUTON_RELOAD_RANGE`, `FUTON_WAIT_DELAY_MS`).

use std::num::NonZeroU32;
use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigurationError;
use crate::policy::RetryPolicy;
use crate::waiting::{FixedDelayWaiter, TokioWaiter};

pub const MAX_RETRIES_KEY: &str = "max.retries";
pub const RELOAD_RANGE_KEY: &str = "reload.range";
pub const WAIT_DELAY_KEY: &str = "wait.delay.ms";
pub const ENV_PREFIX: &str = "FUTON";

const DEFAULT_MAX_RETRIES: i64 = 100;
const DEFAULT_RELOAD_RANGE: i64 = 10;
const DEFAULT_WAIT_DELAY_MS: i64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub policy: RetryPolicy,
    pub wait_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            wait_delay_ms: DEFAULT_WAIT_DELAY_MS as u64,
        }
    }
}

impl Settings {
    /// Load settings. A `path` that is given must exist and parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = Config::builder()
            .set_default(MAX_RETRIES_KEY, DEFAULT_MAX_RETRIES)?
            .set_default(RELOAD_RANGE_KEY, DEFAULT_RELOAD_RANGE)?
            .set_default(WAIT_DELAY_KEY, DEFAULT_WAIT_DELAY_MS)?;

        if let Some(path) = path {
            debug!(path = %path.display(), "reading settings file");
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        let settings = Self::from_config(&config)?;
        info!(
            max_retries = settings.policy.max_retries.get(),
            reload_range = settings.policy.reload_every.get(),
            wait_delay_ms = settings.wait_delay_ms,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Extract and validate the tunables from an already built source.
    pub fn from_config(config: &Config) -> Result<Self, ConfigurationError> {
        let max_retries = positive_count(config, MAX_RETRIES_KEY)?;
        let reload_every = positive_count(config, RELOAD_RANGE_KEY)?;
        let wait_delay_ms = read_int(config, WAIT_DELAY_KEY)?;
        let wait_delay_ms = u64::try_from(wait_delay_ms).map_err(|_| ConfigurationError::Invalid {
            key: WAIT_DELAY_KEY.into(),
            reason: "must not be negative".into(),
        })?;

        Ok(Self {
            policy: RetryPolicy::new(max_retries, reload_every),
            wait_delay_ms,
        })
    }

    pub fn waiter(&self) -> FixedDelayWaiter {
        FixedDelayWaiter::from_millis(self.wait_delay_ms)
    }

    pub fn async_waiter(&self) -> TokioWaiter {
        TokioWaiter::from_millis(self.wait_delay_ms)
    }
}

fn read_int(config: &Config, key: &str) -> Result<i64, ConfigurationError> {
    config.get_int(key).map_err(|err| ConfigurationError::Invalid {
        key: key.into(),
        reason: err.to_string(),
    })
}

fn positive_count(config: &Config, key: &str) -> Result<NonZeroU32, ConfigurationError> {
    let raw = read_int(config, key)?;
    u32::try_from(raw)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| ConfigurationError::Invalid {
            key: key.into(),
            reason: format!("expected a positive integer, got {raw}"),
        })
}
