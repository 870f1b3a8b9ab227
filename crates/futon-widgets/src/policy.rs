use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::errors::ConfigurationError;

const DEFAULT_MAX_RETRIES: NonZeroU32 = match NonZeroU32::new(100) {
    Some(v) => v,
    None => unreachable!(),
};
const DEFAULT_RELOAD_EVERY: NonZeroU32 = match NonZeroU32::new(10) {
    Some(v) => v,
    None => unreachable!(),
};

/// Bounds of a synchronization loop. Both fields are strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts before the engine reports `ElementNotFound`.
    pub max_retries: NonZeroU32,
    /// Failed attempts between two container reloads.
    pub reload_every: NonZeroU32,
}

impl RetryPolicy {
    pub fn new(max_retries: NonZeroU32, reload_every: NonZeroU32) -> Self {
        Self {
            max_retries,
            reload_every,
        }
    }

    /// Build a policy from raw counts, rejecting zero.
    pub fn try_from_counts(max_retries: u32, reload_every: u32) -> Result<Self, ConfigurationError> {
        let max_retries = NonZeroU32::new(max_retries).ok_or_else(|| ConfigurationError::Invalid {
            key: "max_retries".into(),
            reason: "must be greater than zero".into(),
        })?;
        let reload_every =
            NonZeroU32::new(reload_every).ok_or_else(|| ConfigurationError::Invalid {
                key: "reload_every".into(),
                reason: "must be greater than zero".into(),
            })?;
        Ok(Self::new(max_retries, reload_every))
    }

    /// Whether the container is due for a reload after `failures` failed attempts.
    pub fn reload_due(&self, failures: u32) -> bool {
        failures > 0 && failures % self.reload_every.get() == 0
    }

    /// Whether `failures` failed attempts use up the whole budget.
    pub fn exhausted(&self, failures: u32) -> bool {
        failures >= self.max_retries.get()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            reload_every: DEFAULT_RELOAD_EVERY,
        }
    }
}
