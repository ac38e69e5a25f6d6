//! Policy for the confirmation loop: how many polls, and how long to wait before each.

use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, time::Duration};

use super::{env_var_parsed, ConfigError};
use crate::constants::{
    get_default_confirmation_poll_delay, DEFAULT_CONFIRMATION_BACKOFF_FACTOR,
    DEFAULT_CONFIRMATION_MAX_ATTEMPTS, DEFAULT_CONFIRMATION_MAX_POLL_DELAY_MS,
};

/// How the wait before each status poll evolves across attempts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum PollBackoff {
    /// Same delay before every poll.
    Fixed,
    /// Delay multiplied by `factor` after every attempt, capped at `max_delay`.
    Exponential { factor: u32, max_delay: Duration },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationConfig {
    pub max_attempts: NonZeroU32,
    pub poll_delay: Duration,
    pub backoff: PollBackoff,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_attempts: NonZeroU32::new(DEFAULT_CONFIRMATION_MAX_ATTEMPTS)
                .unwrap_or(NonZeroU32::MIN),
            poll_delay: get_default_confirmation_poll_delay(),
            backoff: PollBackoff::Fixed,
        }
    }
}

impl ConfirmationConfig {
    /// Delay to wait before poll number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match &self.backoff {
            PollBackoff::Fixed => self.poll_delay,
            PollBackoff::Exponential { factor, max_delay } => {
                let exponent = attempt.saturating_sub(1);
                let multiplier = factor.saturating_pow(exponent);
                self.poll_delay
                    .checked_mul(multiplier)
                    .map_or(*max_delay, |delay| delay.min(*max_delay))
            }
        }
    }

    /// Reads `CONFIRMATION_MAX_ATTEMPTS`, `CONFIRMATION_POLL_DELAY_MS`,
    /// `CONFIRMATION_BACKOFF` and `CONFIRMATION_BACKOFF_MAX_DELAY_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_attempts = match env_var_parsed::<u32>("CONFIRMATION_MAX_ATTEMPTS")? {
            Some(value) => NonZeroU32::new(value).ok_or_else(|| ConfigError::InvalidValue {
                name: "CONFIRMATION_MAX_ATTEMPTS".to_string(),
                reason: "must be greater than zero".to_string(),
            })?,
            None => defaults.max_attempts,
        };

        let poll_delay = env_var_parsed::<u64>("CONFIRMATION_POLL_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_delay);

        let backoff = match env_var_parsed::<String>("CONFIRMATION_BACKOFF")?
            .as_deref()
            .map(str::to_lowercase)
            .as_deref()
        {
            None | Some("fixed") => PollBackoff::Fixed,
            Some("exponential") => PollBackoff::Exponential {
                factor: DEFAULT_CONFIRMATION_BACKOFF_FACTOR,
                max_delay: Duration::from_millis(
                    env_var_parsed::<u64>("CONFIRMATION_BACKOFF_MAX_DELAY_MS")?
                        .unwrap_or(DEFAULT_CONFIRMATION_MAX_POLL_DELAY_MS),
                ),
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "CONFIRMATION_BACKOFF".to_string(),
                    reason: format!("expected 'fixed' or 'exponential', got '{other}'"),
                })
            }
        };

        Ok(Self {
            max_attempts,
            poll_delay,
            backoff,
        })
    }
}
