//! Configuration for the minting pipeline.
//!
//! Everything is read from environment variables (callers typically load a `.env`
//! file with `dotenvy` first). Each section also has plain constructors and
//! `Default` implementations so tests and embedders can skip the environment.

use std::{env, str::FromStr};
use thiserror::Error;

mod rpc_config;
pub use rpc_config::*;

mod program_addresses;
pub use program_addresses::*;

mod confirmation_config;
pub use confirmation_config::*;

mod pipeline_config;
pub use pipeline_config::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Reads and parses an optional environment variable.
///
/// Returns `Ok(None)` when the variable is unset or empty.
pub(crate) fn env_var_parsed<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}
