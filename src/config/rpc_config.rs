//! Configuration for the RPC endpoint.
//!
//! The URL, request timeout, commitment level and transient-error retry budget used
//! by the Solana provider.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use std::env;
use strum::EnumString;

use super::{env_var_parsed, ConfigError};
use crate::constants::{DEFAULT_RPC_MAX_RETRIES, DEFAULT_RPC_TIMEOUT_SECONDS};

/// Commitment level requested from the RPC node for reads and preflight.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RpcCommitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl From<RpcCommitment> for CommitmentConfig {
    fn from(commitment: RpcCommitment) -> Self {
        match commitment {
            RpcCommitment::Processed => CommitmentConfig::processed(),
            RpcCommitment::Confirmed => CommitmentConfig::confirmed(),
            RpcCommitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

/// Configuration for an RPC endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RpcConfig {
    /// The RPC endpoint URL.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Commitment level used for reads and preflight checks.
    pub commitment: RpcCommitment,
    /// Extra attempts for an RPC call failing with a transient error.
    pub max_retries: u32,
}

impl RpcConfig {
    /// Creates a new RPC configuration with the given URL and default timeout and commitment.
    pub fn new(url: String) -> Self {
        Self {
            url,
            timeout_seconds: DEFAULT_RPC_TIMEOUT_SECONDS,
            commitment: RpcCommitment::default(),
            max_retries: DEFAULT_RPC_MAX_RETRIES,
        }
    }

    /// Reads `SOLANA_RPC_URL` (required), `SOLANA_RPC_TIMEOUT_SECONDS`, `SOLANA_COMMITMENT`
    /// and `SOLANA_RPC_MAX_RETRIES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("SOLANA_RPC_URL")
            .map_err(|_| ConfigError::MissingVar("SOLANA_RPC_URL".to_string()))?;
        let config = Self {
            url,
            timeout_seconds: env_var_parsed("SOLANA_RPC_TIMEOUT_SECONDS")?
                .unwrap_or(DEFAULT_RPC_TIMEOUT_SECONDS),
            commitment: env_var_parsed("SOLANA_COMMITMENT")?.unwrap_or_default(),
            max_retries: env_var_parsed("SOLANA_RPC_MAX_RETRIES")?
                .unwrap_or(DEFAULT_RPC_MAX_RETRIES),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.url).map_err(|e| ConfigError::InvalidValue {
            name: "url".to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "url".to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "timeout_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
