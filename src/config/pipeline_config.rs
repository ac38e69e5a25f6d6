use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfirmationConfig, ProgramAddresses, RpcConfig};

/// Complete configuration for one minting pipeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    pub rpc: RpcConfig,
    pub programs: ProgramAddresses,
    pub confirmation: ConfirmationConfig,
}

impl PipelineConfig {
    pub fn new(rpc: RpcConfig) -> Self {
        Self {
            rpc,
            programs: ProgramAddresses::default(),
            confirmation: ConfirmationConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            rpc: RpcConfig::from_env()?,
            programs: ProgramAddresses::from_env()?,
            confirmation: ConfirmationConfig::from_env()?,
        })
    }
}
