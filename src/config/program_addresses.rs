//! Addresses of the on-chain programs and sysvars the minting flow talks to.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use super::{env_var_parsed, ConfigError};
use crate::constants::{
    ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};

/// Program and sysvar addresses injected into instruction builders.
///
/// `Default` yields the mainnet deployments. Override individual entries to target
/// a cluster or local validator with its own deployments.
///
/// `token_program` and `associated_token_program` must stay at the SPL
/// deployments: the SPL instruction builders reject any other token program, and
/// associated token addresses are derived against the canonical program. Minting
/// with other values fails while building instructions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgramAddresses {
    pub token_metadata_program: Pubkey,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
    pub rent_sysvar: Pubkey,
    pub associated_token_program: Pubkey,
}

fn well_known(address: &str) -> Pubkey {
    // The constants are valid base58; an unparsable one degrades to the default key.
    Pubkey::from_str(address).unwrap_or_default()
}

impl Default for ProgramAddresses {
    fn default() -> Self {
        Self {
            token_metadata_program: well_known(TOKEN_METADATA_PROGRAM_ID),
            token_program: well_known(TOKEN_PROGRAM_ID),
            system_program: well_known(SYSTEM_PROGRAM_ID),
            rent_sysvar: well_known(RENT_SYSVAR_ID),
            associated_token_program: well_known(ASSOCIATED_TOKEN_PROGRAM_ID),
        }
    }
}

impl ProgramAddresses {
    /// Starts from the defaults and applies any `*_PROGRAM_ID` / `RENT_SYSVAR_ID` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            token_metadata_program: env_var_parsed("TOKEN_METADATA_PROGRAM_ID")?
                .unwrap_or(defaults.token_metadata_program),
            token_program: env_var_parsed("TOKEN_PROGRAM_ID")?.unwrap_or(defaults.token_program),
            system_program: env_var_parsed("SYSTEM_PROGRAM_ID")?
                .unwrap_or(defaults.system_program),
            rent_sysvar: env_var_parsed("RENT_SYSVAR_ID")?.unwrap_or(defaults.rent_sysvar),
            associated_token_program: env_var_parsed("ASSOCIATED_TOKEN_PROGRAM_ID")?
                .unwrap_or(defaults.associated_token_program),
        })
    }
}
