//! `CreateMasterEditionV3` instruction of the token metadata program.
use serde::{Deserialize, Serialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{InstructionDataError, InstructionDataReader, InstructionDataWriter};
use crate::{config::ProgramAddresses, constants::CREATE_MASTER_EDITION_V3_DISCRIMINATOR};

/// Accounts of `CreateMasterEditionV3`.
///
/// The program and sysvar fields fall back to the injected [`ProgramAddresses`] when
/// unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMasterEditionV3Accounts {
    pub edition: Pubkey,
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    pub metadata: Pubkey,
    pub token_program: Option<Pubkey>,
    pub system_program: Option<Pubkey>,
    pub rent: Option<Pubkey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMasterEditionV3Args {
    /// Maximum number of prints; `None` means unlimited.
    pub max_supply: Option<u64>,
}

impl CreateMasterEditionV3Args {
    pub fn data(&self) -> Vec<u8> {
        let mut writer = InstructionDataWriter::with_discriminator(CREATE_MASTER_EDITION_V3_DISCRIMINATOR);
        writer.write_optional_u64_fixed(self.max_supply);
        writer.into_bytes()
    }
}

/// Builds the instruction. Account order is positional and fixed by the program:
/// edition, mint, update authority, mint authority, payer, metadata, token program,
/// system program, rent sysvar.
pub fn create_master_edition_v3(
    accounts: &CreateMasterEditionV3Accounts,
    args: &CreateMasterEditionV3Args,
    programs: &ProgramAddresses,
) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(accounts.edition, false),
        AccountMeta::new(accounts.mint, false),
        AccountMeta::new_readonly(accounts.update_authority, true),
        AccountMeta::new_readonly(accounts.mint_authority, true),
        AccountMeta::new(accounts.payer, true),
        AccountMeta::new(accounts.metadata, false),
        AccountMeta::new_readonly(
            accounts.token_program.unwrap_or(programs.token_program),
            false,
        ),
        AccountMeta::new_readonly(
            accounts.system_program.unwrap_or(programs.system_program),
            false,
        ),
        AccountMeta::new_readonly(accounts.rent.unwrap_or(programs.rent_sysvar), false),
    ];

    Instruction {
        program_id: programs.token_metadata_program,
        accounts: account_metas,
        data: args.data(),
    }
}

/// Decodes a `CreateMasterEditionV3` payload. The value slot is ignored when the
/// presence byte is zero.
pub fn decode_create_master_edition_v3_data(
    data: &[u8],
) -> Result<CreateMasterEditionV3Args, InstructionDataError> {
    let mut reader = InstructionDataReader::new(data);
    reader.expect_discriminator(CREATE_MASTER_EDITION_V3_DISCRIMINATOR)?;
    let max_supply = reader.read_optional_u64_fixed()?;
    reader.finish()?;
    Ok(CreateMasterEditionV3Args { max_supply })
}
