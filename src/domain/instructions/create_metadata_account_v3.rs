//! `CreateMetadataAccountV3` instruction of the token metadata program.
//!
//! The payload is produced by the program's published client; this module maps
//! the crate's models into its types and retargets the result at the injected
//! program addresses.
use mpl_token_metadata::{
    instructions::{CreateMetadataAccountV3, CreateMetadataAccountV3InstructionArgs},
    types as mpl,
};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::{
    config::ProgramAddresses,
    models::{Collection, Creator, UseMethod, Uses},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMetadataAccountV3Accounts {
    pub metadata: Pubkey,
    pub mint: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    pub update_authority: Pubkey,
    pub update_authority_is_signer: bool,
}

/// Metadata recorded when the account is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFields {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
    pub is_mutable: bool,
}

impl MetadataFields {
    pub fn into_instruction_args(self) -> CreateMetadataAccountV3InstructionArgs {
        CreateMetadataAccountV3InstructionArgs {
            data: mpl::DataV2 {
                name: self.name,
                symbol: self.symbol,
                uri: self.uri,
                seller_fee_basis_points: self.seller_fee_basis_points,
                creators: self.creators.map(|creators| {
                    creators
                        .into_iter()
                        .map(|creator| mpl::Creator {
                            address: creator.address.to_bytes().into(),
                            verified: creator.verified,
                            share: creator.share,
                        })
                        .collect()
                }),
                collection: self.collection.map(|collection| mpl::Collection {
                    verified: collection.verified,
                    key: collection.key.to_bytes().into(),
                }),
                uses: self.uses.map(|uses| mpl::Uses {
                    use_method: match uses.use_method {
                        UseMethod::Burn => mpl::UseMethod::Burn,
                        UseMethod::Multiple => mpl::UseMethod::Multiple,
                        UseMethod::Single => mpl::UseMethod::Single,
                    },
                    remaining: uses.remaining,
                    total: uses.total,
                }),
            },
            is_mutable: self.is_mutable,
            collection_details: None,
        }
    }
}

/// Builds the instruction with the system program and rent sysvar taken from
/// `programs`.
pub fn create_metadata_account_v3(
    accounts: &CreateMetadataAccountV3Accounts,
    fields: MetadataFields,
    programs: &ProgramAddresses,
) -> Instruction {
    let instruction = CreateMetadataAccountV3 {
        metadata: accounts.metadata.to_bytes().into(),
        mint: accounts.mint.to_bytes().into(),
        mint_authority: accounts.mint_authority.to_bytes().into(),
        payer: accounts.payer.to_bytes().into(),
        update_authority: (
            accounts.update_authority.to_bytes().into(),
            accounts.update_authority_is_signer,
        ),
        system_program: programs.system_program.to_bytes().into(),
        rent: Some(programs.rent_sysvar.to_bytes().into()),
    }
    .instruction(fields.into_instruction_args());

    Instruction {
        program_id: programs.token_metadata_program,
        accounts: instruction
            .accounts
            .into_iter()
            .map(|meta| AccountMeta {
                pubkey: Pubkey::new_from_array(meta.pubkey.to_bytes()),
                is_signer: meta.is_signer,
                is_writable: meta.is_writable,
            })
            .collect(),
        data: instruction.data,
    }
}
