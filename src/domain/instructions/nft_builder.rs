//! Assembles the full instruction list that mints a one-token NFT and registers
//! its metadata and master edition.
use serde::Serialize;
use solana_sdk::{instruction::Instruction, program_pack::Pack, pubkey::Pubkey};
use solana_system_interface::instruction as system_instruction;
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::{
    create_master_edition_v3, create_metadata_account_v3, find_master_edition_address,
    find_metadata_address, CreateMasterEditionV3Accounts, CreateMasterEditionV3Args,
    CreateMetadataAccountV3Accounts, MetadataFields,
};
use crate::{
    config::ProgramAddresses,
    constants::NFT_MINT_DECIMALS,
    models::{CreateNftInput, Creator, MintAccount, NftInputError},
    services::{SolanaProviderError, SolanaProviderTrait},
};

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum BuildInstructionsError {
    #[error("Invalid NFT input: {0}")]
    InvalidInput(#[from] NftInputError),

    #[error("Failed to query cluster: {0}")]
    Provider(#[from] SolanaProviderError),

    #[error("Failed to build token instruction: {0}")]
    Token(String),

    #[error("Unsupported associated token program {0}")]
    UnsupportedAssociatedTokenProgram(String),
}

/// Accounts touched by a mint, derived from the mint address and the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NftAddresses {
    pub mint: Pubkey,
    pub token_account: Pubkey,
    pub metadata: Pubkey,
    pub master_edition: Pubkey,
}

impl NftAddresses {
    pub fn derive(mint: Pubkey, owner: Pubkey, programs: &ProgramAddresses) -> Self {
        let token_account =
            get_associated_token_address_with_program_id(&owner, &mint, &programs.token_program);
        let (metadata, _) = find_metadata_address(&programs.token_metadata_program, &mint);
        let (master_edition, _) =
            find_master_edition_address(&programs.token_metadata_program, &mint);
        Self {
            mint,
            token_account,
            metadata,
            master_edition,
        }
    }
}

/// Explicit creators, or the identity as the sole verified creator.
fn creators_or_identity(creators: &[Creator], identity: Pubkey) -> Vec<Creator> {
    if creators.is_empty() {
        vec![Creator {
            address: identity,
            verified: true,
            share: 100,
        }]
    } else {
        creators.to_vec()
    }
}

/// Produces the ordered instructions of a mint.
///
/// The identity pays for every account and holds the mint, freeze and update
/// authorities. With [`MintAccount::New`] the mint account is created and
/// initialized first; with [`MintAccount::Existing`] it must already be an
/// initialized, zero-decimal mint controlled by the identity.
#[derive(Debug)]
pub struct CreateNftInstructionBuilder<P: SolanaProviderTrait> {
    provider: Arc<P>,
    programs: ProgramAddresses,
}

impl<P: SolanaProviderTrait> CreateNftInstructionBuilder<P> {
    pub fn new(provider: Arc<P>, programs: ProgramAddresses) -> Self {
        Self { provider, programs }
    }

    pub fn programs(&self) -> &ProgramAddresses {
        &self.programs
    }

    fn metadata_fields(input: &CreateNftInput, identity: Pubkey) -> MetadataFields {
        MetadataFields {
            name: input.name.clone(),
            symbol: input.symbol.clone(),
            uri: input.uri.clone(),
            seller_fee_basis_points: input.seller_fee_basis_points,
            creators: Some(creators_or_identity(&input.creators, identity)),
            collection: input.collection.clone(),
            uses: input.uses.clone(),
            is_mutable: input.is_mutable,
        }
    }

    pub async fn build(
        &self,
        input: &CreateNftInput,
        identity: Pubkey,
    ) -> Result<Vec<Instruction>, BuildInstructionsError> {
        input.validate()?;

        let programs = &self.programs;
        if programs.associated_token_program != spl_associated_token_account::id() {
            return Err(BuildInstructionsError::UnsupportedAssociatedTokenProgram(
                programs.associated_token_program.to_string(),
            ));
        }

        let addresses = NftAddresses::derive(input.mint.pubkey(), identity, programs);
        let mint = addresses.mint;
        let mut instructions = Vec::with_capacity(6);

        if let MintAccount::New(_) = input.mint {
            let space = spl_token::state::Mint::LEN;
            let lamports = self
                .provider
                .get_minimum_balance_for_rent_exemption(space)
                .await?;

            let mut create_account = system_instruction::create_account(
                &identity,
                &mint,
                lamports,
                space as u64,
                &programs.token_program,
            );
            create_account.program_id = programs.system_program;
            instructions.push(create_account);

            instructions.push(
                spl_token::instruction::initialize_mint2(
                    &programs.token_program,
                    &mint,
                    &identity,
                    Some(&identity),
                    NFT_MINT_DECIMALS,
                )
                .map_err(|e| BuildInstructionsError::Token(e.to_string()))?,
            );
        }

        instructions.push(create_associated_token_account_idempotent(
            &identity,
            &identity,
            &mint,
            &programs.token_program,
        ));

        instructions.push(
            spl_token::instruction::mint_to(
                &programs.token_program,
                &mint,
                &addresses.token_account,
                &identity,
                &[],
                1,
            )
            .map_err(|e| BuildInstructionsError::Token(e.to_string()))?,
        );

        instructions.push(create_metadata_account_v3(
            &CreateMetadataAccountV3Accounts {
                metadata: addresses.metadata,
                mint,
                mint_authority: identity,
                payer: identity,
                update_authority: identity,
                update_authority_is_signer: true,
            },
            Self::metadata_fields(input, identity),
            programs,
        ));

        instructions.push(create_master_edition_v3(
            &CreateMasterEditionV3Accounts {
                edition: addresses.master_edition,
                mint,
                update_authority: identity,
                mint_authority: identity,
                payer: identity,
                metadata: addresses.metadata,
                token_program: None,
                system_program: None,
                rent: None,
            },
            &CreateMasterEditionV3Args {
                max_supply: input.max_supply,
            },
            programs,
        ));

        debug!(
            mint = %mint,
            metadata = %addresses.metadata,
            master_edition = %addresses.master_edition,
            instructions = instructions.len(),
            "nft instructions built"
        );

        Ok(instructions)
    }
}
