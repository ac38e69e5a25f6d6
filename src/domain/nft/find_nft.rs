//! Resolves an NFT from the accounts the token metadata program keeps for its mint.
use mpl_token_metadata::{
    accounts::{MasterEdition, Metadata},
    types::Key,
};
use solana_sdk::{account::Account, pubkey::Pubkey};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    config::ProgramAddresses,
    domain::{
        instructions::{find_master_edition_address, find_metadata_address},
        Operation,
    },
    models::{Creator, MasterEditionInfo, Nft, PipelineError},
    services::SolanaProviderTrait,
};

/// Metadata strings are stored zero-padded to their maximum length.
fn trim_padding(value: &str) -> String {
    value.trim_end_matches('\0').to_string()
}

fn to_sdk_pubkey(bytes: [u8; 32]) -> Pubkey {
    Pubkey::new_from_array(bytes)
}

fn check_owner(account: &Account, address: &Pubkey, owner: &Pubkey) -> Result<(), PipelineError> {
    if account.owner != *owner {
        return Err(PipelineError::FindNft(format!(
            "Account {address} is owned by {} instead of the token metadata program",
            account.owner
        )));
    }
    Ok(())
}

/// Decodes a metadata account into an [`Nft`] without its master edition.
pub fn decode_metadata_account(
    metadata_address: Pubkey,
    data: &[u8],
) -> Result<Nft, PipelineError> {
    let metadata = Metadata::from_bytes(data).map_err(|e| {
        PipelineError::FindNft(format!("Invalid metadata account {metadata_address}: {e}"))
    })?;
    if metadata.key != Key::MetadataV1 {
        return Err(PipelineError::FindNft(format!(
            "Account {metadata_address} is not a metadata account"
        )));
    }

    Ok(Nft {
        mint: to_sdk_pubkey(metadata.mint.to_bytes()),
        metadata_address,
        update_authority: to_sdk_pubkey(metadata.update_authority.to_bytes()),
        name: trim_padding(&metadata.name),
        symbol: trim_padding(&metadata.symbol),
        uri: trim_padding(&metadata.uri),
        seller_fee_basis_points: metadata.seller_fee_basis_points,
        creators: metadata
            .creators
            .unwrap_or_default()
            .into_iter()
            .map(|creator| Creator {
                address: to_sdk_pubkey(creator.address.to_bytes()),
                verified: creator.verified,
                share: creator.share,
            })
            .collect(),
        is_mutable: metadata.is_mutable,
        primary_sale_happened: metadata.primary_sale_happened,
        master_edition: None,
    })
}

pub fn decode_master_edition_account(
    address: Pubkey,
    data: &[u8],
) -> Result<MasterEditionInfo, PipelineError> {
    let edition = MasterEdition::from_bytes(data).map_err(|e| {
        PipelineError::FindNft(format!("Invalid master edition account {address}: {e}"))
    })?;
    if !matches!(edition.key, Key::MasterEditionV2 | Key::MasterEditionV1) {
        return Err(PipelineError::FindNft(format!(
            "Account {address} is not a master edition account"
        )));
    }

    Ok(MasterEditionInfo {
        address,
        supply: edition.supply,
        max_supply: edition.max_supply,
    })
}

/// Re-reads an NFT from its canonical metadata and master edition addresses.
#[derive(Debug)]
pub struct FindNftByMintOperationHandler<P: SolanaProviderTrait> {
    provider: Arc<P>,
    programs: ProgramAddresses,
}

impl<P: SolanaProviderTrait + 'static> FindNftByMintOperationHandler<P> {
    pub fn new(provider: Arc<P>, programs: ProgramAddresses) -> Self {
        Self { provider, programs }
    }

    /// The metadata account must exist; the master edition is optional.
    pub fn handle(&self, mint: Pubkey) -> Operation<Nft, PipelineError> {
        let provider = Arc::clone(&self.provider);
        let program = self.programs.token_metadata_program;

        Operation::from_future(async move {
            let (metadata_address, _) = find_metadata_address(&program, &mint);
            let (edition_address, _) = find_master_edition_address(&program, &mint);
            debug!(mint = %mint, metadata = %metadata_address, "resolving nft");

            let metadata_account = provider
                .get_account(&metadata_address)
                .await
                .map_err(|e| PipelineError::FindNft(e.to_string()))?
                .ok_or_else(|| {
                    PipelineError::FindNft(format!(
                        "Metadata account {metadata_address} not found for mint {mint}"
                    ))
                })?;
            check_owner(&metadata_account, &metadata_address, &program)?;
            let mut nft = decode_metadata_account(metadata_address, &metadata_account.data)?;

            let edition_account = provider
                .get_account(&edition_address)
                .await
                .map_err(|e| PipelineError::FindNft(e.to_string()))?;
            if let Some(account) = edition_account {
                check_owner(&account, &edition_address, &program)?;
                nft.master_edition = Some(decode_master_edition_account(
                    edition_address,
                    &account.data,
                )?);
            }

            info!(
                mint = %mint,
                name = %nft.name,
                has_master_edition = nft.master_edition.is_some(),
                "nft resolved"
            );
            Ok(nft)
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_accounts::*;
    use super::*;
    use crate::services::{MockSolanaProviderTrait, SolanaProviderError};

    #[tokio::test]
    async fn test_resolves_metadata_and_master_edition() {
        let programs = ProgramAddresses::default();
        let program = programs.token_metadata_program;
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let (metadata_address, _) = find_metadata_address(&program, &mint);
        let (edition_address, _) = find_master_edition_address(&program, &mint);
        let creators = vec![Creator {
            address: authority,
            verified: true,
            share: 100,
        }];

        let metadata = metadata_account(program, mint, authority, "Ticket #1", &creators);
        let edition = master_edition_account(program, 0, Some(0));
        let mut provider = MockSolanaProviderTrait::new();
        provider.expect_get_account().returning(move |address| {
            let account = if *address == metadata_address {
                Some(metadata.clone())
            } else if *address == edition_address {
                Some(edition.clone())
            } else {
                None
            };
            Box::pin(async move { Ok(account) })
        });

        let handler = FindNftByMintOperationHandler::new(Arc::new(provider), programs);
        let nft = handler.handle(mint).await.unwrap();

        assert_eq!(nft.mint, mint);
        assert_eq!(nft.metadata_address, metadata_address);
        assert_eq!(nft.update_authority, authority);
        assert_eq!(nft.name, "Ticket #1");
        assert_eq!(nft.symbol, "TKT");
        assert_eq!(nft.uri, "https://example.com/nft.json");
        assert_eq!(nft.seller_fee_basis_points, 250);
        assert_eq!(nft.creators, creators);
        assert!(nft.is_mutable);
        assert_eq!(
            nft.master_edition,
            Some(MasterEditionInfo {
                address: edition_address,
                supply: 0,
                max_supply: Some(0),
            })
        );
    }

    #[tokio::test]
    async fn test_master_edition_is_optional() {
        let programs = ProgramAddresses::default();
        let program = programs.token_metadata_program;
        let mint = Pubkey::new_unique();
        let (metadata_address, _) = find_metadata_address(&program, &mint);
        let metadata = metadata_account(program, mint, Pubkey::new_unique(), "Print", &[]);

        let mut provider = MockSolanaProviderTrait::new();
        provider.expect_get_account().returning(move |address| {
            let account = (*address == metadata_address).then(|| metadata.clone());
            Box::pin(async move { Ok(account) })
        });

        let handler = FindNftByMintOperationHandler::new(Arc::new(provider), programs);
        let nft = handler.handle(mint).await.unwrap();

        assert!(nft.master_edition.is_none());
        assert!(nft.creators.is_empty());
    }

    #[tokio::test]
    async fn test_missing_metadata_fails() {
        let mut provider = MockSolanaProviderTrait::new();
        provider
            .expect_get_account()
            .times(1)
            .returning(|_| Box::pin(async { Ok(None) }));

        let handler =
            FindNftByMintOperationHandler::new(Arc::new(provider), ProgramAddresses::default());
        let result = handler.handle(Pubkey::new_unique()).await;

        assert!(matches!(result, Err(PipelineError::FindNft(msg)) if msg.contains("not found")));
    }

    #[tokio::test]
    async fn test_foreign_owner_is_rejected() {
        let mint = Pubkey::new_unique();
        let impostor = metadata_account(Pubkey::new_unique(), mint, Pubkey::new_unique(), "Fake", &[]);
        let mut provider = MockSolanaProviderTrait::new();
        provider
            .expect_get_account()
            .returning(move |_| {
                let account = impostor.clone();
                Box::pin(async move { Ok(Some(account)) })
            });

        let handler =
            FindNftByMintOperationHandler::new(Arc::new(provider), ProgramAddresses::default());
        let result = handler.handle(mint).await;

        assert!(matches!(result, Err(PipelineError::FindNft(_))));
    }

    #[tokio::test]
    async fn test_provider_error_is_tagged() {
        let mut provider = MockSolanaProviderTrait::new();
        provider.expect_get_account().returning(|_| {
            Box::pin(async { Err(SolanaProviderError::NetworkError("reset".to_string())) })
        });

        let handler =
            FindNftByMintOperationHandler::new(Arc::new(provider), ProgramAddresses::default());
        let result = handler.handle(Pubkey::new_unique()).await;

        assert!(matches!(result, Err(PipelineError::FindNft(msg)) if msg.contains("reset")));
    }

    #[test]
    fn test_garbage_metadata_is_rejected() {
        let result = decode_metadata_account(Pubkey::new_unique(), &[4, 1, 2]);
        assert!(matches!(result, Err(PipelineError::FindNft(_))));
    }

    #[test]
    fn test_wrong_account_kind_is_rejected() {
        let account = master_edition_account(Pubkey::new_unique(), 1, None);
        let result = decode_metadata_account(Pubkey::new_unique(), &account.data);
        assert!(matches!(result, Err(PipelineError::FindNft(_))));
    }
}
