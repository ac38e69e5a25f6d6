//! NFT value objects: the input describing a mint and the resolved on-chain record.

use serde::{Deserialize, Serialize};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use thiserror::Error;

use crate::constants::{
    MAX_CREATOR_LIMIT, MAX_NAME_LENGTH, MAX_SELLER_FEE_BASIS_POINTS, MAX_SYMBOL_LENGTH,
    MAX_URI_LENGTH,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    /// Percentage of royalties, all creators must add up to 100.
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub verified: bool,
    pub key: Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

/// Mint account backing the NFT.
#[derive(Debug)]
pub enum MintAccount {
    /// A fresh keypair; the mint is created and initialized in the same transaction
    /// and the keypair co-signs it.
    New(Keypair),
    /// An already initialized mint whose mint authority is the signing identity.
    Existing(Pubkey),
}

impl MintAccount {
    pub fn pubkey(&self) -> Pubkey {
        match self {
            MintAccount::New(keypair) => keypair.pubkey(),
            MintAccount::Existing(pubkey) => *pubkey,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum NftInputError {
    #[error("Name is too long: {0} bytes")]
    NameTooLong(usize),
    #[error("Symbol is too long: {0} bytes")]
    SymbolTooLong(usize),
    #[error("URI is too long: {0} bytes")]
    UriTooLong(usize),
    #[error("Seller fee basis points out of range: {0}")]
    InvalidSellerFee(u16),
    #[error("Too many creators: {0}")]
    TooManyCreators(usize),
    #[error("Creator shares must add up to 100, got {0}")]
    InvalidCreatorShares(u32),
}

/// Everything needed to mint one NFT.
#[derive(Debug)]
pub struct CreateNftInput {
    pub mint: MintAccount,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Vec<Creator>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
    pub is_mutable: bool,
    /// `None` for an unlimited number of prints, `Some(0)` for a one-of-one.
    pub max_supply: Option<u64>,
}

impl CreateNftInput {
    /// A one-of-one, mutable NFT with a freshly generated mint and no royalties.
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            mint: MintAccount::New(Keypair::new()),
            name: name.into(),
            symbol: String::new(),
            uri: uri.into(),
            seller_fee_basis_points: 0,
            creators: Vec::new(),
            collection: None,
            uses: None,
            is_mutable: true,
            max_supply: Some(0),
        }
    }

    pub fn validate(&self) -> Result<(), NftInputError> {
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(NftInputError::NameTooLong(self.name.len()));
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(NftInputError::SymbolTooLong(self.symbol.len()));
        }
        if self.uri.len() > MAX_URI_LENGTH {
            return Err(NftInputError::UriTooLong(self.uri.len()));
        }
        if self.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
            return Err(NftInputError::InvalidSellerFee(
                self.seller_fee_basis_points,
            ));
        }
        if self.creators.len() > MAX_CREATOR_LIMIT {
            return Err(NftInputError::TooManyCreators(self.creators.len()));
        }
        if !self.creators.is_empty() {
            let total: u32 = self.creators.iter().map(|c| u32::from(c.share)).sum();
            if total != 100 {
                return Err(NftInputError::InvalidCreatorShares(total));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterEditionInfo {
    pub address: Pubkey,
    pub supply: u64,
    pub max_supply: Option<u64>,
}

/// An NFT as read back from its on-chain metadata and master edition accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub mint: Pubkey,
    pub metadata_address: Pubkey,
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Vec<Creator>,
    pub is_mutable: bool,
    pub primary_sale_happened: bool,
    pub master_edition: Option<MasterEditionInfo>,
}
