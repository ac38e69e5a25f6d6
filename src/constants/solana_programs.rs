//! Well-known Solana program and sysvar addresses.
//!
//! These are the mainnet defaults. Code that needs them takes a
//! [`crate::config::ProgramAddresses`] instead of reading the constants directly,
//! so alternate clusters can substitute their own deployments.

/// Metaplex Token Metadata program
pub const TOKEN_METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

/// SPL Token program
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// System program
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Rent sysvar
pub const RENT_SYSVAR_ID: &str = "SysvarRent111111111111111111111111111111111";

/// SPL Associated Token Account program
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Seed prefix shared by every Token Metadata PDA.
pub const METADATA_SEED_PREFIX: &[u8] = b"metadata";

/// Seed suffix of the master edition PDA.
pub const EDITION_SEED_SUFFIX: &[u8] = b"edition";

// Token Metadata instruction discriminators
pub const CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR: u8 = 33;
pub const CREATE_MASTER_EDITION_V3_DISCRIMINATOR: u8 = 17;

/// An NFT mint has no fractional units.
pub const NFT_MINT_DECIMALS: u8 = 0;

// Token Metadata field limits
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;
pub const MAX_CREATOR_LIMIT: usize = 5;
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;
