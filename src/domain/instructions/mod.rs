//! Typed builders for the instructions an NFT mint submits.
//!
//! Byte layouts and account orders are fixed by the on-chain programs; every
//! builder takes the program addresses from [`crate::config::ProgramAddresses`].

mod data;
pub use data::*;

mod pda;
pub use pda::*;

mod create_metadata_account_v3;
pub use create_metadata_account_v3::*;

mod create_master_edition_v3;
pub use create_master_edition_v3::*;

mod nft_builder;
pub use nft_builder::*;
