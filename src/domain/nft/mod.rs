//! NFT operations: minting and resolution by mint address.

mod find_nft;
pub use find_nft::*;

mod create_nft;
pub use create_nft::*;
