//! # Services Module
//!
//! External collaborators of the minting pipeline: the Solana RPC provider, the
//! signing services and the transaction serializer.

mod provider;
pub use provider::*;

mod signer;
pub use signer::*;

mod serializer;
pub use serializer::*;
