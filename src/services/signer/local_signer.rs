//! # Local Signer
//!
//! Signs with an in-memory ed25519 keypair. Keys can be loaded from raw bytes, a
//! base58-encoded secret key, or a `solana-keygen` JSON keypair file.
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::{fs, path::Path};

use super::SolanaSignTrait;
use crate::models::SignerError;

pub struct LocalSigner {
    keypair: Keypair,
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish()
    }
}

impl LocalSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Builds a signer from the 64-byte secret key + public key layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let keypair = Keypair::try_from(bytes)
            .map_err(|e| SignerError::KeyError(format!("Invalid keypair bytes: {e}")))?;
        Ok(Self::new(keypair))
    }

    /// Builds a signer from a base58 string, as exported by most wallets.
    pub fn from_base58(encoded: &str) -> Result<Self, SignerError> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| SignerError::KeyError(format!("Invalid base58 keypair: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Reads a JSON array of 64 bytes, the format written by `solana-keygen`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            SignerError::KeyError(format!("Failed to read keypair file {}: {e}", path.display()))
        })?;
        let bytes: Vec<u8> = serde_json::from_str(&contents).map_err(|e| {
            SignerError::KeyError(format!("Invalid keypair file {}: {e}", path.display()))
        })?;
        Self::from_bytes(&bytes)
    }
}

#[async_trait]
impl SolanaSignTrait for LocalSigner {
    async fn pubkey(&self) -> Result<Pubkey, SignerError> {
        Ok(self.keypair.pubkey())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        self.keypair
            .try_sign_message(message)
            .map_err(|e| SignerError::SigningError(e.to_string()))
    }
}
