//! Signing services.
//!
//! Key custody and "who signs and submits" are two separate seams:
//!
//! ```text
//! SigningIdentity (sign one / sign many / send)
//!   └── IdentityDriver<S, P>
//!         ├── S: SolanaSignTrait (key custody, e.g. LocalSigner)
//!         └── P: SolanaProviderTrait (network relay)
//! ```
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};

use crate::models::SignerError;

mod local_signer;
pub use local_signer::*;

mod identity;
pub use identity::*;

#[async_trait]
#[cfg_attr(test, automock)]
/// Trait defining Solana-specific signing operations
///
/// Implementations hold or reach the private key; nothing above this seam knows how
/// the key is stored.
pub trait SolanaSignTrait: Sync + Send {
    /// Returns the public key of the signer
    async fn pubkey(&self) -> Result<Pubkey, SignerError>;

    /// Signs a message using the Solana signing scheme
    ///
    /// # Arguments
    ///
    /// * `message` - The message bytes to sign
    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

/// Signs a Solana SDK transaction by finding the signer's position and adding the signature
///
/// This helper function:
/// 1. Retrieves the signer's public key
/// 2. Finds its position in the transaction's account_keys
/// 3. Validates it's marked as a required signer
/// 4. Signs the transaction message
/// 5. Inserts the signature at the correct position
///
/// The transaction is taken by value, so a failure leaves the caller's copy untouched.
pub async fn sign_sdk_transaction<T: SolanaSignTrait + ?Sized>(
    signer: &T,
    mut transaction: Transaction,
) -> Result<(Transaction, Signature), SignerError> {
    let signer_pubkey = signer.pubkey().await?;

    let signer_index = transaction
        .message
        .account_keys
        .iter()
        .position(|key| *key == signer_pubkey)
        .ok_or_else(|| {
            SignerError::SigningError(
                "Signer public key not found in transaction signers".to_string(),
            )
        })?;

    let num_required = transaction.message.header.num_required_signatures as usize;
    if signer_index >= num_required {
        return Err(SignerError::SigningError(format!(
            "Signer is not marked as a required signer in the transaction (position {signer_index} >= {num_required})"
        )));
    }

    let signature = signer.sign(&transaction.message_data()).await?;

    // Keep existing signatures, never shrink
    transaction
        .signatures
        .resize(num_required, Signature::default());
    transaction.signatures[signer_index] = signature;

    Ok((transaction, signature))
}
