//! Signing identities: who signs transactions and who relays them to the cluster.
use async_trait::async_trait;
use futures::future::join_all;
#[cfg(test)]
use mockall::automock;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{sign_sdk_transaction, SolanaSignTrait};
use crate::{models::SignerError, services::SolanaProviderTrait};

/// Capability to sign and submit transactions, independent of key custody.
///
/// Implementations hold no per-call mutable state, so one identity can serve many
/// concurrent pipelines.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SigningIdentity: Send + Sync {
    async fn pubkey(&self) -> Result<Pubkey, SignerError>;

    /// Adds this identity's signature to a copy of `transaction`.
    ///
    /// The caller's transaction is never modified.
    async fn sign_transaction(&self, transaction: &Transaction)
        -> Result<Transaction, SignerError>;

    /// Signs every transaction independently.
    ///
    /// The result has one slot per input, in input order; a slot is `None` when that
    /// transaction failed to sign. Callers must filter empty slots themselves.
    async fn sign_all_transactions(&self, transactions: &[Transaction])
        -> Vec<Option<Transaction>>;

    /// Submits a serialized, fully signed transaction and returns its signature.
    async fn send_transaction(&self, serialized_transaction: &[u8])
        -> Result<Signature, SignerError>;
}

/// Signing identity pairing a key-custody signer with the provider used for relaying.
#[derive(Debug)]
pub struct IdentityDriver<S, P>
where
    S: SolanaSignTrait,
    P: SolanaProviderTrait,
{
    signer: S,
    provider: Arc<P>,
}

impl<S, P> IdentityDriver<S, P>
where
    S: SolanaSignTrait,
    P: SolanaProviderTrait,
{
    pub fn new(signer: S, provider: Arc<P>) -> Self {
        Self { signer, provider }
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }
}

#[async_trait]
impl<S, P> SigningIdentity for IdentityDriver<S, P>
where
    S: SolanaSignTrait,
    P: SolanaProviderTrait,
{
    async fn pubkey(&self) -> Result<Pubkey, SignerError> {
        self.signer.pubkey().await
    }

    async fn sign_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Transaction, SignerError> {
        let (signed, signature) = sign_sdk_transaction(&self.signer, transaction.clone()).await?;
        debug!(signature = %signature, "transaction signed");
        Ok(signed)
    }

    async fn sign_all_transactions(
        &self,
        transactions: &[Transaction],
    ) -> Vec<Option<Transaction>> {
        let results = join_all(transactions.iter().map(|tx| self.sign_transaction(tx))).await;

        results
            .into_iter()
            .enumerate()
            .map(|(index, result)| match result {
                Ok(signed) => Some(signed),
                Err(e) => {
                    warn!(index, error = %e, "failed to sign transaction in batch");
                    None
                }
            })
            .collect()
    }

    async fn send_transaction(
        &self,
        serialized_transaction: &[u8],
    ) -> Result<Signature, SignerError> {
        let signature = self
            .provider
            .send_raw_transaction(serialized_transaction)
            .await
            .map_err(|e| SignerError::SendTransactionError(e.to_string()))?;
        debug!(signature = %signature, "transaction submitted");
        Ok(signature)
    }
}
