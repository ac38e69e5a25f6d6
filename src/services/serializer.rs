//! Compiles instructions into a signed, wire-ready legacy transaction.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use solana_sdk::{
    hash::Hash, instruction::Instruction, message::Message, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::{
    models::SignerError,
    services::{SigningIdentity, SolanaProviderError, SolanaProviderTrait},
};

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SerializeTransactionError {
    #[error("At least one signer is required to pay for the transaction")]
    NoSigners,

    #[error("Required signer {0} was not provided")]
    MissingSigner(String),

    #[error("Signer {0} is not required by any instruction")]
    UnexpectedSigner(String),

    #[error("Transaction is missing a signature for {0}")]
    MissingSignature(String),

    #[error("Failed to fetch blockhash: {0}")]
    Provider(#[from] SolanaProviderError),

    #[error("Signing failed: {0}")]
    Signer(#[from] SignerError),

    #[error("Failed to encode transaction: {0}")]
    Encoding(String),
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait TransactionSerializerTrait: Send + Sync {
    /// Builds a transaction from `instructions`, signs it with exactly `signers` and
    /// returns its bincode wire encoding.
    ///
    /// The first signer pays the fees. When `recent_blockhash` is `None` the latest
    /// blockhash is fetched from the cluster.
    async fn serialize_transaction(
        &self,
        instructions: &[Instruction],
        recent_blockhash: Option<Hash>,
        signers: &[Arc<dyn SigningIdentity>],
    ) -> Result<Vec<u8>, SerializeTransactionError>;
}

#[derive(Debug)]
pub struct SolanaTransactionSerializer<P: SolanaProviderTrait> {
    provider: Arc<P>,
}

impl<P: SolanaProviderTrait> SolanaTransactionSerializer<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

/// Checks that the declared signers are exactly the keys the message requires.
fn check_signers(required: &[Pubkey], provided: &[Pubkey]) -> Result<(), SerializeTransactionError> {
    if let Some(missing) = required.iter().find(|key| !provided.contains(key)) {
        return Err(SerializeTransactionError::MissingSigner(missing.to_string()));
    }
    if let Some(extra) = provided.iter().find(|key| !required.contains(key)) {
        return Err(SerializeTransactionError::UnexpectedSigner(
            extra.to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl<P: SolanaProviderTrait> TransactionSerializerTrait for SolanaTransactionSerializer<P> {
    async fn serialize_transaction(
        &self,
        instructions: &[Instruction],
        recent_blockhash: Option<Hash>,
        signers: &[Arc<dyn SigningIdentity>],
    ) -> Result<Vec<u8>, SerializeTransactionError> {
        let mut signer_keys = Vec::with_capacity(signers.len());
        for signer in signers {
            signer_keys.push(signer.pubkey().await?);
        }
        let payer = *signer_keys
            .first()
            .ok_or(SerializeTransactionError::NoSigners)?;

        let blockhash = match recent_blockhash {
            Some(blockhash) => blockhash,
            None => self.provider.get_latest_blockhash().await?,
        };

        let message = Message::new_with_blockhash(instructions, Some(&payer), &blockhash);
        let num_required = message.header.num_required_signatures as usize;
        check_signers(&message.account_keys[..num_required], &signer_keys)?;

        let mut transaction = Transaction::new_unsigned(message);
        for signer in signers {
            transaction = signer.sign_transaction(&transaction).await?;
        }

        if let Some(index) = transaction
            .signatures
            .iter()
            .position(|signature| *signature == Signature::default())
        {
            let key = transaction.message.account_keys[index];
            return Err(SerializeTransactionError::MissingSignature(key.to_string()));
        }

        debug!(
            payer = %payer,
            blockhash = %blockhash,
            instructions = instructions.len(),
            signers = signers.len(),
            "transaction serialized"
        );

        bincode::serialize(&transaction)
            .map_err(|e| SerializeTransactionError::Encoding(e.to_string()))
    }
}
