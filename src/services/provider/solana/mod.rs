//! Solana Provider Module
//!
//! This module provides an abstraction layer over the Solana RPC client,
//! offering the operations the minting pipeline needs: fetching the latest
//! blockhash, querying rent exemption, submitting serialized transactions,
//! reading signature statuses and fetching accounts.
//!
//! The provider uses the non-blocking `RpcClient` and classifies every client
//! failure into a [`SolanaProviderError`]. Calls failing with a transient error
//! are retried a bounded number of times before the error is surfaced, except the
//! signature status query: it is polled by the confirmation loop, which owns its
//! retry policy, so it is sent exactly once.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use std::{future::Future, num::NonZeroU32, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    config::RpcConfig,
    constants::DEFAULT_RPC_RETRY_DELAY_MS,
    domain::{retry, Operation, RetryDecision, RetryError},
    models::{ConfirmationStatus, SignatureStatus},
    utils::base64_encode,
};

/// Utility function to match error patterns by normalizing both strings.
/// Removes spaces and converts to lowercase for flexible matching.
fn matches_error_pattern(error_msg: &str, pattern: &str) -> bool {
    let normalized_msg = error_msg.to_lowercase().replace(' ', "");
    let normalized_pattern = pattern.to_lowercase().replace(' ', "");
    normalized_msg.contains(&normalized_pattern)
}

/// Errors that can occur when interacting with the Solana provider.
///
/// Use `is_transient()` to determine if an error should be retried.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SolanaProviderError {
    /// Network/IO error (transient - connection issues, timeouts)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// RPC protocol error (transient - node lag, sync pending)
    #[error("RPC error: {0}")]
    RpcError(String),

    /// HTTP request error with status code (transient/permanent based on status code)
    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },

    /// Invalid address format (permanent)
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Network configuration error (permanent)
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),

    /// Insufficient funds for transaction (permanent)
    #[error("Insufficient funds for transaction: {0}")]
    InsufficientFunds(String),

    /// Blockhash not found or expired (transient)
    #[error("Blockhash not found or expired: {0}")]
    BlockhashNotFound(String),

    /// Invalid transaction structure or execution (permanent)
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Transaction already processed (permanent - duplicate)
    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),
}

impl SolanaProviderError {
    /// Determines if this error is transient (can retry) or permanent (should fail).
    ///
    /// **Transient:** `NetworkError`, `RpcError`, `BlockhashNotFound`, and
    /// `RequestError` with a retriable status code (5xx except 501/505, 408, 425, 429).
    ///
    /// **Permanent:** everything else.
    pub fn is_transient(&self) -> bool {
        match self {
            SolanaProviderError::NetworkError(_) => true,
            SolanaProviderError::RpcError(_) => true,
            SolanaProviderError::BlockhashNotFound(_) => true,

            SolanaProviderError::RequestError { status_code, .. } => match *status_code {
                501 | 505 => false,
                500 | 502..=504 | 506..=599 => true,
                408 | 425 | 429 => true,
                _ => false,
            },

            SolanaProviderError::InsufficientFunds(_) => false,
            SolanaProviderError::InvalidTransaction(_) => false,
            SolanaProviderError::AlreadyProcessed(_) => false,
            SolanaProviderError::InvalidAddress(_) => false,
            SolanaProviderError::NetworkConfiguration(_) => false,
        }
    }

    /// Classifies a Solana RPC client error into the appropriate error variant.
    pub fn from_rpc_error(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) => SolanaProviderError::NetworkError(error.to_string()),

            ClientErrorKind::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status) => SolanaProviderError::RequestError {
                    error: error.to_string(),
                    status_code: status.as_u16(),
                },
                // No status code (connection refused, timeout)
                None => SolanaProviderError::NetworkError(error.to_string()),
            },

            ClientErrorKind::RpcError(rpc_err) => {
                let rpc_err_str = format!("{rpc_err}");
                Self::from_rpc_response_error(&rpc_err_str, &error)
            }

            ClientErrorKind::TransactionError(tx_error) => {
                Self::from_transaction_error(tx_error, &error)
            }

            ClientErrorKind::Custom(msg) => Self::from_rpc_response_error(msg, &error),

            _ => SolanaProviderError::RpcError(error.to_string()),
        }
    }

    /// Classifies RPC response errors using Solana JSON-RPC error codes, falling
    /// back to message matching for unknown codes.
    ///
    /// - Transient: `-32004`, `-32005`, `-32008`, `-32014`, `-32016`
    /// - Permanent: `-32002` (unless the simulation failed on a stale blockhash),
    ///   `-32003`, `-32007`, `-32009`, `-32010`, `-32013`, `-32015`, `-32602`
    fn from_rpc_response_error(rpc_err: &str, full_error: &ClientError) -> Self {
        let message = full_error.to_string();

        if rpc_err.contains("-32002") {
            if matches_error_pattern(rpc_err, "blockhash not found") {
                SolanaProviderError::BlockhashNotFound(message)
            } else if matches_error_pattern(rpc_err, "insufficient funds") {
                SolanaProviderError::InsufficientFunds(message)
            } else {
                SolanaProviderError::InvalidTransaction(message)
            }
        } else if rpc_err.contains("-32003")
            || rpc_err.contains("-32013")
            || rpc_err.contains("-32015")
            || rpc_err.contains("-32602")
        {
            SolanaProviderError::InvalidTransaction(message)
        } else if rpc_err.contains("-32004")
            || rpc_err.contains("-32005")
            || rpc_err.contains("-32014")
            || rpc_err.contains("-32016")
        {
            SolanaProviderError::RpcError(message)
        } else if rpc_err.contains("-32007") || rpc_err.contains("-32010") {
            SolanaProviderError::NetworkConfiguration(message)
        } else if rpc_err.contains("-32008") {
            SolanaProviderError::BlockhashNotFound(message)
        } else if rpc_err.contains("-32009") {
            SolanaProviderError::AlreadyProcessed(message)
        } else if matches_error_pattern(rpc_err, "insufficient funds") {
            SolanaProviderError::InsufficientFunds(message)
        } else if matches_error_pattern(rpc_err, "blockhash not found") {
            SolanaProviderError::BlockhashNotFound(message)
        } else if matches_error_pattern(rpc_err, "already processed") {
            SolanaProviderError::AlreadyProcessed(message)
        } else {
            SolanaProviderError::RpcError(message)
        }
    }

    fn from_transaction_error(
        tx_error: &solana_sdk::transaction::TransactionError,
        full_error: &ClientError,
    ) -> Self {
        use solana_sdk::transaction::TransactionError as TxErr;

        match tx_error {
            TxErr::InsufficientFundsForFee | TxErr::InsufficientFundsForRent { .. } => {
                SolanaProviderError::InsufficientFunds(full_error.to_string())
            }
            TxErr::BlockhashNotFound => {
                SolanaProviderError::BlockhashNotFound(full_error.to_string())
            }
            TxErr::AlreadyProcessed => {
                SolanaProviderError::AlreadyProcessed(full_error.to_string())
            }
            TxErr::SignatureFailure
            | TxErr::MissingSignatureForFee
            | TxErr::InvalidAccountForFee
            | TxErr::AccountNotFound
            | TxErr::InvalidAccountIndex
            | TxErr::ProgramAccountNotFound
            | TxErr::InstructionError(_, _) => {
                SolanaProviderError::InvalidTransaction(full_error.to_string())
            }
            TxErr::AccountInUse | TxErr::AccountLoadedTwice | TxErr::ClusterMaintenance => {
                SolanaProviderError::RpcError(full_error.to_string())
            }
            _ => SolanaProviderError::RpcError(full_error.to_string()),
        }
    }
}

/// A trait that abstracts the Solana RPC operations used by the pipeline.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SolanaProviderTrait: Send + Sync {
    /// Retrieves the latest blockhash.
    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError>;

    /// Retrieves the minimum balance required for rent exemption for the specified data size.
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_size: usize,
    ) -> Result<u64, SolanaProviderError>;

    /// Submits a bincode-serialized, fully signed transaction.
    async fn send_raw_transaction(
        &self,
        serialized_transaction: &[u8],
    ) -> Result<Signature, SolanaProviderError>;

    /// Returns the status of a signature, or `None` if the cluster does not know it yet.
    ///
    /// Sent once per call; errors are never retried here.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, SolanaProviderError>;

    /// Retrieves an account, or `None` if it does not exist.
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError>;
}

pub struct SolanaProvider {
    client: Arc<RpcClient>,
    url: String,
    commitment: CommitmentConfig,
    max_retries: u32,
}

impl std::fmt::Debug for SolanaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaProvider")
            .field("url", &self.url)
            .field("commitment", &self.commitment)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl SolanaProvider {
    pub fn new(config: &RpcConfig) -> Result<Self, SolanaProviderError> {
        config
            .validate()
            .map_err(|e| SolanaProviderError::NetworkConfiguration(e.to_string()))?;

        let commitment = CommitmentConfig::from(config.commitment);
        let client = RpcClient::new_with_timeout_and_commitment(
            config.url.clone(),
            Duration::from_secs(config.timeout_seconds),
            commitment,
        );

        Ok(Self {
            client: Arc::new(client),
            url: config.url.clone(),
            commitment,
            max_retries: config.max_retries,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs an RPC call exactly once.
    async fn single_rpc_call<T, Fut>(
        &self,
        operation_name: &'static str,
        request: Fut,
    ) -> Result<T, SolanaProviderError>
    where
        Fut: Future<Output = Result<T, ClientError>>,
    {
        debug!(operation = operation_name, "starting RPC operation");
        request.await.map_err(|e| {
            let error = SolanaProviderError::from_rpc_error(e);
            debug!(operation = operation_name, error = %error, "RPC operation failed");
            error
        })
    }

    /// Runs an RPC call, retrying transient failures up to `max_retries` times with a
    /// linearly growing delay.
    async fn retry_rpc_call<T, F, Fut>(
        &self,
        operation_name: &'static str,
        call: F,
    ) -> Result<T, SolanaProviderError>
    where
        T: Send + 'static,
        F: Fn(Arc<RpcClient>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let attempts = NonZeroU32::new(self.max_retries.saturating_add(1)).unwrap_or(NonZeroU32::MIN);
        let mut failed_attempts: u64 = 0;

        debug!(operation = operation_name, "starting RPC operation");

        retry(attempts, move || {
            let delay = Duration::from_millis(DEFAULT_RPC_RETRY_DELAY_MS * failed_attempts);
            failed_attempts += 1;
            let request = call(Arc::clone(&client));

            Operation::from_future(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                request.await.map_err(|e| {
                    let error = SolanaProviderError::from_rpc_error(e);
                    if error.is_transient() {
                        warn!(operation = operation_name, error = %error, "transient RPC error");
                        RetryDecision::Retry(error)
                    } else {
                        RetryDecision::DoNotRetry(error)
                    }
                })
            })
        })
        .map_error(RetryError::into_inner)
        .await
    }
}

fn confirmation_level(satisfies_finalized: bool, satisfies_confirmed: bool) -> ConfirmationStatus {
    if satisfies_finalized {
        ConfirmationStatus::Finalized
    } else if satisfies_confirmed {
        ConfirmationStatus::Confirmed
    } else {
        ConfirmationStatus::Processed
    }
}

#[async_trait]
impl SolanaProviderTrait for SolanaProvider {
    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError> {
        self.retry_rpc_call("get_latest_blockhash", |client| async move {
            client.get_latest_blockhash().await
        })
        .await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_size: usize,
    ) -> Result<u64, SolanaProviderError> {
        self.retry_rpc_call(
            "get_minimum_balance_for_rent_exemption",
            move |client| async move {
                client
                    .get_minimum_balance_for_rent_exemption(data_size)
                    .await
            },
        )
        .await
    }

    async fn send_raw_transaction(
        &self,
        serialized_transaction: &[u8],
    ) -> Result<Signature, SolanaProviderError> {
        let transaction: Transaction = bincode::deserialize(serialized_transaction).map_err(|e| {
            SolanaProviderError::InvalidTransaction(format!("Failed to decode transaction: {e}"))
        })?;
        trace!(
            transaction = %base64_encode(serialized_transaction),
            "submitting raw transaction"
        );

        self.retry_rpc_call("send_transaction", move |client| {
            let transaction = transaction.clone();
            async move { client.send_transaction(&transaction).await }
        })
        .await
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, SolanaProviderError> {
        let response = self
            .single_rpc_call(
                "get_signature_statuses",
                self.client.get_signature_statuses(&[*signature]),
            )
            .await?;

        Ok(response
            .value
            .into_iter()
            .next()
            .flatten()
            .map(|status| SignatureStatus {
                slot: status.slot,
                confirmation_status: Some(confirmation_level(
                    status.satisfies_commitment(CommitmentConfig::finalized()),
                    status.satisfies_commitment(CommitmentConfig::confirmed()),
                )),
                err: status.err.map(|e| e.to_string()),
            }))
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError> {
        let pubkey = *pubkey;
        let commitment = self.commitment;
        self.retry_rpc_call("get_account", move |client| async move {
            client
                .get_account_with_commitment(&pubkey, commitment)
                .await
                .map(|response| response.value)
        })
        .await
    }
}
