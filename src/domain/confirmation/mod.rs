//! Polls a submitted transaction until the cluster reports it finalized.
//!
//! ```text
//! Submitted -> Polling { attempt } -> Finalized
//!                                  -> Exhausted   (still pending after the last attempt)
//!                                  -> Failed      (RPC error or on-chain execution error)
//! ```
//!
//! Each attempt waits before querying so the transaction can propagate. A status
//! that is absent or below `finalized` is retried; anything else ends the loop.
use solana_sdk::signature::Signature;
use std::sync::Arc;
use strum::Display;
use tracing::{debug, info, warn};

use crate::{
    config::ConfirmationConfig,
    domain::{retry, Operation, RetryDecision},
    models::{PipelineError, SignatureStatus},
    services::SolanaProviderTrait,
};

/// Where a confirmation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConfirmationState {
    Submitted,
    #[strum(to_string = "polling (attempt {attempt})")]
    Polling { attempt: u32 },
    Finalized,
    Exhausted,
    Failed,
}

/// Classifies one poll result.
pub fn evaluate_status(
    status: Option<SignatureStatus>,
) -> Result<SignatureStatus, RetryDecision<PipelineError>> {
    match status {
        Some(SignatureStatus {
            err: Some(reason), ..
        }) => Err(RetryDecision::DoNotRetry(PipelineError::ConfirmTransaction(
            format!("Transaction failed on chain: {reason}"),
        ))),
        Some(status) if status.is_finalized() => Ok(status),
        _ => Err(RetryDecision::Retry(PipelineError::MissingSignatureStatus)),
    }
}

#[derive(Debug)]
pub struct TransactionConfirmer<P: SolanaProviderTrait> {
    provider: Arc<P>,
    config: ConfirmationConfig,
}

impl<P: SolanaProviderTrait> TransactionConfirmer<P> {
    pub fn new(provider: Arc<P>, config: ConfirmationConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ConfirmationConfig {
        &self.config
    }
}

impl<P: SolanaProviderTrait + 'static> TransactionConfirmer<P> {
    /// Resolves to the finalized status of `signature`.
    ///
    /// Fails with [`PipelineError::RetryAttemptsExhausted`] when the transaction is
    /// still pending after the last attempt, and with
    /// [`PipelineError::ConfirmTransaction`] as soon as the status query errors.
    pub fn confirm(&self, signature: Signature) -> Operation<SignatureStatus, PipelineError> {
        let provider = Arc::clone(&self.provider);
        let config = self.config.clone();
        let max_attempts = config.max_attempts;

        debug!(signature = %signature, state = %ConfirmationState::Submitted, "confirming transaction");

        let mut attempt = 0u32;
        retry(max_attempts, move || {
            attempt += 1;
            let attempt = attempt;
            let provider = Arc::clone(&provider);
            let delay = config.delay_for_attempt(attempt);

            Operation::from_future(async move {
                tokio::time::sleep(delay).await;
                debug!(
                    signature = %signature,
                    state = %ConfirmationState::Polling { attempt },
                    "polling signature status"
                );

                let status = provider
                    .get_signature_status(&signature)
                    .await
                    .map_err(|e| {
                        RetryDecision::DoNotRetry(PipelineError::ConfirmTransaction(e.to_string()))
                    })?;

                evaluate_status(status).inspect_err(|decision| {
                    if decision.is_retryable() {
                        warn!(signature = %signature, attempt, "transaction not finalized yet");
                    }
                })
            })
        })
        .map(move |status| {
            info!(
                signature = %signature,
                slot = status.slot,
                state = %ConfirmationState::Finalized,
                "transaction finalized"
            );
            status
        })
        .map_error(move |error| {
            let error = PipelineError::from(error);
            let state = match &error {
                PipelineError::RetryAttemptsExhausted { .. } => ConfirmationState::Exhausted,
                _ => ConfirmationState::Failed,
            };
            warn!(signature = %signature, state = %state, error = %error, "confirmation ended without finality");
            error
        })
    }
}
