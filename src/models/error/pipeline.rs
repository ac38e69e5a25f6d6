use serde::Serialize;
use thiserror::Error;

use super::SignerError;
use crate::domain::{AbandonedOperation, RetryError};

/// Stage-tagged failure of a minting pipeline.
///
/// Every stage wraps its collaborator's failure into its own variant before the
/// error leaves the stage, so callers can tell a malformed build apart from a
/// rejected send or a transaction that never finalized.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum PipelineError {
    #[error("Failed to build instructions: {0}")]
    BuildInstructions(String),

    #[error("Failed to serialize transaction: {0}")]
    SerializeTransaction(String),

    #[error("Failed to send transaction: {0}")]
    SendTransaction(#[from] SignerError),

    #[error("Failed to confirm transaction: {0}")]
    ConfirmTransaction(String),

    /// The status query returned nothing usable (absent or not yet finalized).
    #[error("Signature status is missing or not finalized")]
    MissingSignatureStatus,

    #[error("Retry attempts exhausted after {attempts} attempts, last error: {last_error}")]
    RetryAttemptsExhausted {
        attempts: u32,
        last_error: Box<PipelineError>,
    },

    #[error("Failed to resolve NFT: {0}")]
    FindNft(String),

    #[error("Operation was abandoned without completing")]
    Abandoned,
}

impl PipelineError {
    /// Whether the failure reflects a condition that may clear on its own.
    ///
    /// **Transient:** `MissingSignatureStatus`, `RetryAttemptsExhausted` (the
    /// transaction may still finalize later).
    ///
    /// **Permanent:** everything else.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingSignatureStatus | PipelineError::RetryAttemptsExhausted { .. }
        )
    }
}

impl From<AbandonedOperation> for PipelineError {
    fn from(_: AbandonedOperation) -> Self {
        PipelineError::Abandoned
    }
}

impl From<RetryError<PipelineError>> for PipelineError {
    fn from(error: RetryError<PipelineError>) -> Self {
        match error {
            RetryError::Exhausted {
                attempts,
                last_error,
            } => PipelineError::RetryAttemptsExhausted {
                attempts,
                last_error: Box::new(last_error),
            },
            RetryError::NotRetryable(error) => error,
        }
    }
}
