use serde::Serialize;
use thiserror::Error;

/// Failures raised while producing signatures or relaying signed bytes.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SignerError {
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),

    #[error("Invalid key: {0}")]
    KeyError(String),

    #[error("Network rejected transaction: {0}")]
    SendTransactionError(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}
