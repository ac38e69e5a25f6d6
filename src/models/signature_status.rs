use serde::{Deserialize, Serialize};
use strum::Display;

/// Commitment level a submitted transaction has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
}

/// Status of a transaction signature as reported by the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmation_status: Option<ConfirmationStatus>,
    /// On-chain execution error, if the transaction failed.
    pub err: Option<String>,
}

impl SignatureStatus {
    pub fn new(slot: u64, confirmation_status: ConfirmationStatus) -> Self {
        Self {
            slot,
            confirmation_status: Some(confirmation_status),
            err: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.confirmation_status == Some(ConfirmationStatus::Finalized)
    }
}
