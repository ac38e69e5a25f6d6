//! Constants for Solana transaction submission and confirmation.
//!
//! Defaults for the confirmation loop that waits for a submitted transaction to
//! reach finality, and for the RPC client used to reach the cluster.

use std::time::Duration;

/// Maximum number of status polls before confirmation gives up.
pub const DEFAULT_CONFIRMATION_MAX_ATTEMPTS: u32 = 5;

/// Delay before each status poll (in milliseconds).
/// Gives the network time to propagate the transaction before it is queried.
pub const DEFAULT_CONFIRMATION_POLL_DELAY_MS: u64 = 3_000;

/// Upper bound for the poll delay when exponential backoff is configured.
pub const DEFAULT_CONFIRMATION_MAX_POLL_DELAY_MS: u64 = 30_000;

/// Growth factor applied to the poll delay on every attempt under exponential backoff.
pub const DEFAULT_CONFIRMATION_BACKOFF_FACTOR: u32 = 2;

/// Default RPC request timeout (in seconds).
pub const DEFAULT_RPC_TIMEOUT_SECONDS: u64 = 30;

/// Extra attempts for an RPC call that failed with a transient error.
pub const DEFAULT_RPC_MAX_RETRIES: u32 = 2;

/// Base delay between retries of a transient RPC failure (in milliseconds).
/// Multiplied by the number of failed attempts so far.
pub const DEFAULT_RPC_RETRY_DELAY_MS: u64 = 200;

/// Get the default poll delay duration
pub fn get_default_confirmation_poll_delay() -> Duration {
    Duration::from_millis(DEFAULT_CONFIRMATION_POLL_DELAY_MS)
}
