mod solana_transaction;
pub use solana_transaction::*;

mod solana_programs;
pub use solana_programs::*;

mod logging;
pub use logging::*;
