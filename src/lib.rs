//! # Solana NFT Minter
//!
//! Mints and registers Metaplex NFTs by composing signed transactions from typed
//! instruction builders, submitting them through a pluggable signing identity and
//! confirming finality through a bounded polling loop.
//!
//! ```text
//! build instructions -> serialize (sign) -> send -> confirm -> resolve NFT
//! ```
//!
//! Each stage is an [`domain::Operation`]; the first failing stage short-circuits
//! the rest and surfaces a [`models::PipelineError`] tagged with the stage that failed.

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
