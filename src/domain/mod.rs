//! # Domain Module
//!
//! Core minting logic:
//!
//! * [`Operation`]: composable fallible stages with bounded retry
//! * Instruction encoders and the mint instruction builder
//! * The confirmation state machine
//! * NFT mint and lookup handlers

mod operation;
pub use operation::*;

pub mod instructions;

pub mod confirmation;

pub mod nft;
pub use nft::*;
