//! NFT Minting Tool
//!
//! Mints a one-of-one NFT (or a limited master edition) against the cluster
//! configured through the environment and prints the resolved NFT as JSON.
//!
//! # Usage
//!
//! ```bash
//! SOLANA_RPC_URL=https://api.devnet.solana.com \
//! cargo run --example create_nft -- \
//!   --keypair ~/.config/solana/id.json \
//!   --name "Ticket #1" \
//!   --uri "https://example.com/ticket-1.json"
//! ```
//!
//! Other settings (`CONFIRMATION_*`, `LOG_*`, program id overrides) are read from
//! the environment or a `.env` file.

use clap::Parser;
use eyre::{eyre, Result, WrapErr};
use solana_nft_minter::{
    config::PipelineConfig,
    domain::CreateNftOperationHandler,
    logging::setup_logging,
    models::CreateNftInput,
    services::{IdentityDriver, LocalSigner, SolanaProvider, SolanaTransactionSerializer},
};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser, Debug)]
#[command(name = "create-nft")]
#[command(about = "Mint a Metaplex NFT and wait for it to finalize")]
#[command(version)]
struct Args {
    /// Path to a JSON keypair file (as written by solana-keygen); pays and owns the NFT
    #[arg(short, long)]
    keypair: PathBuf,

    #[arg(short, long)]
    name: String,

    #[arg(short, long, default_value = "")]
    symbol: String,

    /// URI of the off-chain JSON metadata
    #[arg(short, long)]
    uri: String,

    /// Royalties in basis points
    #[arg(long, default_value_t = 0)]
    seller_fee_basis_points: u16,

    /// Maximum number of prints; omit together with --unlimited for a one-of-one
    #[arg(long, conflicts_with = "unlimited")]
    max_supply: Option<u64>,

    /// Allow an unlimited number of prints
    #[arg(long)]
    unlimited: bool,

    /// Freeze the metadata after minting
    #[arg(long)]
    immutable: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging()?;

    let args = Args::parse();
    let config = PipelineConfig::from_env().wrap_err("Invalid configuration")?;

    let provider = Arc::new(
        SolanaProvider::new(&config.rpc).map_err(|e| eyre!("Failed to create provider: {e}"))?,
    );
    let signer = LocalSigner::from_json_file(&args.keypair)
        .map_err(|e| eyre!("Failed to load keypair {}: {e}", args.keypair.display()))?;
    let identity = Arc::new(IdentityDriver::new(signer, Arc::clone(&provider)));
    let serializer = Arc::new(SolanaTransactionSerializer::new(Arc::clone(&provider)));

    let handler = CreateNftOperationHandler::new(
        provider,
        serializer,
        identity,
        config.programs,
        config.confirmation,
    );

    let mut input = CreateNftInput::new(args.name, args.uri);
    input.symbol = args.symbol;
    input.seller_fee_basis_points = args.seller_fee_basis_points;
    input.is_mutable = !args.immutable;
    input.max_supply = match (args.unlimited, args.max_supply) {
        (true, _) => None,
        (false, supply) => Some(supply.unwrap_or(0)),
    };

    let nft = handler
        .handle(input)
        .await
        .map_err(|e| eyre!("Mint failed: {e}"))?;

    println!("{}", serde_json::to_string_pretty(&nft)?);
    Ok(())
}
