//! Mints an NFT end to end.
//!
//! ```text
//! build instructions -> serialize (sign) -> send -> confirm -> resolve NFT
//! ```
//!
//! Each stage maps its collaborator's failure into its own [`PipelineError`]
//! variant, and the first failure skips every later stage.
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature};
use std::sync::Arc;
use tracing::{debug, info};

use super::FindNftByMintOperationHandler;
use crate::{
    config::{ConfirmationConfig, ProgramAddresses},
    domain::{confirmation::TransactionConfirmer, instructions::CreateNftInstructionBuilder, Operation},
    models::{CreateNftInput, MintAccount, Nft, PipelineError},
    services::{
        IdentityDriver, LocalSigner, SigningIdentity, SolanaProviderTrait,
        TransactionSerializerTrait,
    },
};

/// Output of the build stage: the instructions and every identity that must sign them.
struct PreparedMint {
    mint: Pubkey,
    instructions: Vec<Instruction>,
    signers: Vec<Arc<dyn SigningIdentity>>,
}

/// Orchestrates a mint on behalf of one signing identity.
///
/// The identity pays for the transaction and receives the minted token. Handlers
/// hold no per-mint state, so one handler can drive any number of concurrent mints.
pub struct CreateNftOperationHandler<P, Z, I>
where
    P: SolanaProviderTrait,
    Z: TransactionSerializerTrait,
    I: SigningIdentity,
{
    provider: Arc<P>,
    serializer: Arc<Z>,
    identity: Arc<I>,
    builder: Arc<CreateNftInstructionBuilder<P>>,
    confirmer: Arc<TransactionConfirmer<P>>,
    finder: Arc<FindNftByMintOperationHandler<P>>,
}

impl<P, Z, I> CreateNftOperationHandler<P, Z, I>
where
    P: SolanaProviderTrait + 'static,
    Z: TransactionSerializerTrait + 'static,
    I: SigningIdentity + 'static,
{
    pub fn new(
        provider: Arc<P>,
        serializer: Arc<Z>,
        identity: Arc<I>,
        programs: ProgramAddresses,
        confirmation: ConfirmationConfig,
    ) -> Self {
        Self {
            builder: Arc::new(CreateNftInstructionBuilder::new(
                Arc::clone(&provider),
                programs.clone(),
            )),
            confirmer: Arc::new(TransactionConfirmer::new(
                Arc::clone(&provider),
                confirmation,
            )),
            finder: Arc::new(FindNftByMintOperationHandler::new(
                Arc::clone(&provider),
                programs,
            )),
            provider,
            serializer,
            identity,
        }
    }

    pub fn handle(&self, input: CreateNftInput) -> Operation<Nft, PipelineError> {
        let serializer = Arc::clone(&self.serializer);
        let sender = Arc::clone(&self.identity);
        let confirmer = Arc::clone(&self.confirmer);
        let finder = Arc::clone(&self.finder);

        self.build(input).flat_map(move |prepared| {
            let mint = prepared.mint;
            Self::serialize(serializer, prepared)
                .flat_map(move |bytes| Self::send(sender, bytes))
                .flat_map(move |signature| confirmer.confirm(signature))
                .flat_map(move |status| {
                    info!(mint = %mint, slot = status.slot, "mint finalized, resolving nft");
                    finder.handle(mint)
                })
        })
    }

    fn build(&self, input: CreateNftInput) -> Operation<PreparedMint, PipelineError> {
        let builder = Arc::clone(&self.builder);
        let provider = Arc::clone(&self.provider);
        let identity = Arc::clone(&self.identity);

        Operation::from_future(async move {
            let payer = identity
                .pubkey()
                .await
                .map_err(|e| PipelineError::BuildInstructions(e.to_string()))?;
            let mint = input.mint.pubkey();
            debug!(mint = %mint, payer = %payer, "building mint instructions");

            let instructions = builder
                .build(&input, payer)
                .await
                .map_err(|e| PipelineError::BuildInstructions(e.to_string()))?;

            let mut signers: Vec<Arc<dyn SigningIdentity>> = vec![identity];
            if let MintAccount::New(keypair) = input.mint {
                signers.push(Arc::new(IdentityDriver::new(
                    LocalSigner::new(keypair),
                    provider,
                )));
            }

            Ok(PreparedMint {
                mint,
                instructions,
                signers,
            })
        })
    }

    fn serialize(serializer: Arc<Z>, prepared: PreparedMint) -> Operation<Vec<u8>, PipelineError> {
        Operation::from_future(async move {
            debug!(
                mint = %prepared.mint,
                signers = prepared.signers.len(),
                "serializing mint transaction"
            );
            serializer
                .serialize_transaction(&prepared.instructions, None, &prepared.signers)
                .await
                .map_err(|e| PipelineError::SerializeTransaction(e.to_string()))
        })
    }

    fn send(identity: Arc<I>, bytes: Vec<u8>) -> Operation<Signature, PipelineError> {
        Operation::from_future(async move {
            let signature = identity.send_transaction(&bytes).await?;
            info!(signature = %signature, "mint transaction submitted");
            Ok(signature)
        })
    }
}

impl<P, Z, I> std::fmt::Debug for CreateNftOperationHandler<P, Z, I>
where
    P: SolanaProviderTrait,
    Z: TransactionSerializerTrait,
    I: SigningIdentity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateNftOperationHandler")
            .field("programs", self.builder.programs())
            .field("confirmation", self.confirmer.config())
            .finish()
    }
}
