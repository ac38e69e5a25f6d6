//! End-to-end tests of the minting pipeline against an in-memory cluster.
//!
//! Signing, serialization and instruction encoding are the real implementations;
//! only the RPC provider is replaced. The fake cluster executes the token metadata
//! instructions it receives so the minted NFT can be read back.

use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};
use mpl_token_metadata::{
    accounts::{MasterEdition, Metadata},
    instructions::CreateMetadataAccountV3InstructionArgs,
    types::Key,
};
use solana_nft_minter::{
    config::{ConfirmationConfig, PollBackoff, ProgramAddresses, RpcConfig},
    constants::{CREATE_MASTER_EDITION_V3_DISCRIMINATOR, CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR},
    domain::{
        confirmation::TransactionConfirmer,
        instructions::decode_create_master_edition_v3_data,
        retry, CreateNftOperationHandler, Operation, RetryDecision, RetryError,
    },
    models::{
        ConfirmationStatus, CreateNftInput, MasterEditionInfo, PipelineError, SignatureStatus,
    },
    services::{
        IdentityDriver, LocalSigner, SolanaProvider, SolanaProviderError, SolanaProviderTrait,
        SolanaTransactionSerializer,
    },
};
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

struct FakeCluster {
    programs: ProgramAddresses,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    submitted: Mutex<Vec<Transaction>>,
    /// Polls answered with `confirmed` before the transaction reports `finalized`.
    polls_until_finalized: u32,
    polls: AtomicU32,
}

impl FakeCluster {
    fn new(polls_until_finalized: u32) -> Self {
        Self {
            programs: ProgramAddresses::default(),
            accounts: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            polls_until_finalized,
            polls: AtomicU32::new(0),
        }
    }

    fn store(&self, address: Pubkey, mut data: Vec<u8>, size: usize) {
        data.resize(size, 0);
        let account = Account {
            lamports: 1_000_000,
            data,
            owner: self.programs.token_metadata_program,
            executable: false,
            rent_epoch: 0,
        };
        self.accounts.lock().unwrap().insert(address, account);
    }

    /// Applies the token metadata instructions of a transaction.
    fn execute(&self, transaction: &Transaction) {
        for instruction in &transaction.message.instructions {
            let program = transaction.message.account_keys[instruction.program_id_index as usize];
            if program != self.programs.token_metadata_program {
                continue;
            }
            let target = transaction.message.account_keys[instruction.accounts[0] as usize];
            let account_key = |position: usize| {
                transaction.message.account_keys[instruction.accounts[position] as usize]
            };

            match instruction.data.first().copied() {
                Some(CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR) => {
                    let args =
                        CreateMetadataAccountV3InstructionArgs::try_from_slice(&instruction.data[1..])
                            .unwrap();
                    let metadata = Metadata {
                        key: Key::MetadataV1,
                        update_authority: account_key(4).to_bytes().into(),
                        mint: account_key(1).to_bytes().into(),
                        name: args.data.name,
                        symbol: args.data.symbol,
                        uri: args.data.uri,
                        seller_fee_basis_points: args.data.seller_fee_basis_points,
                        creators: args.data.creators,
                        primary_sale_happened: false,
                        is_mutable: args.is_mutable,
                        edition_nonce: None,
                        token_standard: None,
                        collection: args.data.collection,
                        uses: args.data.uses,
                        collection_details: None,
                        programmable_config: None,
                    };
                    self.store(target, metadata.try_to_vec().unwrap(), 679);
                }
                Some(CREATE_MASTER_EDITION_V3_DISCRIMINATOR) => {
                    let args = decode_create_master_edition_v3_data(&instruction.data).unwrap();
                    let edition = MasterEdition {
                        key: Key::MasterEditionV2,
                        supply: 0,
                        max_supply: args.max_supply,
                    };
                    self.store(target, edition.try_to_vec().unwrap(), 282);
                }
                _ => {}
            }
        }
    }
}

#[async_trait]
impl SolanaProviderTrait for FakeCluster {
    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError> {
        Ok(Hash::new_unique())
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        _data_size: usize,
    ) -> Result<u64, SolanaProviderError> {
        Ok(1_461_600)
    }

    async fn send_raw_transaction(
        &self,
        serialized_transaction: &[u8],
    ) -> Result<Signature, SolanaProviderError> {
        let transaction: Transaction = bincode::deserialize(serialized_transaction)
            .map_err(|e| SolanaProviderError::InvalidTransaction(e.to_string()))?;
        transaction
            .verify()
            .map_err(|e| SolanaProviderError::InvalidTransaction(e.to_string()))?;

        self.execute(&transaction);
        let signature = transaction.signatures[0];
        self.submitted.lock().unwrap().push(transaction);
        Ok(signature)
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<SignatureStatus>, SolanaProviderError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        let level = if poll > self.polls_until_finalized {
            ConfirmationStatus::Finalized
        } else {
            ConfirmationStatus::Confirmed
        };
        Ok(Some(SignatureStatus::new(u64::from(poll), level)))
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError> {
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }
}

fn no_wait(max_attempts: u32) -> ConfirmationConfig {
    ConfirmationConfig {
        max_attempts: NonZeroU32::new(max_attempts).unwrap(),
        poll_delay: Duration::ZERO,
        backoff: PollBackoff::Fixed,
    }
}

fn minter(
    cluster: Arc<FakeCluster>,
    payer: &Keypair,
    confirmation: ConfirmationConfig,
) -> CreateNftOperationHandler<
    FakeCluster,
    SolanaTransactionSerializer<FakeCluster>,
    IdentityDriver<LocalSigner, FakeCluster>,
> {
    let identity = IdentityDriver::new(
        LocalSigner::new(payer.insecure_clone()),
        Arc::clone(&cluster),
    );
    CreateNftOperationHandler::new(
        Arc::clone(&cluster),
        Arc::new(SolanaTransactionSerializer::new(Arc::clone(&cluster))),
        Arc::new(identity),
        ProgramAddresses::default(),
        confirmation,
    )
}

#[tokio::test]
async fn test_mint_is_signed_submitted_confirmed_and_resolved() {
    let cluster = Arc::new(FakeCluster::new(2));
    let payer = Keypair::new();
    let handler = minter(Arc::clone(&cluster), &payer, no_wait(5));

    let mut input = CreateNftInput::new("Ticket #7", "https://example.com/7.json");
    input.symbol = "TKT".to_string();
    input.seller_fee_basis_points = 500;
    input.max_supply = Some(10);
    let mint = input.mint.pubkey();

    let nft = handler.handle(input).await.unwrap();

    assert_eq!(nft.mint, mint);
    assert_eq!(nft.update_authority, payer.pubkey());
    assert_eq!(nft.name, "Ticket #7");
    assert_eq!(nft.symbol, "TKT");
    assert_eq!(nft.seller_fee_basis_points, 500);
    assert_eq!(nft.creators.len(), 1);
    assert_eq!(nft.creators[0].address, payer.pubkey());
    assert!(matches!(
        nft.master_edition,
        Some(MasterEditionInfo {
            max_supply: Some(10),
            ..
        })
    ));

    let submitted = cluster.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].message.account_keys[0], payer.pubkey());
    assert_eq!(submitted[0].signatures.len(), 2);
    assert_eq!(cluster.polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_mint_that_never_finalizes_is_reported() {
    let cluster = Arc::new(FakeCluster::new(u32::MAX));
    let payer = Keypair::new();
    let handler = minter(Arc::clone(&cluster), &payer, no_wait(5));

    let result = handler
        .handle(CreateNftInput::new("Slow", "https://example.com/slow.json"))
        .await;

    assert_eq!(
        result,
        Err(PipelineError::RetryAttemptsExhausted {
            attempts: 5,
            last_error: Box::new(PipelineError::MissingSignatureStatus),
        })
    );
    assert_eq!(cluster.polls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_failing_status_rpc_ends_confirmation_after_one_request() {
    let mut server = mockito::Server::new_async().await;
    let status_rpc = server
        .mock("POST", mockito::Matcher::Any)
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let provider = Arc::new(SolanaProvider::new(&RpcConfig::new(server.url())).unwrap());
    let confirmer = TransactionConfirmer::new(provider, no_wait(5));

    let result = confirmer.confirm(Signature::new_unique()).await;

    assert!(matches!(result, Err(PipelineError::ConfirmTransaction(_))));
    status_rpc.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_mints_share_one_identity() {
    let cluster = Arc::new(FakeCluster::new(0));
    let payer = Keypair::new();
    let handler = minter(Arc::clone(&cluster), &payer, no_wait(5));

    let first = handler.handle(CreateNftInput::new("A", "https://example.com/a.json"));
    let second = handler.handle(CreateNftInput::new("B", "https://example.com/b.json"));
    let (first, second) = tokio::join!(first.run(), second.run());

    let names = [first.unwrap().name, second.unwrap().name];
    assert_eq!(names, ["A".to_string(), "B".to_string()]);
    assert_eq!(cluster.submitted.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_callback_stages_compose_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let fetch_log = Arc::clone(&log);
    let store_log = Arc::clone(&log);
    let result: Result<u64, PipelineError> = Operation::from_async(move |completion| {
        tokio::spawn(async move {
            fetch_log.lock().unwrap().push("fetch");
            completion.succeed(20);
        });
    })
    .flat_map(move |value: u64| {
        store_log.lock().unwrap().push("store");
        Operation::pure(value + 1)
    })
    .map(|value| value * 2)
    .await;

    assert_eq!(result, Ok(42));
    assert_eq!(*log.lock().unwrap(), vec!["fetch", "store"]);
}

#[tokio::test]
async fn test_retry_gives_up_on_terminal_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let result: Result<(), RetryError<String>> = retry(NonZeroU32::new(5).unwrap(), move || {
        let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if call < 2 {
            Operation::fail(RetryDecision::Retry("pending".to_string()))
        } else {
            Operation::fail(RetryDecision::DoNotRetry("rpc down".to_string()))
        }
    })
    .await;

    assert_eq!(result, Err(RetryError::NotRetryable("rpc down".to_string())));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
