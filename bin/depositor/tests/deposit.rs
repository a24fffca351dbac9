//! End-to-end deposit flow: submission followed by confirmation.
//!
//! The mock-backed tests run everywhere. The live test needs a local devnet
//! with a deployed OptimismPortal and a funded key:
//! ```bash
//! PRIVATE_KEY=0x... cargo test --package depositor --test deposit -- --ignored
//! ```

use alloy_primitives::{address, keccak256, Address, TxHash, U256};
use client::{LocalSigner, TransactionSigner};
use deposit::{
    ether_to_wei,
    test_utils::{mock_receipt, MockRpc, ReceiptResponse},
    ConfirmationPoller, ConfirmationStatus, DepositRequest, DepositSubmitter, PollConfig,
    RpcClient, Transactor,
};
use depositor::{confirm_deposit, metrics::Metrics, run_deposit, submit_deposit};
use setup::{load_test_config, setup_provider, setup_signer};

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

fn devnet_transactor() -> Transactor {
    Transactor {
        portal: address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"),
        chain_id: 31337,
        gas_price: 100_000_000_000,
        gas_limit: 60_000,
    }
}

fn setup_mock(balance: U256) -> (
    MockRpc,
    DepositSubmitter<MockRpc, LocalSigner>,
    ConfirmationPoller<MockRpc>,
) {
    let rpc = MockRpc::new().with_balance(balance);
    let signer: LocalSigner = DEV_KEY.parse().unwrap();
    let submitter = DepositSubmitter::new(rpc.clone(), signer, devnet_transactor());
    let poller = ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded());
    (rpc, submitter, poller)
}

#[tokio::test]
async fn test_deposit_confirmed_after_pending_lookups() {
    let (rpc, submitter, poller) = setup_mock(U256::from(10 * ONE_ETHER));
    let metrics = Metrics::new();
    let request = DepositRequest::new(RECIPIENT, ether_to_wei(0.01).unwrap());

    let submitted = submit_deposit(&submitter, &request, &metrics).await.unwrap();
    assert_eq!(rpc.sent_transactions().len(), 1);
    assert_eq!(submitted.tx_hash, keccak256(&rpc.sent_transactions()[0]));

    rpc.push_receipts(
        submitted.tx_hash,
        std::iter::repeat_n(ReceiptResponse::NotFound, 5),
    );
    rpc.push_receipts(
        submitted.tx_hash,
        [ReceiptResponse::Mined(mock_receipt(submitted.tx_hash, true))],
    );

    let confirmation = confirm_deposit(&poller, submitted.tx_hash, &metrics)
        .await
        .unwrap();

    assert_eq!(confirmation.status, ConfirmationStatus::Success);
    assert_eq!(confirmation.attempts, 6);
    assert_eq!(confirmation.receipt.transaction_hash, submitted.tx_hash);
    assert_eq!(rpc.receipt_lookups(), 6);
    assert_eq!(rpc.sent_transactions().len(), 1);
}

#[tokio::test]
async fn test_deposit_exceeding_balance_is_not_polled() {
    let (rpc, submitter, _poller) = setup_mock(U256::from(ONE_ETHER));
    let metrics = Metrics::new();
    let request = DepositRequest::new(RECIPIENT, U256::from(2 * ONE_ETHER));

    let err = submit_deposit(&submitter, &request, &metrics)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "failed to submit deposit transaction");
    assert!(format!("{err:#}").contains("insufficient funds"));
    assert!(rpc.sent_transactions().is_empty());
    assert_eq!(rpc.receipt_lookups(), 0);
}

#[tokio::test]
async fn test_reverted_deposit_is_reported_as_failure() {
    let (rpc, submitter, poller) = setup_mock(U256::from(10 * ONE_ETHER));
    let metrics = Metrics::new();
    let request = DepositRequest::new(RECIPIENT, ether_to_wei(0.5).unwrap());

    let submitted = submit_deposit(&submitter, &request, &metrics).await.unwrap();
    rpc.push_receipts(
        submitted.tx_hash,
        [ReceiptResponse::Mined(mock_receipt(submitted.tx_hash, false))],
    );

    let confirmation = confirm_deposit(&poller, submitted.tx_hash, &metrics)
        .await
        .unwrap();

    assert_eq!(confirmation.status, ConfirmationStatus::Failure);
    assert!(!confirmation.is_success());
}

#[tokio::test]
async fn test_repeated_deposits_are_independent() {
    let (rpc, submitter, poller) = setup_mock(U256::from(10 * ONE_ETHER));
    let rpc = rpc.auto_mine(true);
    let metrics = Metrics::new();
    let request = DepositRequest::new(RECIPIENT, ether_to_wei(0.01).unwrap());

    let first = run_deposit(&submitter, &poller, &request, &metrics)
        .await
        .unwrap();
    let second = run_deposit(&submitter, &poller, &request, &metrics)
        .await
        .unwrap();

    assert_ne!(first.submitted.tx_hash, second.submitted.tx_hash);
    assert_eq!(first.submitted.nonce + 1, second.submitted.nonce);
    assert!(first.confirmation.is_success());
    assert!(second.confirmation.is_success());
    assert_eq!(
        first.confirmation.receipt.transaction_hash,
        first.submitted.tx_hash
    );
    assert_eq!(
        second.confirmation.receipt.transaction_hash,
        second.submitted.tx_hash
    );
    assert_eq!(rpc.sent_transactions().len(), 2);
}

#[tokio::test]
async fn test_zero_value_deposit_round_trip() {
    let (rpc, submitter, poller) = setup_mock(U256::from(ONE_ETHER));
    let metrics = Metrics::new();
    let request = DepositRequest::new(RECIPIENT, ether_to_wei(0.0).unwrap());

    let submitted = submit_deposit(&submitter, &request, &metrics).await.unwrap();
    rpc.push_receipts(
        submitted.tx_hash,
        [
            ReceiptResponse::Error("header not found".to_string()),
            ReceiptResponse::Mined(mock_receipt(submitted.tx_hash, true)),
        ],
    );

    let confirmation = confirm_deposit(&poller, submitted.tx_hash, &metrics)
        .await
        .unwrap();

    assert!(confirmation.is_success());
    assert_eq!(confirmation.attempts, 2);
    assert_eq!(rpc.sent_transactions().len(), 1);
}

#[tokio::test]
async fn test_confirmation_matches_submitted_hash() {
    let (rpc, submitter, _poller) = setup_mock(U256::from(10 * ONE_ETHER));
    let rpc = rpc.auto_mine(true);
    let metrics = Metrics::new();
    let poller = ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded().with_max_attempts(3));
    let request = DepositRequest::new(RECIPIENT, ether_to_wei(0.25).unwrap());

    let submitted = submit_deposit(&submitter, &request, &metrics).await.unwrap();

    let unrelated = TxHash::repeat_byte(0x11);
    let err = confirm_deposit(&poller, unrelated, &metrics)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to confirm deposit transaction");
    assert_eq!(rpc.receipt_lookups(), 3);

    let confirmation = confirm_deposit(&poller, submitted.tx_hash, &metrics)
        .await
        .unwrap();
    assert!(confirmation.is_success());
    assert_eq!(confirmation.attempts, 1);
    assert_eq!(confirmation.receipt.transaction_hash, submitted.tx_hash);
}

#[tokio::test]
async fn test_bounded_wait_gives_up() {
    let rpc = MockRpc::new().with_balance(U256::from(ONE_ETHER));
    let signer: LocalSigner = DEV_KEY.parse().unwrap();
    let submitter = DepositSubmitter::new(rpc.clone(), signer, devnet_transactor());
    let poller = ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded().with_max_attempts(4));
    let metrics = Metrics::new();

    let err = run_deposit(
        &submitter,
        &poller,
        &DepositRequest::new(RECIPIENT, U256::from(1)),
        &metrics,
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "failed to confirm deposit transaction");
    assert_eq!(rpc.receipt_lookups(), 4);
    assert_eq!(rpc.sent_transactions().len(), 1);
}

#[tokio::test]
#[ignore = "requires a local devnet with a deployed OptimismPortal"]
async fn test_live_deposit() {
    let config = load_test_config();
    let network = config.network_config();
    network.validate().expect("test config must name a portal");

    let provider = setup_provider(config.rpc_url()).await;
    let rpc = RpcClient::new(provider);
    let signer = setup_signer();
    let sender = signer.address();

    println!("Depositing from {sender} through {}", network.optimism_portal);

    let submitter = DepositSubmitter::new(rpc.clone(), signer, Transactor::from(&network));
    let poller = ConfirmationPoller::new(rpc, config.poll_config());
    let request = DepositRequest::new(sender, ether_to_wei(0.01).unwrap());

    let outcome = run_deposit(&submitter, &poller, &request, &Metrics::new())
        .await
        .unwrap();

    println!("Deposit mined: {}", outcome.submitted.tx_hash);
    assert!(outcome.confirmation.is_success());

    let event = outcome
        .confirmation
        .receipt
        .deposit_event
        .expect("portal must emit TransactionDeposited");
    assert_eq!(event.from, sender);
    assert_eq!(event.to, sender);
}
