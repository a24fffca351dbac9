//! Chain RPC operations used by the submitter and the poller.

use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{Log, TransactionReceipt};
use alloy_sol_types::SolEvent;
use binding::opstack::IOptimismPortal;
use std::future::Future;

/// Decoded `TransactionDeposited` event emitted by the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvent {
    /// L1 sender (aliased on L2 when it is a contract)
    pub from: Address,
    /// L2 recipient
    pub to: Address,
    /// Deposit encoding version
    pub version: U256,
    /// Packed `(mint, value, gasLimit, isCreation, data)`
    pub opaque_data: Bytes,
}

/// Receipt of a mined deposit transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositReceipt {
    /// Execution status; `false` means the transaction reverted
    pub status: bool,
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub block_hash: Option<B256>,
    pub gas_used: u64,
    /// Portal event, absent if the call reverted
    pub deposit_event: Option<DepositEvent>,
}

impl DepositReceipt {
    pub fn from_rpc(receipt: &TransactionReceipt) -> Self {
        Self {
            status: receipt.status(),
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            block_hash: receipt.block_hash,
            gas_used: receipt.gas_used,
            deposit_event: parse_transaction_deposited_event(receipt.logs()),
        }
    }
}

fn parse_transaction_deposited_event(logs: &[Log]) -> Option<DepositEvent> {
    logs.iter().find_map(|log| {
        IOptimismPortal::TransactionDeposited::decode_log(&log.inner)
            .ok()
            .map(|event| DepositEvent {
                from: event.data.from,
                to: event.data.to,
                version: event.data.version,
                opaque_data: event.data.opaqueData.clone(),
            })
    })
}

/// Chain RPC operations needed to submit and confirm a deposit.
pub trait DepositRpc: Send + Sync {
    /// Native balance of `address` in wei.
    fn get_balance(&self, address: Address) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Next nonce of `address`, including pending transactions.
    fn get_transaction_count(
        &self,
        address: Address,
    ) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// Broadcast a signed transaction and return its hash.
    fn send_raw_transaction(
        &self,
        raw: &[u8],
    ) -> impl Future<Output = eyre::Result<TxHash>> + Send;

    /// Receipt of `tx_hash`, or `None` while it is not mined.
    fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = eyre::Result<Option<DepositReceipt>>> + Send;
}

/// [`DepositRpc`] backed by an alloy provider.
#[derive(Debug, Clone)]
pub struct RpcClient<P> {
    provider: P,
}

impl<P> RpcClient<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P> DepositRpc for RpcClient<P>
where
    P: Provider + Clone,
{
    async fn get_balance(&self, address: Address) -> eyre::Result<U256> {
        let balance = self.provider.get_balance(address).await?;
        Ok(balance)
    }

    async fn get_transaction_count(&self, address: Address) -> eyre::Result<u64> {
        let nonce = self.provider.get_transaction_count(address).pending().await?;
        Ok(nonce)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> eyre::Result<TxHash> {
        let pending = self.provider.send_raw_transaction(raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> eyre::Result<Option<DepositReceipt>> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.as_ref().map(DepositReceipt::from_rpc))
    }
}
