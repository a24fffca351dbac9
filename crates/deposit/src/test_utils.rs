//! Scriptable in-memory [`DepositRpc`] for tests.

use crate::rpc::{DepositReceipt, DepositRpc};
use alloy_consensus::{Transaction, TxEnvelope};
use alloy_network::eip2718::Decodable2718;
use alloy_primitives::{keccak256, Address, Bytes, TxHash, B256, U256};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

/// Scripted answer to a receipt lookup.
#[derive(Debug, Clone)]
pub enum ReceiptResponse {
    NotFound,
    Error(String),
    Mined(DepositReceipt),
}

#[derive(Debug, Default)]
struct MockState {
    balance: U256,
    nonce: u64,
    balance_error: Option<String>,
    send_error: Option<String>,
    receipts: HashMap<TxHash, VecDeque<ReceiptResponse>>,
    auto_mine: Option<bool>,
    receipt_lookups: u64,
    sent: Vec<Bytes>,
}

/// Mock chain: one funded sender, receipts scripted per transaction hash.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MockRpc {
    state: Arc<Mutex<MockState>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender balance used to accept or reject submissions.
    pub fn with_balance(self, balance: U256) -> Self {
        self.state().balance = balance;
        self
    }

    /// Make balance lookups fail with `message`.
    pub fn fail_balance_lookup(self, message: &str) -> Self {
        self.state().balance_error = Some(message.to_string());
        self
    }

    /// Make every submission fail with `message`.
    pub fn reject_submissions(self, message: &str) -> Self {
        self.state().send_error = Some(message.to_string());
        self
    }

    /// Mine every accepted transaction right away with the given status.
    pub fn auto_mine(self, status: bool) -> Self {
        self.state().auto_mine = Some(status);
        self
    }

    /// Queue answers for upcoming lookups of `tx_hash`. Once its queue is
    /// empty, and for hashes never scripted, lookups answer "not found".
    pub fn push_receipts(
        &self,
        tx_hash: TxHash,
        responses: impl IntoIterator<Item = ReceiptResponse>,
    ) {
        self.state()
            .receipts
            .entry(tx_hash)
            .or_default()
            .extend(responses);
    }

    pub fn receipt_lookups(&self) -> u64 {
        self.state().receipt_lookups
    }

    /// Raw transactions accepted so far.
    pub fn sent_transactions(&self) -> Vec<Bytes> {
        self.state().sent.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

impl DepositRpc for MockRpc {
    async fn get_balance(&self, _address: Address) -> eyre::Result<U256> {
        let state = self.state();
        match &state.balance_error {
            Some(message) => eyre::bail!("{message}"),
            None => Ok(state.balance),
        }
    }

    async fn get_transaction_count(&self, _address: Address) -> eyre::Result<u64> {
        Ok(self.state().nonce)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> eyre::Result<TxHash> {
        let mut state = self.state();
        if let Some(message) = &state.send_error {
            eyre::bail!("{message}");
        }

        let envelope = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|e| eyre::eyre!("invalid transaction: {e}"))?;

        if envelope.nonce() != state.nonce {
            eyre::bail!("nonce too low");
        }

        let gas_price = envelope.gas_price().unwrap_or_default();
        let cost = envelope.value() + U256::from(gas_price) * U256::from(envelope.gas_limit());
        if cost > state.balance {
            eyre::bail!(
                "insufficient funds for gas * price + value: balance {}, tx cost {}",
                state.balance,
                cost
            );
        }

        let tx_hash = keccak256(raw);
        state.nonce += 1;
        state.sent.push(Bytes::copy_from_slice(raw));
        if let Some(status) = state.auto_mine {
            state
                .receipts
                .entry(tx_hash)
                .or_default()
                .push_back(ReceiptResponse::Mined(mock_receipt(tx_hash, status)));
        }

        Ok(tx_hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> eyre::Result<Option<DepositReceipt>> {
        let mut state = self.state();
        state.receipt_lookups += 1;

        // A mined receipt stays available, like on a real chain
        let next = state.receipts.get_mut(&tx_hash).and_then(|queue| {
            if matches!(queue.front(), Some(ReceiptResponse::Mined(_))) {
                queue.front().cloned()
            } else {
                queue.pop_front()
            }
        });

        match next {
            None | Some(ReceiptResponse::NotFound) => Ok(None),
            Some(ReceiptResponse::Error(message)) => eyre::bail!("{message}"),
            Some(ReceiptResponse::Mined(receipt)) => Ok(Some(receipt)),
        }
    }
}

/// A mined receipt for `tx_hash` with the given execution status.
pub fn mock_receipt(tx_hash: TxHash, status: bool) -> DepositReceipt {
    DepositReceipt {
        status,
        transaction_hash: tx_hash,
        block_number: Some(42),
        block_hash: Some(B256::repeat_byte(0x42)),
        gas_used: 52_000,
        deposit_event: None,
    }
}
