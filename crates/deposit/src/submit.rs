//! Deposit submission.
//!
//! Builds the `depositTransaction` call against the OptimismPortal, signs it
//! through a [`TransactionSigner`] and broadcasts it. Every call broadcasts a
//! new transaction; nothing is deduplicated.

use crate::{request::Transactor, rpc::DepositRpc, DepositRequest};
use alloy_primitives::{utils::format_ether, Address, TxHash, TxKind, U256};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use binding::opstack::IOptimismPortal;
use client::TransactionSigner;
use eyre::WrapErr;
use tracing::{info, warn};

/// Handle of a broadcast deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedDeposit {
    /// Hash used to poll for the receipt
    pub tx_hash: TxHash,
    pub sender: Address,
    /// Sender balance observed right before submission
    pub sender_balance: U256,
    pub nonce: u64,
}

/// Submits deposits to the OptimismPortal.
pub struct DepositSubmitter<R, S> {
    rpc: R,
    signer: S,
    transactor: Transactor,
}

impl<R, S> DepositSubmitter<R, S>
where
    R: DepositRpc,
    S: TransactionSigner,
{
    pub const fn new(rpc: R, signer: S, transactor: Transactor) -> Self {
        Self {
            rpc,
            signer,
            transactor,
        }
    }

    /// Address deposits are sent from.
    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    pub const fn transactor(&self) -> &Transactor {
        &self.transactor
    }

    /// Current balance of the sender.
    pub async fn sender_balance(&self) -> eyre::Result<U256> {
        self.rpc
            .get_balance(self.sender())
            .await
            .wrap_err("failed to get sender balance")
    }

    /// Build the unsigned portal call for `request`.
    pub fn build_transaction(&self, request: &DepositRequest, nonce: u64) -> TransactionRequest {
        let call = IOptimismPortal::depositTransactionCall {
            _to: request.to,
            _value: request.value,
            _gasLimit: request.gas_limit,
            _isCreation: request.is_creation,
            _data: request.data.clone(),
        };

        TransactionRequest {
            from: Some(self.sender()),
            to: Some(TxKind::Call(self.transactor.portal)),
            value: Some(request.value),
            input: TransactionInput::new(call.abi_encode().into()),
            nonce: Some(nonce),
            gas: Some(self.transactor.gas_limit),
            gas_price: Some(self.transactor.gas_price),
            chain_id: Some(self.transactor.chain_id),
            ..Default::default()
        }
    }

    /// Sign and broadcast a deposit.
    ///
    /// The sender balance is reported but does not gate submission; the
    /// network rejects deposits the sender cannot pay for.
    pub async fn submit(&self, request: &DepositRequest) -> eyre::Result<SubmittedDeposit> {
        self.transactor.validate()?;
        request.validate()?;

        let sender = self.sender();
        let sender_balance = self.sender_balance().await?;

        info!(
            sender = %sender,
            balance_wei = %sender_balance,
            balance_eth = %format_ether(sender_balance),
            "Sender balance"
        );
        info!(
            recipient = %request.to,
            value_wei = %request.value,
            value_eth = %format_ether(request.value),
            l2_gas_limit = request.gas_limit,
            "Deposit value"
        );

        let max_cost = request.value.saturating_add(self.transactor.max_fee());
        if sender_balance < max_cost {
            warn!(
                balance_wei = %sender_balance,
                max_cost_wei = %max_cost,
                max_fee_eth = %format_ether(self.transactor.max_fee()),
                "Sender balance may not cover the deposit value and L1 fee"
            );
        }

        let nonce = self
            .rpc
            .get_transaction_count(sender)
            .await
            .wrap_err("failed to get sender nonce")?;

        let tx = self.build_transaction(request, nonce);

        let signed_tx = self
            .signer
            .sign_transaction(tx)
            .await
            .wrap_err("failed to sign deposit transaction")?;

        let tx_hash = self
            .rpc
            .send_raw_transaction(&signed_tx)
            .await
            .wrap_err("failed to submit deposit transaction")?;

        info!(
            tx_hash = %tx_hash,
            portal = %self.transactor.portal,
            nonce,
            "Deposit transaction submitted"
        );

        Ok(SubmittedDeposit {
            tx_hash,
            sender,
            sender_balance,
            nonce,
        })
    }
}
