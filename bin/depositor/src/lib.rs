pub mod config;
pub mod metrics;

use crate::metrics::Metrics;
use alloy_primitives::{utils::format_ether, Address, TxHash};
use client::{LocalSigner, RemoteSigner, Signer, TransactionSigner};
use deposit::{
    Confirmation, ConfirmationPoller, DepositRequest, DepositRpc, DepositSubmitter,
    SubmittedDeposit,
};
use eyre::WrapErr;
use tracing::info;

/// A submitted deposit together with its terminal confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    pub submitted: SubmittedDeposit,
    pub confirmation: Confirmation,
}

/// Pick the signing backend: the signer proxy when `remote_signer_url` is
/// set, otherwise the local private key.
pub fn build_signer(
    private_key: Option<&str>,
    remote_signer_url: Option<&str>,
    from: Option<Address>,
) -> eyre::Result<Signer> {
    if let Some(url) = remote_signer_url {
        let Some(address) = from else {
            eyre::bail!("A sender address is required when signing through a remote signer");
        };
        return Ok(Signer::Remote(RemoteSigner::new(url, address)));
    }

    let Some(private_key) = private_key else {
        eyre::bail!("A private key or a remote signer url is required");
    };
    let signer: LocalSigner = private_key.parse()?;

    Ok(Signer::Local(signer))
}

/// Submit one deposit and record it.
pub async fn submit_deposit<R, S>(
    submitter: &DepositSubmitter<R, S>,
    request: &DepositRequest,
    metrics: &Metrics,
) -> eyre::Result<SubmittedDeposit>
where
    R: DepositRpc,
    S: TransactionSigner,
{
    info!(deposit = %request.description(), "Submitting deposit");

    let submitted = submitter.submit(request).await?;

    metrics.set_sender_balance(submitted.sender_balance);
    metrics.record_submitted(request.value);

    Ok(submitted)
}

/// Wait for the receipt of a submitted deposit.
///
/// A reverted deposit is returned as a [`Confirmation`] with a failure
/// status; only an abandoned wait is an error here.
pub async fn confirm_deposit<R>(
    poller: &ConfirmationPoller<R>,
    tx_hash: TxHash,
    metrics: &Metrics,
) -> eyre::Result<Confirmation>
where
    R: DepositRpc,
{
    info!(tx_hash = %tx_hash, "Waiting for deposit receipt");

    let confirmation = poller
        .wait(tx_hash)
        .await
        .wrap_err("failed to confirm deposit transaction")?;

    metrics.record_receipt_lookups(confirmation.attempts);
    metrics.record_confirmation(confirmation.is_success());

    if let Some(event) = &confirmation.receipt.deposit_event {
        info!(
            from = %event.from,
            to = %event.to,
            version = %event.version,
            "TransactionDeposited emitted"
        );
    }

    Ok(confirmation)
}

/// Submit a deposit and wait for its confirmation.
pub async fn run_deposit<R, S>(
    submitter: &DepositSubmitter<R, S>,
    poller: &ConfirmationPoller<R>,
    request: &DepositRequest,
    metrics: &Metrics,
) -> eyre::Result<DepositOutcome>
where
    R: DepositRpc,
    S: TransactionSigner,
{
    let submitted = submit_deposit(submitter, request, metrics).await?;
    let confirmation = confirm_deposit(poller, submitted.tx_hash, metrics).await?;

    info!(
        tx_hash = %submitted.tx_hash,
        value_eth = %format_ether(request.value),
        success = confirmation.is_success(),
        attempts = confirmation.attempts,
        "Deposit finished"
    );

    Ok(DepositOutcome {
        submitted,
        confirmation,
    })
}
