//! Confirmation polling for submitted deposits.
//!
//! The poller repeatedly asks for the receipt of a transaction until one is
//! returned, then classifies it. A missing receipt and a failed lookup both
//! leave the deposit pending; only a mined receipt ends the wait. By default
//! the wait is unbounded, [`PollConfig`] can cap it by attempts or time.

use crate::rpc::{DepositReceipt, DepositRpc};
use alloy_primitives::TxHash;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("No receipt for {tx_hash} after {attempts} lookups")]
    AttemptsExhausted { tx_hash: TxHash, attempts: u64 },

    #[error("No receipt for {tx_hash} within {timeout:?}")]
    TimedOut { tx_hash: TxHash, timeout: Duration },
}

/// Confirmation state of a submitted deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// No receipt yet
    Pending,
    /// Mined with a non-zero status
    Success,
    /// Mined but reverted
    Failure,
}

impl ConfirmationStatus {
    pub fn from_receipt(receipt: Option<&DepositReceipt>) -> Self {
        match receipt {
            None => Self::Pending,
            Some(receipt) if receipt.status => Self::Success,
            Some(_) => Self::Failure,
        }
    }
}

/// Polling limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between receipt lookups
    pub interval: Duration,
    /// Give up after this many lookups; at least one lookup is always made
    pub max_attempts: Option<u64>,
    /// Give up after this much time
    pub timeout: Option<Duration>,
}

impl PollConfig {
    /// Poll forever without pausing.
    pub const fn unbounded() -> Self {
        Self {
            interval: Duration::ZERO,
            max_attempts: None,
            timeout: None,
        }
    }

    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub const fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Terminal result of waiting for a deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub receipt: DepositReceipt,
    /// Either `Success` or `Failure`
    pub status: ConfirmationStatus,
    /// Number of receipt lookups performed, including the successful one
    pub attempts: u64,
}

impl Confirmation {
    pub const fn is_success(&self) -> bool {
        matches!(self.status, ConfirmationStatus::Success)
    }
}

/// Polls for the receipt of a submitted deposit.
pub struct ConfirmationPoller<R> {
    rpc: R,
    config: PollConfig,
}

impl<R> ConfirmationPoller<R>
where
    R: DepositRpc,
{
    pub const fn new(rpc: R, config: PollConfig) -> Self {
        Self { rpc, config }
    }

    pub const fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Wait until `tx_hash` is mined and classify the outcome.
    ///
    /// Dropping the returned future cancels the wait.
    pub async fn wait(&self, tx_hash: TxHash) -> Result<Confirmation, PollError> {
        match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.poll(tx_hash))
                .await
                .map_err(|_| PollError::TimedOut { tx_hash, timeout })?,
            None => self.poll(tx_hash).await,
        }
    }

    async fn poll(&self, tx_hash: TxHash) -> Result<Confirmation, PollError> {
        let mut attempts = 0u64;

        loop {
            if self
                .config
                .max_attempts
                .is_some_and(|max| attempts >= max.max(1))
            {
                return Err(PollError::AttemptsExhausted { tx_hash, attempts });
            }
            attempts += 1;

            let receipt = match self.rpc.get_transaction_receipt(tx_hash).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    debug!(
                        tx_hash = %tx_hash,
                        attempt = attempts,
                        error = %e,
                        "Receipt lookup failed, will retry"
                    );
                    None
                }
            };

            let receipt = receipt.filter(|receipt| {
                let matches = receipt.transaction_hash == tx_hash;
                if !matches {
                    warn!(
                        tx_hash = %tx_hash,
                        receipt_tx_hash = %receipt.transaction_hash,
                        "Ignoring receipt for a different transaction"
                    );
                }
                matches
            });

            let Some(receipt) = receipt else {
                debug!(tx_hash = %tx_hash, attempt = attempts, "Receipt not yet available");
                self.pause().await;
                continue;
            };

            info!(
                tx_hash = %receipt.transaction_hash,
                block_number = ?receipt.block_number,
                block_hash = ?receipt.block_hash,
                gas_used = receipt.gas_used,
                status = receipt.status,
                attempts,
                "Receipt available"
            );

            let status = ConfirmationStatus::from_receipt(Some(&receipt));
            match status {
                ConfirmationStatus::Success => {
                    info!(tx_hash = %tx_hash, "Deposit transaction succeeded")
                }
                ConfirmationStatus::Failure => {
                    error!(tx_hash = %tx_hash, "Deposit transaction failed")
                }
                ConfirmationStatus::Pending => unreachable!("a mined receipt is never pending"),
            }

            return Ok(Confirmation {
                receipt,
                status,
                attempts,
            });
        }
    }

    async fn pause(&self) {
        if self.config.interval.is_zero() {
            // Keep the loop cancellable by outer timeouts and selects
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.config.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_receipt, MockRpc, ReceiptResponse};
    use alloy_primitives::B256;

    const TX: TxHash = B256::repeat_byte(0xab);

    #[test]
    fn test_status_classification() {
        assert_eq!(ConfirmationStatus::from_receipt(None), ConfirmationStatus::Pending);
        assert_eq!(
            ConfirmationStatus::from_receipt(Some(&mock_receipt(TX, true))),
            ConfirmationStatus::Success
        );
        assert_eq!(
            ConfirmationStatus::from_receipt(Some(&mock_receipt(TX, false))),
            ConfirmationStatus::Failure
        );
    }

    #[tokio::test]
    async fn test_success_after_pending_lookups() {
        let rpc = MockRpc::new();
        rpc.push_receipts(TX, std::iter::repeat_n(ReceiptResponse::NotFound, 5));
        rpc.push_receipts(TX, [ReceiptResponse::Mined(mock_receipt(TX, true))]);

        let poller = ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded());
        let confirmation = poller.wait(TX).await.unwrap();

        assert_eq!(confirmation.status, ConfirmationStatus::Success);
        assert!(confirmation.is_success());
        assert_eq!(confirmation.attempts, 6);
        assert_eq!(rpc.receipt_lookups(), 6);
        assert_eq!(confirmation.receipt.transaction_hash, TX);
    }

    #[tokio::test]
    async fn test_immediate_receipt() {
        let rpc = MockRpc::new();
        rpc.push_receipts(TX, [ReceiptResponse::Mined(mock_receipt(TX, true))]);

        let poller = ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded());
        let confirmation = poller.wait(TX).await.unwrap();

        assert_eq!(confirmation.attempts, 1);
        assert_eq!(rpc.receipt_lookups(), 1);
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_failure() {
        let rpc = MockRpc::new();
        rpc.push_receipts(
            TX,
            [
                ReceiptResponse::NotFound,
                ReceiptResponse::Mined(mock_receipt(TX, false)),
            ],
        );

        let poller = ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded());
        let confirmation = poller.wait(TX).await.unwrap();

        assert_eq!(confirmation.status, ConfirmationStatus::Failure);
        assert!(!confirmation.is_success());
        assert!(!confirmation.receipt.status);
        assert_eq!(rpc.receipt_lookups(), 2);
    }

    #[tokio::test]
    async fn test_lookup_errors_are_retried() {
        let rpc = MockRpc::new();
        rpc.push_receipts(
            TX,
            [
                ReceiptResponse::Error("connection reset".to_string()),
                ReceiptResponse::NotFound,
                ReceiptResponse::Error("502 bad gateway".to_string()),
                ReceiptResponse::Mined(mock_receipt(TX, true)),
            ],
        );

        let poller = ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded());
        let confirmation = poller.wait(TX).await.unwrap();

        assert_eq!(confirmation.status, ConfirmationStatus::Success);
        assert_eq!(confirmation.attempts, 4);
    }

    #[tokio::test]
    async fn test_default_config_waits_forever() {
        // An empty script answers "not found" forever
        let rpc = MockRpc::new();
        let poller = ConfirmationPoller::new(rpc.clone(), PollConfig::default());
        assert_eq!(*poller.config(), PollConfig::unbounded());

        let result = tokio::time::timeout(Duration::from_millis(200), poller.wait(TX)).await;

        assert!(result.is_err(), "poller must not terminate without a receipt");
        assert!(rpc.receipt_lookups() > 1);
    }

    #[tokio::test]
    async fn test_max_attempts_bounds_the_wait() {
        let rpc = MockRpc::new();
        let poller =
            ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded().with_max_attempts(3));

        let result = poller.wait(TX).await;

        assert_eq!(
            result,
            Err(PollError::AttemptsExhausted {
                tx_hash: TX,
                attempts: 3
            })
        );
        assert_eq!(rpc.receipt_lookups(), 3);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_still_looks_up_once() {
        let rpc = MockRpc::new();
        let poller =
            ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded().with_max_attempts(0));

        let result = poller.wait(TX).await;

        assert_eq!(
            result,
            Err(PollError::AttemptsExhausted {
                tx_hash: TX,
                attempts: 1
            })
        );
        assert_eq!(rpc.receipt_lookups(), 1);

        rpc.push_receipts(TX, [ReceiptResponse::Mined(mock_receipt(TX, true))]);
        let confirmation = poller.wait(TX).await.unwrap();

        assert!(confirmation.is_success());
        assert_eq!(confirmation.attempts, 1);
    }

    #[tokio::test]
    async fn test_receipt_for_other_transaction_is_ignored() {
        let other = B256::repeat_byte(0x01);
        let rpc = MockRpc::new();
        rpc.push_receipts(TX, [ReceiptResponse::Mined(mock_receipt(other, true))]);
        let poller =
            ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded().with_max_attempts(3));

        let result = poller.wait(TX).await;

        assert_eq!(
            result,
            Err(PollError::AttemptsExhausted {
                tx_hash: TX,
                attempts: 3
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_hash_is_never_mined() {
        let other = B256::repeat_byte(0x01);
        let rpc = MockRpc::new();
        rpc.push_receipts(other, [ReceiptResponse::Mined(mock_receipt(other, true))]);
        let poller =
            ConfirmationPoller::new(rpc.clone(), PollConfig::unbounded().with_max_attempts(5));

        assert!(matches!(
            poller.wait(TX).await,
            Err(PollError::AttemptsExhausted { attempts: 5, .. })
        ));

        let confirmation = poller.wait(other).await.unwrap();
        assert_eq!(confirmation.receipt.transaction_hash, other);
        assert_eq!(confirmation.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_the_wait() {
        let rpc = MockRpc::new();
        let config = PollConfig::unbounded()
            .with_interval(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(10));
        let poller = ConfirmationPoller::new(rpc.clone(), config);

        let result = poller.wait(TX).await;

        assert_eq!(
            result,
            Err(PollError::TimedOut {
                tx_hash: TX,
                timeout: Duration::from_secs(10)
            })
        );
        // One lookup per second of paused time
        assert!((10..=11).contains(&rpc.receipt_lookups()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_between_lookups() {
        let rpc = MockRpc::new();
        rpc.push_receipts(
            TX,
            [
                ReceiptResponse::NotFound,
                ReceiptResponse::NotFound,
                ReceiptResponse::Mined(mock_receipt(TX, true)),
            ],
        );

        let poller = ConfirmationPoller::new(
            rpc.clone(),
            PollConfig::unbounded().with_interval(Duration::from_secs(2)),
        );

        let start = tokio::time::Instant::now();
        let confirmation = poller.wait(TX).await.unwrap();

        assert_eq!(confirmation.attempts, 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }
}
