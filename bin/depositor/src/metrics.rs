//! Prometheus metrics for the depositor.
//!
//! All metrics are aggregated in the [`Metrics`] struct.

use alloy_primitives::U256;
use metrics::{counter, describe_counter, describe_gauge, gauge};

const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Aggregated metrics for the depositor.
///
/// Metric descriptions are registered with the global registry on creation.
/// Without an installed exporter every call is a no-op.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "depositor_deposits_submitted_total",
            "Total number of deposit transactions broadcast"
        );
        describe_counter!(
            "depositor_deposit_amount_gwei_total",
            "Total amount deposited in gwei"
        );
        describe_counter!(
            "depositor_receipt_lookups_total",
            "Total number of receipt lookups performed while confirming deposits"
        );
        describe_counter!(
            "depositor_confirmations_total",
            "Total confirmed deposits by outcome"
        );
        describe_gauge!(
            "depositor_sender_balance_wei",
            "Sender L1 balance in wei observed before submission"
        );
    }

    /// Record a broadcast deposit.
    pub fn record_submitted(&self, amount_wei: U256) {
        counter!("depositor_deposits_submitted_total").increment(1);
        counter!("depositor_deposit_amount_gwei_total").increment(wei_to_gwei(amount_wei));
    }

    pub fn record_receipt_lookups(&self, lookups: u64) {
        counter!("depositor_receipt_lookups_total").increment(lookups);
    }

    /// Record a terminal confirmation.
    pub fn record_confirmation(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        counter!("depositor_confirmations_total", "outcome" => outcome).increment(1);
    }

    pub fn set_sender_balance(&self, balance_wei: U256) {
        let balance = u128::try_from(balance_wei).unwrap_or(u128::MAX);
        gauge!("depositor_sender_balance_wei").set(balance as f64);
    }
}

/// Whole gwei in `amount_wei`, the sub-gwei remainder dropped.
///
/// Saturates at `u64::MAX` gwei, about 18 billion ETH.
fn wei_to_gwei(amount_wei: U256) -> u64 {
    let gwei = amount_wei / U256::from(WEI_PER_GWEI);
    u64::try_from(gwei).unwrap_or(u64::MAX)
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
