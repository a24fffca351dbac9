use alloy_primitives::Address;
use config::{NetworkConfig, NetworkConfigBuilder, NetworkType};
use deposit::PollConfig;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Default L1 RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Default pause between receipt lookups.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Top-level depositor configuration.
///
/// Every field is optional; unset fields fall back to the network preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network preset the remaining fields override
    pub network: NetworkType,

    /// L1 RPC endpoint url
    pub rpc_url: Option<String>,

    /// L1 OptimismPortal address
    pub optimism_portal: Option<Address>,

    pub chain_id: Option<u64>,

    /// Fixed L1 gas price in wei
    pub gas_price: Option<u64>,

    /// Gas limit of the L1 deposit call
    pub gas_limit: Option<u64>,

    /// L2 gas limit of the deposited transaction
    pub deposit_gas_limit: Option<u64>,

    /// Signer-proxy endpoint; signs with a local key when unset
    pub remote_signer_url: Option<String>,

    /// Sender address when signing through the proxy
    pub from: Option<Address>,

    /// Serve Prometheus metrics on this port
    pub metrics_port: Option<u16>,

    pub poll: PollSettings,
}

/// Receipt polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub interval_ms: u64,
    pub max_attempts: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: None,
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc_url.as_deref().unwrap_or(DEFAULT_RPC_URL)
    }

    /// Network preset with this file's overrides applied.
    pub fn network_config(&self) -> NetworkConfig {
        let mut builder = NetworkConfigBuilder::new(self.network);

        if let Some(portal) = self.optimism_portal {
            builder = builder.optimism_portal(portal);
        }
        if let Some(chain_id) = self.chain_id {
            builder = builder.chain_id(chain_id);
        }
        if let Some(gas_price) = self.gas_price {
            builder = builder.gas_price(u128::from(gas_price));
        }
        if let Some(gas_limit) = self.gas_limit {
            builder = builder.gas_limit(gas_limit);
        }

        builder.build()
    }

    pub fn poll_config(&self) -> PollConfig {
        let mut poll = PollConfig::unbounded()
            .with_interval(Duration::from_millis(self.poll.interval_ms));

        if let Some(max_attempts) = self.poll.max_attempts {
            poll = poll.with_max_attempts(max_attempts);
        }
        if let Some(timeout_secs) = self.poll.timeout_secs {
            poll = poll.with_timeout(Duration::from_secs(timeout_secs));
        }

        poll
    }
}
