//! Network configuration for L1→L2 deposits.
//!
//! Provides chain-specific addresses and transaction parameters for different
//! networks (local devnet, testnet, mainnet).

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Intrinsic gas of a plain transaction; no transaction may use less.
pub const MIN_TRANSACTION_GAS: u64 = 21_000;

/// Gas price used by every preset: 100 gwei.
pub const DEFAULT_GAS_PRICE: u128 = 100_000_000_000;

/// Gas limit for the L1 `depositTransaction` call itself.
pub const DEFAULT_GAS_LIMIT: u64 = 60_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Unknown network name
    #[error("Unknown network: {0} (expected devnet, sepolia or mainnet)")]
    UnknownNetwork(String),

    /// Portal address was never configured
    #[error("OptimismPortal address must not be zero")]
    ZeroPortal,

    /// Chain ID of zero is never valid for EIP-155 signing
    #[error("Chain ID must not be zero")]
    ZeroChainId,

    /// Gas limit below the intrinsic transaction cost
    #[error("Gas limit {0} is below the minimum of {MIN_TRANSACTION_GAS}")]
    GasLimitTooLow(u64),
}

/// Network type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Local devnet (anvil / op-devnet)
    #[default]
    Devnet,
    Sepolia,
    Mainnet,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Devnet => f.write_str("devnet"),
            Self::Sepolia => f.write_str("sepolia"),
            Self::Mainnet => f.write_str("mainnet"),
        }
    }
}

impl FromStr for NetworkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "devnet" | "local" => Ok(Self::Devnet),
            "sepolia" | "testnet" => Ok(Self::Sepolia),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Complete network configuration for submitting deposits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type
    pub network_type: NetworkType,
    /// L1 chain ID used for transaction signing
    pub chain_id: u64,
    /// OptimismPortal contract address on L1
    pub optimism_portal: Address,
    /// Fixed gas price in wei
    pub gas_price: u128,
    /// Gas limit for the L1 deposit call
    pub gas_limit: u64,
}

impl NetworkConfig {
    /// Local devnet configuration.
    ///
    /// The portal address is deployment specific and must be overridden.
    pub const fn devnet() -> Self {
        Self {
            network_type: NetworkType::Devnet,
            chain_id: 31337,
            optimism_portal: Address::ZERO,
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }

    /// Ethereum Sepolia configuration, depositing into OP Sepolia.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Sepolia,
            chain_id: 11155111,
            // https://sepolia.etherscan.io/address/0x16Fc5058F25648194471939df75CF27A2e143F78
            optimism_portal: address!("0x16Fc5058F25648194471939df75CF27A2e143F78"),
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }

    /// Ethereum mainnet configuration, depositing into OP Mainnet.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            chain_id: 1,
            // https://etherscan.io/address/0xbEb5Fc579115071764c7423A4f12eDde41f106Ed
            optimism_portal: address!("0xbEb5Fc579115071764c7423A4f12eDde41f106Ed"),
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Devnet => Self::devnet(),
            NetworkType::Sepolia => Self::sepolia(),
            NetworkType::Mainnet => Self::mainnet(),
        }
    }

    /// Check that the configuration can be used to sign and submit a deposit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.optimism_portal == Address::ZERO {
            return Err(ConfigError::ZeroPortal);
        }

        if self.chain_id == 0 {
            return Err(ConfigError::ZeroChainId);
        }

        if self.gas_limit < MIN_TRANSACTION_GAS {
            return Err(ConfigError::GasLimitTooLow(self.gas_limit));
        }

        Ok(())
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start from the defaults of a network preset.
    pub const fn new(network_type: NetworkType) -> Self {
        Self {
            config: NetworkConfig::from_network_type(network_type),
        }
    }

    /// Start with devnet defaults.
    pub const fn devnet() -> Self {
        Self::new(NetworkType::Devnet)
    }

    /// Start with Sepolia defaults.
    pub const fn sepolia() -> Self {
        Self::new(NetworkType::Sepolia)
    }

    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self::new(NetworkType::Mainnet)
    }

    /// Override the OptimismPortal address.
    pub const fn optimism_portal(mut self, address: Address) -> Self {
        self.config.optimism_portal = address;
        self
    }

    /// Override the chain ID.
    pub const fn chain_id(mut self, chain_id: u64) -> Self {
        self.config.chain_id = chain_id;
        self
    }

    /// Override the gas price (wei).
    pub const fn gas_price(mut self, gas_price: u128) -> Self {
        self.config.gas_price = gas_price;
        self
    }

    /// Override the gas limit of the deposit call.
    pub const fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.config.gas_limit = gas_limit;
        self
    }

    /// Build the network configuration.
    pub const fn build(self) -> NetworkConfig {
        self.config
    }
}
