//! Deposit request and transactor settings.

use alloy_primitives::{utils::format_ether, Address, Bytes, U256};
use config::{network::MIN_TRANSACTION_GAS, NetworkConfig};

/// L2 gas charged per byte of deposit calldata by the portal.
pub const GAS_PER_CALLDATA_BYTE: u64 = 16;

/// Minimum L2 gas limit the portal accepts for `byte_count` bytes of calldata.
pub const fn minimum_gas_limit(byte_count: u64) -> u64 {
    byte_count * GAS_PER_CALLDATA_BYTE + MIN_TRANSACTION_GAS
}

/// Parameters of a single `depositTransaction` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    /// Recipient on L2
    pub to: Address,
    /// Value to credit on L2 (in wei); also sent as `msg.value`
    pub value: U256,
    /// L2 gas limit of the deposited transaction
    pub gas_limit: u64,
    /// Whether the deposit creates a contract on L2
    pub is_creation: bool,
    /// L2 calldata
    pub data: Bytes,
}

impl DepositRequest {
    /// A plain value transfer to `to` with the minimum gas limit.
    pub const fn new(to: Address, value: U256) -> Self {
        Self {
            to,
            value,
            gas_limit: minimum_gas_limit(0),
            is_creation: false,
            data: Bytes::new(),
        }
    }

    /// Attach L2 calldata, raising the gas limit to the new minimum if needed.
    pub fn with_data(mut self, data: Bytes) -> Self {
        self.gas_limit = self.gas_limit.max(minimum_gas_limit(data.len() as u64));
        self.data = data;
        self
    }

    /// Override the L2 gas limit.
    pub const fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Minimum L2 gas limit for this request's calldata.
    pub fn minimum_gas_limit(&self) -> u64 {
        minimum_gas_limit(self.data.len() as u64)
    }

    /// Validate the request before anything is signed.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.is_creation {
            if self.to != Address::ZERO {
                eyre::bail!("Recipient must be zero for contract creation deposits");
            }
        } else if self.to == Address::ZERO {
            eyre::bail!("Recipient address is zero");
        }

        let minimum = self.minimum_gas_limit();
        if self.gas_limit < minimum {
            eyre::bail!(
                "Deposit gas limit {} is below the minimum of {} for {} bytes of data",
                self.gas_limit,
                minimum,
                self.data.len()
            );
        }

        Ok(())
    }

    /// Get a human-readable description of this deposit.
    pub fn description(&self) -> String {
        format!(
            "Deposit {} ETH to {} (L2 gas limit {})",
            format_ether(self.value),
            self.to,
            self.gas_limit
        )
    }
}

/// Transaction settings for the L1 deposit call.
///
/// Chain ID and gas parameters are explicit so the submitter works against
/// any chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transactor {
    /// OptimismPortal contract address
    pub portal: Address,
    /// Chain ID used for signing
    pub chain_id: u64,
    /// Fixed gas price in wei
    pub gas_price: u128,
    /// Gas limit of the L1 transaction
    pub gas_limit: u64,
}

impl Transactor {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.portal == Address::ZERO {
            eyre::bail!("OptimismPortal address is zero");
        }

        if self.gas_limit < MIN_TRANSACTION_GAS {
            eyre::bail!(
                "Transaction gas limit {} is below the minimum of {}",
                self.gas_limit,
                MIN_TRANSACTION_GAS
            );
        }

        Ok(())
    }

    /// Upper bound of the L1 execution cost in wei.
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas_price) * U256::from(self.gas_limit)
    }
}

impl From<&NetworkConfig> for Transactor {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            portal: network.optimism_portal,
            chain_id: network.chain_id,
            gas_price: network.gas_price,
            gas_limit: network.gas_limit,
        }
    }
}
