//! Configuration types for the deposit tool.
//!
//! This crate provides:
//! - Network configurations (devnet, Sepolia, mainnet)
//! - OptimismPortal addresses for each network
//! - Transaction parameters that used to be hardcoded (chain id, gas price, gas limit)

pub mod network;

pub use network::{ConfigError, NetworkConfig, NetworkConfigBuilder, NetworkType};
