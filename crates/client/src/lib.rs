mod remote_signer;

use alloy_consensus::TxEnvelope;
use alloy_network::{eip2718::Encodable2718, EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
pub use remote_signer::RemoteSigner;
use std::{fmt, future::Future, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The signer proxy refused to sign
    #[error("Signer proxy error {code}: {message}")]
    SignerRejected { code: i64, message: String },
}

/// Signing capability used to authorize deposit transactions.
///
/// Implementations receive a fully filled transaction request (nonce, gas,
/// gas price and chain ID already set) and return the EIP-2718 encoded
/// signed transaction, ready for `eth_sendRawTransaction`.
pub trait TransactionSigner: Send + Sync {
    /// Address the signer signs for.
    fn address(&self) -> Address;

    /// Sign a filled transaction request.
    fn sign_transaction(
        &self,
        tx: TransactionRequest,
    ) -> impl Future<Output = eyre::Result<Bytes>> + Send;
}

/// Signs transactions in-process with a private key.
#[derive(Clone)]
pub struct LocalSigner {
    address: Address,
    wallet: EthereumWallet,
}

impl LocalSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self {
            address: signer.address(),
            wallet: EthereumWallet::from(signer),
        }
    }
}

impl FromStr for LocalSigner {
    type Err = ClientError;

    /// Parse a hex private key, with or without `0x` prefix.
    fn from_str(private_key: &str) -> Result<Self, Self::Err> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;

        Ok(Self::new(signer))
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, tx: TransactionRequest) -> eyre::Result<Bytes> {
        // Build and sign the typed transaction
        let tx_envelope: TxEnvelope = tx
            .build(&self.wallet)
            .await
            .map_err(|e| eyre::eyre!("{}", e))?;

        // Encode to EIP-2718 bytes
        let mut encoded = Vec::new();
        tx_envelope.encode_2718(&mut encoded);
        Ok(Bytes::from(encoded))
    }
}

/// Signing backend selected at startup.
#[derive(Debug, Clone)]
pub enum Signer {
    Local(LocalSigner),
    Remote(RemoteSigner),
}

impl TransactionSigner for Signer {
    fn address(&self) -> Address {
        match self {
            Self::Local(signer) => signer.address(),
            Self::Remote(signer) => signer.address(),
        }
    }

    async fn sign_transaction(&self, tx: TransactionRequest) -> eyre::Result<Bytes> {
        match self {
            Self::Local(signer) => signer.sign_transaction(tx).await,
            Self::Remote(signer) => signer.sign_transaction(tx).await,
        }
    }
}

/// Convenience function to create an ethereum rpc provider from url.
pub async fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}
