//! Signing through a signer-proxy over JSON-RPC.
//!
//! The proxy holds the key (typically in an HSM or secure enclave) and answers
//! `eth_signTransaction` with the raw signed transaction.

use crate::{ClientError, TransactionSigner};
use alloy_primitives::{Address, Bytes};
use alloy_rpc_types::eth::TransactionRequest;
use eyre::{bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// [`TransactionSigner`] backed by a signer-proxy.
///
/// ```ignore
/// let signer = RemoteSigner::new("http://localhost:9060", address);
/// let raw = signer.sign_transaction(tx).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RemoteSigner {
    client: reqwest::Client,
    proxy_url: String,
    address: Address,
    next_id: Arc<AtomicU64>,
}

impl RemoteSigner {
    /// Signer for `address` whose key lives behind `proxy_url`.
    pub fn new(proxy_url: impl Into<String>, address: Address) -> Self {
        Self::with_client(reqwest::Client::new(), proxy_url, address)
    }

    pub fn with_client(
        client: reqwest::Client,
        proxy_url: impl Into<String>,
        address: Address,
    ) -> Self {
        Self {
            client,
            proxy_url: proxy_url.into(),
            address,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    fn sign_request(&self, mut tx: TransactionRequest) -> SignRequest {
        // The proxy resolves the key from `from`
        if tx.from.is_none() {
            tx.from = Some(self.address);
        }

        SignRequest {
            jsonrpc: "2.0",
            method: "eth_signTransaction",
            params: [tx],
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl TransactionSigner for RemoteSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, tx: TransactionRequest) -> Result<Bytes> {
        let request = self.sign_request(tx);

        let response = self
            .client
            .post(&self.proxy_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("signer-proxy returned {status}: {body}");
        }

        let response: SignResponse = response.json().await?;
        Ok(response.into_raw()?)
    }
}

#[derive(Debug, Serialize)]
struct SignRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: [TransactionRequest; 1],
    id: u64,
}

/// `eth_signTransaction` reply. The proxy answers with either the signed
/// transaction or an error object.
#[derive(Debug, Deserialize)]
struct SignResponse {
    result: Option<SignedTransaction>,
    error: Option<ProxyError>,
}

impl SignResponse {
    fn into_raw(self) -> Result<Bytes, ClientError> {
        match (self.result, self.error) {
            (Some(signed), _) => Ok(signed.raw),
            (None, Some(error)) => Err(ClientError::SignerRejected {
                code: error.code,
                message: error.message,
            }),
            (None, None) => Err(ClientError::SignerRejected {
                code: -1,
                message: "empty response".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProxyError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SignedTransaction {
    /// EIP-2718 encoded signed transaction
    raw: Bytes,
}
