//! Submit a single OP Stack deposit and wait for it to be mined.

use alloy_primitives::{Address, Bytes};
use clap::Parser;
use client::TransactionSigner;
use config::NetworkType;
use deposit::{
    Amount, ConfirmationPoller, DepositRequest, DepositSubmitter, RpcClient, Transactor,
};
use depositor::{
    build_signer, confirm_deposit,
    config::Config,
    metrics::{install_prometheus_exporter, Metrics},
    submit_deposit,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "depositor")]
#[command(about = "Deposit ETH into an OP Stack chain through the L1 OptimismPortal")]
struct Cli {
    /// Path to an optional TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network preset (devnet, sepolia, mainnet)
    #[arg(long)]
    network: Option<NetworkType>,

    /// L1 RPC endpoint [default: http://localhost:8545]
    #[arg(long = "ethereum-endpoint", alias = "rpc-url")]
    rpc_url: Option<String>,

    /// OptimismPortal contract address on L1
    #[arg(long = "optimism-portal-address", alias = "optimism-portal")]
    optimism_portal: Option<Address>,

    /// Deposit recipient on L2 (defaults to the sender)
    #[arg(long)]
    to: Option<Address>,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Sign through a signer-proxy at this url instead of a local key
    #[arg(long)]
    remote_signer_url: Option<String>,

    /// Sender address, required with --remote-signer-url
    #[arg(long)]
    from: Option<Address>,

    /// Amount to deposit in ETH
    #[arg(long, default_value = "0")]
    value: Amount,

    /// L2 calldata of the deposit (hex)
    #[arg(long)]
    data: Option<Bytes>,

    /// L2 gas limit of the deposit [default: minimum for the calldata]
    #[arg(long)]
    deposit_gas_limit: Option<u64>,

    /// L1 chain ID used for signing
    #[arg(long)]
    chain_id: Option<u64>,

    /// Fixed L1 gas price in wei
    #[arg(long)]
    gas_price: Option<u64>,

    /// Gas limit of the L1 deposit call
    #[arg(long)]
    gas_limit: Option<u64>,

    /// Pause between receipt lookups in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Give up after this many receipt lookups
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Give up waiting for the receipt after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Layer the command line over the file configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(network) = self.network {
            config.network = network;
        }
        if self.rpc_url.is_some() {
            config.rpc_url.clone_from(&self.rpc_url);
        }
        if self.optimism_portal.is_some() {
            config.optimism_portal = self.optimism_portal;
        }
        if self.chain_id.is_some() {
            config.chain_id = self.chain_id;
        }
        if self.gas_price.is_some() {
            config.gas_price = self.gas_price;
        }
        if self.gas_limit.is_some() {
            config.gas_limit = self.gas_limit;
        }
        if self.deposit_gas_limit.is_some() {
            config.deposit_gas_limit = self.deposit_gas_limit;
        }
        if self.remote_signer_url.is_some() {
            config.remote_signer_url.clone_from(&self.remote_signer_url);
        }
        if self.from.is_some() {
            config.from = self.from;
        }
        if self.metrics_port.is_some() {
            config.metrics_port = self.metrics_port;
        }
        if let Some(interval_ms) = self.poll_interval_ms {
            config.poll.interval_ms = interval_ms;
        }
        if self.max_attempts.is_some() {
            config.poll.max_attempts = self.max_attempts;
        }
        if self.timeout_secs.is_some() {
            config.poll.timeout_secs = self.timeout_secs;
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);

    let network = config.network_config();
    network.validate()?;

    info!("Loaded config:");
    info!("  Network: {}", network.network_type);
    info!("  RPC URL: {}", config.rpc_url());
    info!("  OptimismPortal: {}", network.optimism_portal);
    info!("  Chain ID: {}", network.chain_id);

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Prometheus exporter listening");
    }
    let metrics = Metrics::new();

    let signer = build_signer(
        cli.private_key.as_deref(),
        config.remote_signer_url.as_deref(),
        config.from,
    )?;
    let sender = signer.address();

    let mut request = DepositRequest::new(cli.to.unwrap_or(sender), cli.value.wei());
    if let Some(data) = cli.data.clone() {
        request = request.with_data(data);
    }
    if let Some(gas_limit) = config.deposit_gas_limit {
        request = request.with_gas_limit(gas_limit);
    }

    info!(
        sender = %sender,
        recipient = %request.to,
        amount = %cli.value,
        ether = cli.value.ether(),
        value_wei = %request.value,
        "Deposit request"
    );

    let provider = client::create_provider(config.rpc_url()).await?;
    let rpc = RpcClient::new(provider);

    let submitter = DepositSubmitter::new(rpc.clone(), signer, Transactor::from(&network));
    let poller = ConfirmationPoller::new(rpc, config.poll_config());

    let submitted = submit_deposit(&submitter, &request, &metrics).await?;

    let confirmation = tokio::select! {
        result = confirm_deposit(&poller, submitted.tx_hash, &metrics) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!(
                tx_hash = %submitted.tx_hash,
                "Interrupted while waiting for the receipt; the deposit may still be mined"
            );
            eyre::bail!("interrupted before deposit {} was confirmed", submitted.tx_hash);
        }
    };

    if !confirmation.is_success() {
        eyre::bail!("deposit transaction failed");
    }

    info!(tx_hash = %submitted.tx_hash, "Deposit complete");

    Ok(())
}
