//! # Settlement Node
//!
//! Reconciles settlement contract events into the channel engine.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `CN_*` environment variables
//! 2. Initialise logging
//! 3. Validate configuration
//! 4. Connect the JSON-RPC chain client
//! 5. Spawn one event listener per contract
//! 6. Run until Ctrl+C, then cancel and drain the listeners
//!
//! Channels are kept in the in-memory store; persistent storage is provided
//! by the deployment, not by this binary.

use anyhow::{Context, Result};
use cn_02_channel_engine::MemoryStore;
use node_runtime::logging::init_logging;
use node_runtime::{NodeConfig, NodeRuntime, RpcChainClient};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    init_logging(config.log_json)?;
    config.validate().context("Invalid configuration")?;

    info!("===========================================");
    info!("  Settlement Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(rpc_url = %config.rpc_url, ws_url = %config.ws_url, "Chain endpoints");
    info!(
        blockchain_id = config.blockchain_id,
        contracts = config.contract_addresses.len(),
        start_block = config.start_block,
        "Listener settings"
    );

    let client = Arc::new(
        RpcChainClient::new(config.rpc_url.clone(), config.ws_url.clone())
            .context("Failed to create chain client")?,
    );
    let runtime = NodeRuntime::new(config, client, MemoryStore::new());

    info!("Node is running. Press Ctrl+C to stop.");
    let summary = runtime
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    if !summary.failed.is_empty() {
        anyhow::bail!("{} listener(s) terminated with errors", summary.failed.len());
    }
    Ok(())
}
