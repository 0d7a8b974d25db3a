//! # Trust-Relay Node
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file from `TR_CONFIG` or the first argument, then
//!    `TR_*` environment overrides)
//! 2. Install tracing
//! 3. Build and start the runtime
//! 4. Run until Ctrl+C, then shut down

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::logging::init_tracing;
use node_runtime::{NodeConfig, NodeRuntime};
use shared_types::InMemoryStateStore;
use tracing::info;

fn load_config() -> Result<NodeConfig> {
    let path = std::env::var_os("TR_CONFIG")
        .map(PathBuf::from)
        .or_else(|| std::env::args_os().nth(1).map(PathBuf::from));

    let mut config = match &path {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    init_tracing(&config.node.log_level)?;

    info!("===========================================");
    info!("  Trust-Relay Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let runtime = NodeRuntime::new(config, Arc::new(InMemoryStateStore::new()))
        .context("Failed to build node runtime")?;
    runtime.start()?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
