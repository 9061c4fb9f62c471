//! Sol Wallet Desk
//!
//! Starts the HTTP gateway over a JSON-RPC connection to the configured
//! Solana cluster.
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│ HttpRpcClient│───▶│ Gateway  │
//! │  (YAML)  │    │  (JSON-RPC)  │    │ (axum)   │
//! └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Flags:
//! - `--env/-e <name>`: load `config/<name>.yaml` (default `dev`)
//! - `--port <n>`: override the gateway port
//! - `--balance <address>`: print one balance and exit

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use sol_wallet_desk::balance::BalanceService;
use sol_wallet_desk::config::AppConfig;
use sol_wallet_desk::rpc::{HttpRpcClient, RpcClient};
use sol_wallet_desk::{gateway, logging};

fn arg_value(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    args.windows(2)
        .find(|pair| names.contains(&pair[0].as_str()))
        .map(|pair| pair[1].clone())
}

fn get_env() -> String {
    arg_value(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    arg_value(&["--port"]).and_then(|p| p.parse().ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config =
        AppConfig::load(&env).with_context(|| format!("load configuration for '{}'", env))?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = logging::init_logging(&app_config);

    info!(
        env = %env,
        network = %app_config.network.as_str(),
        rpc = %app_config.rpc_endpoint(),
        version = %app_config.version,
        "Starting Sol Wallet Desk"
    );

    if !app_config.default_recipient_is_valid() {
        warn!(
            recipient = app_config.default_recipient.as_deref().unwrap_or_default(),
            "Configured default recipient is not a valid address; kept as form pre-fill only"
        );
    }

    let rpc: Arc<dyn RpcClient> = Arc::new(
        HttpRpcClient::new(app_config.rpc_endpoint(), app_config.rpc_timeout())
            .context("build RPC client")?,
    );
    let balances = Arc::new(BalanceService::new(rpc));

    if let Some(address) = arg_value(&["--balance"]) {
        let snapshot = balances
            .fetch_balance(&address)
            .await
            .with_context(|| format!("fetch balance of {}", address))?;
        println!(
            "{} {}",
            snapshot.address.short(),
            sol_wallet_desk::money::format_sol(
                snapshot.amount,
                sol_wallet_desk::money::DEFAULT_DISPLAY_DIGITS
            )
        );
        return Ok(());
    }

    gateway::run_server(Arc::new(app_config), balances)
        .await
        .context("gateway server")?;
    Ok(())
}
