use std::env;
use std::fs::File;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use vault_console::config::VaultConfig;
use vault_console::controller::VaultController;
use vault_console::gateway::StubGateway;
use vault_console::notify::TracingNotifier;
use vault_console::process_session;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    anyhow::ensure!(
        args.len() == 2,
        "Usage: {} <session.csv>",
        args.first().map(String::as_str).unwrap_or("vault-console")
    );

    let filename = &args[1];

    let config = VaultConfig::from_env().context("Invalid vault configuration")?;

    let file = File::open(filename)
        .with_context(|| format!("Failed to open session file '{}'", filename))?;

    let gateway = Arc::new(StubGateway::new(
        config.token_address.clone(),
        config.vault_address.clone(),
    ));
    let controller = VaultController::new(config, gateway, Arc::new(TracingNotifier));

    process_session(file, io::stdout(), &controller)
        .await
        .context("Failed to replay session and write history")?;

    tracing::info!("{}", controller.balance_summary().await);

    Ok(())
}
