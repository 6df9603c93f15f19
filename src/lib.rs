pub mod access;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod sequencer;
pub mod units;
pub mod validator;

use std::io::{Read, Write};

use tracing::{info, warn};

use controller::VaultController;
use error::Result;
use gateway::StubGateway;
use models::{Address, SessionAction, SessionCommand};
use notify::Notifier;

const DEFAULT_REJECTION: &str = "User rejected the request.";

/// Replay a CSV session script against a controller and write its history as CSV
///
/// The script has the columns `action,arg`. Rows that cannot be parsed or
/// lack a required argument are skipped with a warning.
pub async fn process_session<R, W, N>(
    reader: R,
    writer: W,
    controller: &VaultController<StubGateway, N>,
) -> Result<()>
where
    R: Read,
    W: Write,
    N: Notifier,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    for (line, result) in csv_reader.deserialize::<SessionCommand>().enumerate() {
        match result {
            Ok(command) => run_command(controller, command).await,
            Err(err) => warn!("Skipping malformed session row {}: {}", line + 1, err),
        }
    }

    controller.export_history(writer).await
}

async fn run_command<N: Notifier>(controller: &VaultController<StubGateway, N>, command: SessionCommand) {
    let gateway = controller.gateway();
    let arg = command.arg.as_deref();

    match (command.action, arg) {
        (SessionAction::Owner, owner) => gateway.set_owner(owner.map(Address::from)),
        (SessionAction::Connect, Some(address)) => controller.connect(Address::from(address)).await,
        (SessionAction::Disconnect, _) => controller.disconnect().await,
        (SessionAction::Mint, Some(amount)) => {
            let account = match controller.account().await {
                Some(account) => account,
                None => {
                    warn!("Skipping mint of {} - no account connected", amount);
                    return;
                }
            };
            match units::to_raw(amount) {
                Ok(raw) => gateway.mint(&account, raw),
                Err(err) => warn!("Skipping mint of '{}': {}", amount, err),
            }
        }
        (SessionAction::Deposit, amount) => {
            let outcome = controller.deposit(amount.unwrap_or_default()).await;
            info!("deposit {}: {:?}", amount.unwrap_or_default(), outcome);
        }
        (SessionAction::Claim, amount) => {
            let outcome = controller.claim(amount.unwrap_or_default()).await;
            info!("claim {}: {:?}", amount.unwrap_or_default(), outcome);
        }
        (SessionAction::Reject, message) => {
            gateway.reject_next(message.unwrap_or(DEFAULT_REJECTION))
        }
        (SessionAction::Revert, _) => gateway.revert_next(),
        (SessionAction::Confirm, _) => {
            let settled = controller.watch_pending().await;
            info!("{} transaction(s) settled", settled);
        }
        (action, None) => warn!("Skipping {:?} - missing argument", action),
    }
}
