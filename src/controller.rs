use std::io::Write;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::access::is_owner;
use crate::config::VaultConfig;
use crate::error::{Result, ValidationError, VaultError};
use crate::gateway::{ConfirmationWatcher, ContractGateway, GatewayError};
use crate::ledger::Ledger;
use crate::models::{
    Address, ContractCall, Method, ReceiptStatus, TransactionRecord, TxHash, TxKind, TxStatus,
};
use crate::notify::{Notifier, Severity};
use crate::sequencer::{Sequencer, StepSequence};
use crate::units::{format_rounded, to_display};
use crate::validator::check_amount;

const APPROVING: &str = "Approving...";
const ERROR_SENDING: &str = "Error sending";
const ERROR_CLAIMING: &str = "Error claiming";
const TX_CONFIRMED: &str = "Transaction confirmed!";
const TX_FAILED: &str = "Transaction failed";

/// Result of a user action; failures have already been shown as a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Every step was accepted; hashes in step order
    Submitted(Vec<TxHash>),
    /// Amount refused before any call was made
    Invalid(ValidationError),
    /// A remote call failed; remaining steps were not issued
    Failed { kind: TxKind, message: String },
    /// Another transaction is still pending; nothing happened
    Busy,
    /// Claim attempted by an account that is not the vault owner
    NotPermitted,
    NotConnected,
}

/// Enabled/visible state of the vault controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    /// Kind of the most recent pending record, if any
    pub busy: Option<TxKind>,
    pub send_enabled: bool,
    pub claim_visible: bool,
    pub claim_enabled: bool,
}

/// Headless vault page: deposit and claim actions, balances and history
///
/// All loading state is derived from the ledger. While any record is pending
/// both actions are no-ops that return [`ActionOutcome::Busy`].
///
/// Handles are cheap to clone with [`VaultController::clone_handle`] and share
/// the same account, ledger and collaborators.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vault_console::config::VaultConfig;
/// use vault_console::controller::{ActionOutcome, VaultController};
/// use vault_console::gateway::StubGateway;
/// use vault_console::models::Address;
/// use vault_console::notify::MemoryNotifier;
/// use vault_console::units::ONE_TOKEN;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = VaultConfig::default();
/// let gateway = Arc::new(StubGateway::new(
///     config.token_address.clone(),
///     config.vault_address.clone(),
/// ));
/// let user = Address::new("0x00000000000000000000000000000000000000cc");
/// gateway.mint(&user, 20 * ONE_TOKEN);
///
/// let controller = VaultController::new(config, gateway, Arc::new(MemoryNotifier::new()));
/// controller.connect(user).await;
///
/// let outcome = controller.deposit("5").await;
/// assert!(matches!(outcome, ActionOutcome::Submitted(ref hashes) if hashes.len() == 2));
/// # }
/// ```
pub struct VaultController<G, N> {
    config: Arc<VaultConfig>,
    gateway: Arc<G>,
    notifier: Arc<N>,
    account: Arc<RwLock<Option<Address>>>,
    ledger: Arc<Mutex<Ledger>>,
}

impl<G, N> VaultController<G, N>
where
    G: ContractGateway + ConfirmationWatcher,
    N: Notifier,
{
    pub fn new(config: VaultConfig, gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            notifier,
            account: Arc::new(RwLock::new(None)),
            ledger: Arc::new(Mutex::new(Ledger::new())),
        }
    }

    /// Another handle to the same controller state
    pub fn clone_handle(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            gateway: Arc::clone(&self.gateway),
            notifier: Arc::clone(&self.notifier),
            account: Arc::clone(&self.account),
            ledger: Arc::clone(&self.ledger),
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn connect(&self, address: Address) {
        info!("Connected {}", address);
        *self.account.write().await = Some(address);
    }

    pub async fn disconnect(&self) {
        if let Some(address) = self.account.write().await.take() {
            info!("Disconnected {}", address);
        }
    }

    /// Currently connected account
    pub async fn account(&self) -> Option<Address> {
        self.account.read().await.clone()
    }

    /// Raw token balance held by the vault
    pub async fn vault_balance(&self) -> Result<u128> {
        self.balance_of(&self.config.vault_address).await
    }

    /// Raw token balance of the connected account
    pub async fn wallet_balance(&self) -> Result<u128> {
        let account = self.account().await.ok_or(VaultError::NotConnected)?;
        self.balance_of(&account).await
    }

    async fn balance_of(&self, holder: &Address) -> Result<u128> {
        let call = ContractCall::balance_of(&self.config.token_address, holder);
        let value = self.gateway.read(&call).await?;
        value
            .as_amount()
            .ok_or_else(|| GatewayError::UnexpectedValue(Method::BalanceOf).into())
    }

    /// Vault owner, or `None` while it cannot be read
    pub async fn owner(&self) -> Option<Address> {
        match self.gateway.read(&ContractCall::owner(&self.config.vault_address)).await {
            Ok(value) => value.as_address().cloned(),
            Err(err) => {
                debug!("Vault owner unavailable: {}", err);
                None
            }
        }
    }

    /// Whether the connected account owns the vault
    pub async fn is_owner(&self) -> bool {
        let account = self.account().await;
        let owner = self.owner().await;
        is_owner(account.as_ref(), owner.as_ref())
    }

    /// Heading line, e.g. `Vault Balance: 50.25 MTK`
    ///
    /// An unreadable balance is shown as zero.
    pub async fn balance_summary(&self) -> String {
        let raw = match self.vault_balance().await {
            Ok(raw) => raw,
            Err(err) => {
                debug!("Vault balance unavailable: {}", err);
                0
            }
        };
        format!(
            "Vault Balance: {} {}",
            format_rounded(raw, self.config.display_precision),
            self.config.token_symbol
        )
    }

    /// Largest amount `kind` can move, as input text
    ///
    /// Deposits draw on the connected wallet, claims on the vault.
    pub async fn max_amount(&self, kind: TxKind) -> Result<String> {
        let raw = match kind {
            TxKind::Claim => self.vault_balance().await?,
            TxKind::Approve | TxKind::Send => self.wallet_balance().await?,
        };
        Ok(to_display(raw))
    }

    /// Approve the vault for `amount_text` tokens, then send them to it
    pub async fn deposit(&self, amount_text: &str) -> ActionOutcome {
        let sender = match self.account().await {
            Some(sender) => sender,
            None => return ActionOutcome::NotConnected,
        };

        if self.is_busy().await {
            return ActionOutcome::Busy;
        }

        let available = match self.wallet_balance().await {
            Ok(available) => available,
            Err(err) => return self.report_failure(TxKind::Approve, &err, ERROR_SENDING),
        };

        let raw = match check_amount(amount_text, available) {
            Ok(raw) => raw,
            Err(err) => return self.report_invalid(err),
        };

        let sequence = StepSequence::deposit(
            &self.config.token_address,
            &self.config.vault_address,
            raw,
            amount_text.trim(),
        );
        self.execute(&sender, &sequence, ERROR_SENDING).await
    }

    /// Withdraw `amount_text` tokens from the vault; owner only
    pub async fn claim(&self, amount_text: &str) -> ActionOutcome {
        let sender = match self.account().await {
            Some(sender) => sender,
            None => return ActionOutcome::NotConnected,
        };

        // Unknown owner hides the control; no toast
        if !self.is_owner().await {
            debug!("Ignoring claim from {} - not the vault owner", sender);
            return ActionOutcome::NotPermitted;
        }

        if self.is_busy().await {
            return ActionOutcome::Busy;
        }

        let available = match self.vault_balance().await {
            Ok(available) => available,
            Err(err) => return self.report_failure(TxKind::Claim, &err, ERROR_CLAIMING),
        };

        let raw = match check_amount(amount_text, available) {
            Ok(raw) => raw,
            Err(err) => return self.report_invalid(err),
        };

        let sequence = StepSequence::claim(&self.config.vault_address, raw, amount_text.trim());
        self.execute(&sender, &sequence, ERROR_CLAIMING).await
    }

    async fn execute(&self, sender: &Address, sequence: &StepSequence, fallback: &str) -> ActionOutcome {
        let notifier = &self.notifier;
        let result = Sequencer::new(&*self.gateway, &*self.ledger)
            .run(sender, sequence, |kind, _| {
                if kind == TxKind::Approve {
                    notifier.notify(APPROVING, Severity::Info);
                }
            })
            .await;

        match result {
            Ok(hashes) => ActionOutcome::Submitted(hashes),
            Err(VaultError::Busy) => ActionOutcome::Busy,
            Err(VaultError::RemoteCallRejected { kind, message }) => {
                let message = message.unwrap_or_else(|| fallback.to_string());
                self.notifier.notify(&message, Severity::Error);
                ActionOutcome::Failed { kind, message }
            }
            Err(err) => {
                let kind = match &err {
                    VaultError::StepFailed { kind, .. } => *kind,
                    _ => sequence
                        .steps()
                        .first()
                        .map(|step| step.kind)
                        .unwrap_or(TxKind::Send),
                };
                self.report_failure(kind, &err, fallback)
            }
        }
    }

    fn report_invalid(&self, err: ValidationError) -> ActionOutcome {
        debug!("Amount refused: {}", err);
        self.notifier.notify(&err.to_string(), Severity::Error);
        ActionOutcome::Invalid(err)
    }

    fn report_failure(&self, kind: TxKind, err: &VaultError, fallback: &str) -> ActionOutcome {
        warn!("{} failed: {}", kind, err);
        self.notifier.notify(fallback, Severity::Error);
        ActionOutcome::Failed {
            kind,
            message: fallback.to_string(),
        }
    }

    /// Apply a confirmation signal for `hash` to the history
    pub async fn apply_receipt(&self, hash: &TxHash, receipt: ReceiptStatus) -> Result<TxStatus> {
        let status = self.ledger.lock().await.settle(hash, receipt)?;

        match status {
            TxStatus::Confirmed => self.notifier.notify(TX_CONFIRMED, Severity::Success),
            _ => self.notifier.notify(TX_FAILED, Severity::Error),
        }
        info!("{} settled as {}", hash, status);

        Ok(status)
    }

    /// Wait for receipts of every accepted pending transaction
    ///
    /// Receipts are awaited concurrently. A watcher error counts as a failed
    /// transaction. Returns how many records were settled.
    pub async fn watch_pending(&self) -> usize {
        let hashes = self.ledger.lock().await.awaiting_confirmation();

        let receipts = join_all(hashes.into_iter().map(|hash| async move {
            let receipt = self.gateway.wait_for_receipt(&hash).await;
            (hash, receipt)
        }))
        .await;

        let mut settled = 0;
        for (hash, receipt) in receipts {
            let receipt = receipt.unwrap_or_else(|err| {
                warn!("No receipt for {}: {}", hash, err);
                ReceiptStatus::Reverted
            });

            match self.apply_receipt(&hash, receipt).await {
                Ok(_) => settled += 1,
                Err(err) => warn!("Could not settle {}: {}", hash, err),
            }
        }

        settled
    }

    async fn is_busy(&self) -> bool {
        let ledger = self.ledger.lock().await;
        match ledger.current_pending() {
            Some(record) => {
                debug!("Busy with {} record {}", record.kind, record.key);
                true
            }
            None => false,
        }
    }

    /// Control state derived from the ledger and the owner check
    pub async fn controls(&self) -> ControlState {
        let busy = self
            .ledger
            .lock()
            .await
            .current_pending()
            .map(|record| record.kind);
        let connected = self.account().await.is_some();
        let claim_visible = self.is_owner().await;

        ControlState {
            busy,
            send_enabled: connected && busy.is_none(),
            claim_visible,
            claim_enabled: claim_visible && busy.is_none(),
        }
    }

    /// History table rows, most recent first
    pub async fn history(&self) -> Vec<TransactionRecord> {
        self.ledger.lock().await.newest_first()
    }

    /// Write the history as CSV, most recent first
    pub async fn export_history<W: Write>(&self, writer: W) -> Result<()> {
        let records = self.history().await;
        let mut csv_writer = csv::Writer::from_writer(writer);

        for record in &records {
            csv_writer.serialize(record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Drop the session history
    pub async fn unmount(&self) {
        self.ledger.lock().await.clear();
    }
}
