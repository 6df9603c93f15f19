use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Result, VaultError};
use crate::gateway::ContractGateway;
use crate::ledger::Ledger;
use crate::models::{Address, ContractCall, RecordKey, TxHash, TxKind};

/// One remote call in a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: TxKind,
    pub call: ContractCall,
}

/// Ordered list of dependent remote calls for a single user action
#[derive(Debug, Clone)]
pub struct StepSequence {
    /// Amount as typed by the user, copied into every ledger record
    amount: String,
    steps: Vec<Step>,
}

impl StepSequence {
    pub fn new(amount: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            amount: amount.into(),
            steps,
        }
    }

    /// `approve(vault, amount)` on the token, then `sendTokens(amount)` on the vault
    pub fn deposit(token: &Address, vault: &Address, raw: u128, amount_text: &str) -> Self {
        Self::new(
            amount_text,
            vec![
                Step {
                    kind: TxKind::Approve,
                    call: ContractCall::approve(token, vault, raw),
                },
                Step {
                    kind: TxKind::Send,
                    call: ContractCall::send_tokens(vault, raw),
                },
            ],
        )
    }

    /// Single `claimTokens(amount)` on the vault
    pub fn claim(vault: &Address, raw: u128, amount_text: &str) -> Self {
        Self::new(
            amount_text,
            vec![Step {
                kind: TxKind::Claim,
                call: ContractCall::claim_tokens(vault, raw),
            }],
        )
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Runs a [`StepSequence`] against a gateway, recording every call in the ledger
///
/// # Ordering
///
/// Step *n+1* is only issued after step *n*'s write has been accepted. Each
/// step opens its ledger record before the call goes out, so a record exists
/// for every initiated call even if the gateway never answers.
///
/// # Failure policy
///
/// When a write fails the remaining steps are never issued. The failing
/// record, and any other pending record that never got a hash, becomes
/// `Failed`. Records of earlier accepted steps are left as they are; only a
/// receipt can settle them. A rejected write surfaces as
/// [`VaultError::RemoteCallRejected`], a ledger refusal of the returned hash
/// as [`VaultError::StepFailed`]; both name the kind of the failing step.
///
/// # Gating
///
/// A sequence refuses to start with [`VaultError::Busy`] while the ledger
/// still holds a pending record. The check and the opening of the first
/// record happen under one lock, so two concurrent starts cannot both pass.
///
/// The ledger lock is never held while waiting on the gateway.
///
/// # Example
///
/// ```
/// use tokio::sync::Mutex;
/// use vault_console::gateway::StubGateway;
/// use vault_console::ledger::Ledger;
/// use vault_console::models::Address;
/// use vault_console::sequencer::{Sequencer, StepSequence};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let token = Address::new("0xaa");
/// let vault = Address::new("0xbb");
/// let user = Address::new("0xcc");
///
/// let gateway = StubGateway::new(token.clone(), vault.clone());
/// gateway.mint(&user, 10);
/// let ledger = Mutex::new(Ledger::new());
///
/// let sequence = StepSequence::deposit(&token, &vault, 10, "0.00000000000000001");
/// let hashes = Sequencer::new(&gateway, &ledger)
///     .run(&user, &sequence, |_, _| {})
///     .await
///     .unwrap();
///
/// assert_eq!(hashes.len(), 2);
/// assert_eq!(ledger.lock().await.len(), 2);
/// # }
/// ```
pub struct Sequencer<'a, G: ContractGateway + ?Sized> {
    gateway: &'a G,
    ledger: &'a Mutex<Ledger>,
}

impl<'a, G: ContractGateway + ?Sized> Sequencer<'a, G> {
    pub fn new(gateway: &'a G, ledger: &'a Mutex<Ledger>) -> Self {
        Self { gateway, ledger }
    }

    /// Issue every step of `sequence` in order on behalf of `sender`
    ///
    /// `on_accepted` is called after each accepted step with its kind and hash.
    /// Returns the hashes of all steps, in order.
    pub async fn run<F>(
        &self,
        sender: &Address,
        sequence: &StepSequence,
        mut on_accepted: F,
    ) -> Result<Vec<TxHash>>
    where
        F: FnMut(TxKind, &TxHash),
    {
        let mut hashes = Vec::with_capacity(sequence.len());

        for (index, step) in sequence.steps().iter().enumerate() {
            let key = {
                let mut ledger = self.ledger.lock().await;
                if index == 0 && ledger.has_pending() {
                    warn!("Refusing {} - another transaction is pending", step.kind);
                    return Err(VaultError::Busy);
                }
                ledger.open(step.kind, sequence.amount())
            };

            debug!(
                "Step {}/{} ({}): issuing {}",
                index + 1,
                sequence.len(),
                step.kind,
                step.call
            );

            match self.gateway.write(sender, &step.call).await {
                Ok(hash) => {
                    {
                        let mut ledger = self.ledger.lock().await;
                        if let Err(source) = ledger.accept(key, hash.clone()) {
                            Self::abandon(&mut ledger, key);
                            return Err(VaultError::StepFailed {
                                kind: step.kind,
                                source,
                            });
                        }
                    }

                    info!("{} accepted as {}", step.kind, hash);
                    on_accepted(step.kind, &hash);
                    hashes.push(hash);
                }
                Err(err) => {
                    let failed = Self::abandon(&mut *self.ledger.lock().await, key);
                    warn!(
                        "{} rejected ({} record(s) failed, {} step(s) skipped): {}",
                        step.kind,
                        failed,
                        sequence.len() - index - 1,
                        err
                    );

                    return Err(VaultError::RemoteCallRejected {
                        kind: step.kind,
                        message: err.short_message().map(str::to_string),
                    });
                }
            }
        }

        Ok(hashes)
    }

    /// Fail the record of the step that broke, then any other unaccepted record
    fn abandon(ledger: &mut Ledger, key: RecordKey) -> usize {
        let failed = match ledger.fail(key) {
            Ok(()) => 1,
            Err(err) => {
                warn!("Could not fail record {}: {}", key, err);
                0
            }
        };
        failed + ledger.fail_unaccepted()
    }
}
