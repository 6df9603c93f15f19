use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Address, CallValue, ContractCall, Method, ReceiptStatus, TxHash};

/// Failures reported by the contract-call gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The user declined the request in their wallet
    #[error("User rejected the request: {0}")]
    Rejected(String),

    /// Execution reverted on chain
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// Network or provider failure
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected arguments for {0}")]
    InvalidArguments(Method),

    #[error("Unexpected return value from {0}")]
    UnexpectedValue(Method),

    #[error("Unknown transaction {0}")]
    UnknownTransaction(TxHash),
}

impl GatewayError {
    /// Provider message suitable for a notification, when there is one
    pub fn short_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected(msg)
            | GatewayError::Reverted(msg)
            | GatewayError::Transport(msg) => Some(msg.trim()).filter(|msg| !msg.is_empty()),
            _ => None,
        }
    }
}

/// Remote contract-call gateway
///
/// `write` resolves once the call has been accepted by the remote endpoint
/// and returns its transaction hash; it does not wait for finality. It fails
/// when the user declines the request or execution cannot proceed.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Call a view method
    async fn read(&self, call: &ContractCall) -> Result<CallValue, GatewayError>;

    /// Submit a state-changing call on behalf of `sender`
    async fn write(&self, sender: &Address, call: &ContractCall) -> Result<TxHash, GatewayError>;
}

/// Reports the final outcome of an accepted transaction
#[async_trait]
pub trait ConfirmationWatcher: Send + Sync {
    /// Wait until `hash` is mined and report whether it succeeded
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<ReceiptStatus, GatewayError>;
}

#[derive(Debug)]
struct StubState {
    owner: Option<Address>,
    balances: HashMap<Address, u128>,
    /// (owner, spender) -> allowance
    allowances: HashMap<(Address, Address), u128>,
    rejections: VecDeque<String>,
    revert_next: bool,
    issued: HashSet<TxHash>,
    reverted: HashSet<TxHash>,
    writes: Vec<ContractCall>,
    nonce: u64,
}

/// In-memory gateway for sessions and tests
///
/// Tracks just enough token state for the vault UI to read back what it
/// wrote: balances, allowances and the vault owner. Failures are scripted
/// with [`StubGateway::reject_next`] and [`StubGateway::revert_next`].
///
/// # Example
///
/// ```
/// use vault_console::gateway::StubGateway;
/// use vault_console::models::Address;
///
/// let token = Address::new("0x00000000000000000000000000000000000000aa");
/// let vault = Address::new("0x00000000000000000000000000000000000000bb");
/// let gateway = StubGateway::new(token, vault.clone());
///
/// gateway.mint(&vault, 50);
/// assert_eq!(gateway.balance(&vault), 50);
/// ```
#[derive(Debug)]
pub struct StubGateway {
    token: Address,
    vault: Address,
    state: Mutex<StubState>,
}

impl StubGateway {
    /// Create a stub with no balances and no owner
    pub fn new(token: Address, vault: Address) -> Self {
        Self {
            token,
            vault,
            state: Mutex::new(StubState {
                owner: None,
                balances: HashMap::new(),
                allowances: HashMap::new(),
                rejections: VecDeque::new(),
                revert_next: false,
                issued: HashSet::new(),
                reverted: HashSet::new(),
                writes: Vec::new(),
                nonce: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the address `owner()` reports
    pub fn set_owner(&self, owner: Option<Address>) {
        self.state().owner = owner;
    }

    /// Credit raw tokens to `holder`
    pub fn mint(&self, holder: &Address, amount: u128) {
        let mut state = self.state();
        let balance = state.balances.entry(holder.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance(&self, holder: &Address) -> u128 {
        self.state().balances.get(holder).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.state()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Fail the next write with `message`, as a wallet does when the user declines
    pub fn reject_next(&self, message: impl Into<String>) {
        self.state().rejections.push_back(message.into());
    }

    /// Accept the next write but report it reverted once mined
    pub fn revert_next(&self) {
        self.state().revert_next = true;
    }

    /// Every write submitted so far, including rejected ones
    pub fn writes(&self) -> Vec<ContractCall> {
        self.state().writes.clone()
    }

    fn apply(&self, state: &mut StubState, sender: &Address, call: &ContractCall) -> Result<(), GatewayError> {
        let amount = |index| {
            call.amount_arg(index)
                .ok_or(GatewayError::InvalidArguments(call.method))
        };

        match call.method {
            Method::Approve if call.contract == self.token => {
                let spender = call
                    .address_arg(0)
                    .ok_or(GatewayError::InvalidArguments(call.method))?;
                let amount = amount(1)?;
                state
                    .allowances
                    .insert((sender.clone(), spender.clone()), amount);
                Ok(())
            }
            Method::SendTokens if call.contract == self.vault => {
                let amount = amount(0)?;
                let key = (sender.clone(), self.vault.clone());
                let allowance = state.allowances.get(&key).copied().unwrap_or(0);
                if allowance < amount {
                    return Err(GatewayError::Reverted(
                        "ERC20: insufficient allowance".to_string(),
                    ));
                }
                transfer(state, sender, &self.vault, amount)?;
                state.allowances.insert(key, allowance - amount);
                Ok(())
            }
            Method::ClaimTokens if call.contract == self.vault => {
                let amount = amount(0)?;
                if state.owner.as_ref() != Some(sender) {
                    return Err(GatewayError::Reverted(
                        "Ownable: caller is not the owner".to_string(),
                    ));
                }
                transfer(state, &self.vault, sender, amount)
            }
            _ => Err(GatewayError::Transport(format!(
                "{} is not a supported write",
                call
            ))),
        }
    }
}

fn transfer(state: &mut StubState, from: &Address, to: &Address, amount: u128) -> Result<(), GatewayError> {
    let available = state.balances.get(from).copied().unwrap_or(0);
    if available < amount {
        return Err(GatewayError::Reverted(
            "ERC20: transfer amount exceeds balance".to_string(),
        ));
    }
    state.balances.insert(from.clone(), available - amount);
    let credited = state.balances.entry(to.clone()).or_insert(0);
    *credited = credited.saturating_add(amount);
    Ok(())
}

#[async_trait]
impl ContractGateway for StubGateway {
    async fn read(&self, call: &ContractCall) -> Result<CallValue, GatewayError> {
        let state = self.state();

        match call.method {
            Method::BalanceOf if call.contract == self.token => {
                let holder = call
                    .address_arg(0)
                    .ok_or(GatewayError::InvalidArguments(call.method))?;
                Ok(CallValue::Amount(
                    state.balances.get(holder).copied().unwrap_or(0),
                ))
            }
            Method::Owner if call.contract == self.vault => state
                .owner
                .clone()
                .map(CallValue::Address)
                .ok_or_else(|| GatewayError::Transport("owner() returned no data".to_string())),
            _ => Err(GatewayError::Transport(format!(
                "{} is not a supported read",
                call
            ))),
        }
    }

    async fn write(&self, sender: &Address, call: &ContractCall) -> Result<TxHash, GatewayError> {
        let mut state = self.state();
        state.writes.push(call.clone());

        if let Some(message) = state.rejections.pop_front() {
            warn!("Stub rejecting {} from {}: {}", call, sender, message);
            return Err(GatewayError::Rejected(message));
        }

        let reverts = std::mem::take(&mut state.revert_next);
        if !reverts {
            self.apply(&mut state, sender, call)?;
        }

        state.nonce += 1;
        let hash = TxHash::new(format!("0x{:064x}", state.nonce));
        state.issued.insert(hash.clone());
        if reverts {
            state.reverted.insert(hash.clone());
        }

        info!("Stub accepted {} from {} as {}", call, sender, hash);
        Ok(hash)
    }
}

#[async_trait]
impl ConfirmationWatcher for StubGateway {
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<ReceiptStatus, GatewayError> {
        let state = self.state();

        if !state.issued.contains(hash) {
            return Err(GatewayError::UnknownTransaction(hash.clone()));
        }

        let receipt = if state.reverted.contains(hash) {
            ReceiptStatus::Reverted
        } else {
            ReceiptStatus::Confirmed
        };
        debug!("Stub receipt for {}: {:?}", hash, receipt);
        Ok(receipt)
    }
}
