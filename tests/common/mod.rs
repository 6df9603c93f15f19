#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use vault_console::config::VaultConfig;
use vault_console::controller::VaultController;
use vault_console::gateway::{ConfirmationWatcher, ContractGateway, GatewayError, StubGateway};
use vault_console::models::{Address, CallValue, ContractCall, ReceiptStatus, TxHash};
use vault_console::notify::MemoryNotifier;
use vault_console::units::ONE_TOKEN;

pub const USER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const OWNER: &str = "0xABCDEF0000000000000000000000000000000001";

/// Whole tokens in raw units
pub fn tokens(whole: u128) -> u128 {
    whole * ONE_TOKEN
}

pub fn user() -> Address {
    Address::new(USER)
}

pub fn owner() -> Address {
    Address::new(OWNER)
}

pub fn token_address() -> Address {
    VaultConfig::default().token_address
}

pub fn vault_address() -> Address {
    VaultConfig::default().vault_address
}

pub fn stub_gateway() -> StubGateway {
    StubGateway::new(token_address(), vault_address())
}

/// Controller wired to a stub gateway and an in-memory notifier
pub struct Harness<G = StubGateway> {
    pub controller: VaultController<G, MemoryNotifier>,
    pub gateway: Arc<G>,
    pub notifier: Arc<MemoryNotifier>,
}

pub fn harness() -> Harness {
    harness_with(stub_gateway())
}

pub fn harness_with<G>(gateway: G) -> Harness<G>
where
    G: ContractGateway + ConfirmationWatcher,
{
    let gateway = Arc::new(gateway);
    let notifier = Arc::new(MemoryNotifier::new());
    let controller = VaultController::new(
        VaultConfig::default(),
        Arc::clone(&gateway),
        Arc::clone(&notifier),
    );
    Harness {
        controller,
        gateway,
        notifier,
    }
}

/// Harness with `account` connected and holding `wallet` whole tokens
pub async fn connected(account: Address, wallet: u128) -> Harness {
    let h = harness();
    h.gateway.mint(&account, tokens(wallet));
    h.controller.connect(account).await;
    h
}

/// Harness where the owner is connected and the vault holds `vault` whole tokens
pub async fn owner_with_vault(vault: u128) -> Harness {
    let h = harness();
    h.gateway.set_owner(Some(owner()));
    h.gateway.mint(&vault_address(), tokens(vault));
    h.controller.connect(owner()).await;
    h
}

/// Stub gateway whose writes wait for `release` after signalling `started`
pub struct GatedGateway {
    pub inner: StubGateway,
    pub started: Notify,
    pub release: Notify,
}

impl GatedGateway {
    pub fn new(inner: StubGateway) -> Self {
        Self {
            inner,
            started: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl ContractGateway for GatedGateway {
    async fn read(&self, call: &ContractCall) -> Result<CallValue, GatewayError> {
        self.inner.read(call).await
    }

    async fn write(&self, sender: &Address, call: &ContractCall) -> Result<TxHash, GatewayError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.write(sender, call).await
    }
}

#[async_trait]
impl ConfirmationWatcher for GatedGateway {
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<ReceiptStatus, GatewayError> {
        self.inner.wait_for_receipt(hash).await
    }
}

/// Stub gateway that hands every write the same transaction hash
pub struct RepeatingHashGateway {
    pub inner: StubGateway,
}

#[async_trait]
impl ContractGateway for RepeatingHashGateway {
    async fn read(&self, call: &ContractCall) -> Result<CallValue, GatewayError> {
        self.inner.read(call).await
    }

    async fn write(&self, sender: &Address, call: &ContractCall) -> Result<TxHash, GatewayError> {
        self.inner.write(sender, call).await?;
        Ok(TxHash::new(format!("0x{:064x}", 1)))
    }
}

#[async_trait]
impl ConfirmationWatcher for RepeatingHashGateway {
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<ReceiptStatus, GatewayError> {
        self.inner.wait_for_receipt(hash).await
    }
}

/// Build a session script from `(action, arg)` pairs
pub fn build_session(rows: &[(&str, &str)]) -> String {
    let mut csv = String::from("action,arg\n");

    for (action, arg) in rows {
        csv.push_str(&format!("{},{}\n", action, arg));
    }

    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_scales_to_raw() {
        assert_eq!(tokens(2), 2_000_000_000_000_000_000);
    }

    #[test]
    fn test_build_session() {
        let csv = build_session(&[("connect", USER), ("deposit", "10"), ("confirm", "")]);

        assert!(csv.starts_with("action,arg\n"));
        assert!(csv.contains("deposit,10\n"));
        assert!(csv.contains("confirm,\n"));
    }
}
