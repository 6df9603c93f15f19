use std::env;

use crate::error::{Result, VaultError};
use crate::models::Address;
use crate::units::TOKEN_DECIMALS;

pub const ENV_TOKEN_ADDRESS: &str = "VAULT_TOKEN_ADDRESS";
pub const ENV_VAULT_ADDRESS: &str = "VAULT_ADDRESS";
pub const ENV_TOKEN_SYMBOL: &str = "VAULT_TOKEN_SYMBOL";
pub const ENV_DISPLAY_PRECISION: &str = "VAULT_DISPLAY_PRECISION";

/// Contract addresses and display settings for the vault UI
#[derive(Debug, Clone, PartialEq)]
pub struct VaultConfig {
    /// ERC-20 token held by the vault
    pub token_address: Address,
    pub vault_address: Address,
    /// Symbol shown next to balances
    pub token_symbol: String,
    /// Fractional digits shown in balance summaries
    pub display_precision: u32,
}

impl Default for VaultConfig {
    /// First two deployments on a fresh local dev chain
    fn default() -> Self {
        Self {
            token_address: Address::new("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            vault_address: Address::new("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
            token_symbol: "MTK".to_string(),
            display_precision: 4,
        }
    }
}

impl VaultConfig {
    /// Defaults overridden by `VAULT_*` environment variables
    ///
    /// Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `VAULT_*` key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(token) = lookup(ENV_TOKEN_ADDRESS) {
            config.token_address = Address::new(token);
        }
        if let Some(vault) = lookup(ENV_VAULT_ADDRESS) {
            config.vault_address = Address::new(vault);
        }
        if let Some(symbol) = lookup(ENV_TOKEN_SYMBOL) {
            config.token_symbol = symbol.trim().to_string();
        }
        if let Some(precision) = lookup(ENV_DISPLAY_PRECISION) {
            config.display_precision = precision.trim().parse().map_err(|_| {
                VaultError::Config(format!(
                    "{} must be a whole number, got '{}'",
                    ENV_DISPLAY_PRECISION, precision
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.token_address.is_blank() {
            return Err(VaultError::Config(format!("{} is empty", ENV_TOKEN_ADDRESS)));
        }
        if self.vault_address.is_blank() {
            return Err(VaultError::Config(format!("{} is empty", ENV_VAULT_ADDRESS)));
        }
        if self.token_address == self.vault_address {
            return Err(VaultError::Config(
                "token and vault addresses must differ".to_string(),
            ));
        }
        if self.display_precision > TOKEN_DECIMALS {
            return Err(VaultError::Config(format!(
                "{} must be at most {}",
                ENV_DISPLAY_PRECISION, TOKEN_DECIMALS
            )));
        }
        Ok(())
    }
}
