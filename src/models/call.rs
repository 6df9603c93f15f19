use std::fmt;

use serde::{Deserialize, Serialize};

use super::address::Address;

/// Contract methods the vault UI knows how to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// ERC-20 `balanceOf(holder)`
    BalanceOf,
    /// Vault `owner()`
    Owner,
    /// ERC-20 `approve(spender, amount)`
    Approve,
    /// Vault `sendTokens(amount)`
    SendTokens,
    /// Vault `claimTokens(amount)`
    ClaimTokens,
}

impl Method {
    /// On-chain function name
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::BalanceOf => "balanceOf",
            Method::Owner => "owner",
            Method::Approve => "approve",
            Method::SendTokens => "sendTokens",
            Method::ClaimTokens => "claimTokens",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument passed to a contract method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Address(Address),
    /// Raw token amount in the smallest unit
    Amount(u128),
}

impl fmt::Display for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArg::Address(address) => write!(f, "{}", address),
            CallArg::Amount(amount) => write!(f, "{}", amount),
        }
    }
}

/// Value returned by a contract read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallValue {
    Amount(u128),
    Address(Address),
}

impl CallValue {
    pub fn as_amount(&self) -> Option<u128> {
        match self {
            CallValue::Amount(amount) => Some(*amount),
            CallValue::Address(_) => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            CallValue::Address(address) => Some(address),
            CallValue::Amount(_) => None,
        }
    }
}

/// A single read or write against a contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: Address,
    pub method: Method,
    pub args: Vec<CallArg>,
}

impl ContractCall {
    pub fn balance_of(token: &Address, holder: &Address) -> Self {
        Self {
            contract: token.clone(),
            method: Method::BalanceOf,
            args: vec![CallArg::Address(holder.clone())],
        }
    }

    pub fn owner(vault: &Address) -> Self {
        Self {
            contract: vault.clone(),
            method: Method::Owner,
            args: Vec::new(),
        }
    }

    pub fn approve(token: &Address, spender: &Address, amount: u128) -> Self {
        Self {
            contract: token.clone(),
            method: Method::Approve,
            args: vec![CallArg::Address(spender.clone()), CallArg::Amount(amount)],
        }
    }

    pub fn send_tokens(vault: &Address, amount: u128) -> Self {
        Self {
            contract: vault.clone(),
            method: Method::SendTokens,
            args: vec![CallArg::Amount(amount)],
        }
    }

    pub fn claim_tokens(vault: &Address, amount: u128) -> Self {
        Self {
            contract: vault.clone(),
            method: Method::ClaimTokens,
            args: vec![CallArg::Amount(amount)],
        }
    }

    /// Argument at `index` if it is an amount
    pub fn amount_arg(&self, index: usize) -> Option<u128> {
        match self.args.get(index) {
            Some(CallArg::Amount(amount)) => Some(*amount),
            _ => None,
        }
    }

    /// Argument at `index` if it is an address
    pub fn address_arg(&self, index: usize) -> Option<&Address> {
        match self.args.get(index) {
            Some(CallArg::Address(address)) => Some(address),
            _ => None,
        }
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.contract, self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

/// Transaction hash returned once a write has been accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Shown in history rows until the real hash is known
    pub const PLACEHOLDER: &'static str = "0x0";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
