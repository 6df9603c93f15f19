use serde::Deserialize;

/// Action in a scripted vault session
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    /// Set the vault owner reported by the gateway
    Owner,
    /// Connect the given account
    Connect,
    Disconnect,
    /// Credit tokens to the connected account
    Mint,
    Deposit,
    Claim,
    /// Make the next write fail with the given message
    Reject,
    /// Make the next accepted write revert on confirmation
    Revert,
    /// Wait for receipts of every accepted pending transaction
    Confirm,
}

/// Session script row
#[derive(Debug, Deserialize)]
pub struct SessionCommand {
    pub action: SessionAction,
    #[serde(default, deserialize_with = "deserialize_optional_arg")]
    pub arg: Option<String>,
}

/// Treat empty strings as a missing argument
fn deserialize_optional_arg<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}
