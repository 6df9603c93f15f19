use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::{RecordKey, TxHash, TxKind};

/// Reasons a user-entered amount is refused before any remote call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter an amount")]
    Empty,

    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("Amount must not be negative")]
    Negative,

    #[error("Amount has more than {0} decimal places")]
    TooManyDecimals(u32),

    #[error("Amount is too large")]
    Overflow,

    #[error("Amount must be greater than zero")]
    Zero,

    #[error("Amount exceeds available balance ({requested} > {available})")]
    ExceedsBalance { requested: u128, available: u128 },
}

/// Illegal ledger transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("No record with key {0}")]
    UnknownRecord(RecordKey),

    #[error("No record with transaction hash {0}")]
    UnknownHash(TxHash),

    #[error("Record {0} already has a transaction hash")]
    AlreadyAccepted(RecordKey),

    #[error("Transaction hash {0} is already recorded")]
    DuplicateHash(TxHash),

    #[error("Record {0} is no longer pending")]
    AlreadySettled(RecordKey),
}

/// Errors surfaced by vault actions
#[derive(Error, Debug)]
pub enum VaultError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} call rejected: {}", .message.as_deref().unwrap_or("no reason given"))]
    RemoteCallRejected {
        kind: TxKind,
        message: Option<String>,
    },

    #[error("{kind} step failed: {source}")]
    StepFailed {
        kind: TxKind,
        #[source]
        source: LedgerError,
    },

    #[error("Another transaction is still pending")]
    Busy,

    #[error("No account connected")]
    NotConnected,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
