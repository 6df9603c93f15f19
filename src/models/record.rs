use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::call::TxHash;

/// Placeholder key assigned to a record before its transaction hash is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordKey(pub u64);

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of remote call a record tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Approve,
    Send,
    Claim,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Approve => "approve",
            TxKind::Send => "send",
            TxKind::Claim => "claim",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record status; only `Pending -> Confirmed` and `Pending -> Failed` are legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TxStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TxStatus::Pending)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Final outcome reported by a confirmation watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Confirmed,
    Reverted,
}

impl From<ReceiptStatus> for TxStatus {
    fn from(receipt: ReceiptStatus) -> Self {
        match receipt {
            ReceiptStatus::Confirmed => TxStatus::Confirmed,
            ReceiptStatus::Reverted => TxStatus::Failed,
        }
    }
}

/// One entry in the transaction history
///
/// Exactly one record exists per initiated remote call. `external_id` is
/// written at most once and `status` leaves `Pending` at most once; both are
/// private so that only the ledger can move them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub key: RecordKey,
    pub kind: TxKind,
    /// Amount as the user typed it
    pub amount: String,
    pub created_at: DateTime<Utc>,
    pub(crate) status: TxStatus,
    pub(crate) external_id: Option<TxHash>,
}

impl TransactionRecord {
    /// Create a new pending record without a transaction hash
    pub fn new(key: RecordKey, kind: TxKind, amount: impl Into<String>) -> Self {
        Self {
            key,
            kind,
            amount: amount.into(),
            created_at: Utc::now(),
            status: TxStatus::Pending,
            external_id: None,
        }
    }

    pub fn status(&self) -> TxStatus {
        self.status
    }

    pub fn external_id(&self) -> Option<&TxHash> {
        self.external_id.as_ref()
    }

    /// Hash for display, `0x0` while unknown
    pub fn display_hash(&self) -> &str {
        self.external_id
            .as_ref()
            .map(TxHash::as_str)
            .unwrap_or(TxHash::PLACEHOLDER)
    }

    /// Pending and already accepted by the remote endpoint
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.status.is_pending() && self.external_id.is_some()
    }
}

// Flat row for CSV history output
#[derive(Serialize)]
struct RecordSerialized<'a> {
    key: u64,
    kind: TxKind,
    amount: &'a str,
    status: TxStatus,
    tx_hash: &'a str,
    created_at: String,
}

impl Serialize for TransactionRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let row = RecordSerialized {
            key: self.key.0,
            kind: self.kind,
            amount: &self.amount,
            status: self.status,
            tx_hash: self.display_hash(),
            created_at: self.created_at.to_rfc3339(),
        };
        row.serialize(serializer)
    }
}
