use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::models::{ReceiptStatus, RecordKey, TransactionRecord, TxHash, TxKind, TxStatus};

/// Session-scoped transaction history
///
/// Records are kept in the order their calls were initiated and are never
/// removed individually; `clear` drops the whole history when the owning view
/// goes away.
#[derive(Debug)]
pub struct Ledger {
    /// Records in insertion order
    records: Vec<TransactionRecord>,
    /// Next placeholder key to hand out
    next_key: u64,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_key: 1,
        }
    }

    /// Append a pending record for a call that is about to be issued
    pub fn open(&mut self, kind: TxKind, amount: &str) -> RecordKey {
        let key = RecordKey(self.next_key);
        self.next_key = key.0 + 1;

        self.records.push(TransactionRecord::new(key, kind, amount));
        debug!("Opened {} record {} for amount {}", kind, key, amount);

        key
    }

    /// Fill in the transaction hash of the record holding placeholder `key`
    pub fn accept(&mut self, key: RecordKey, hash: TxHash) -> Result<(), LedgerError> {
        if self.find_by_hash(&hash).is_some() {
            warn!("Ignoring hash {} for record {} - already recorded", hash, key);
            return Err(LedgerError::DuplicateHash(hash));
        }

        let record = self.get_mut(key)?;

        if record.external_id.is_some() {
            warn!("Ignoring hash {} for record {} - already accepted", hash, key);
            return Err(LedgerError::AlreadyAccepted(key));
        }

        debug!("Record {} accepted as {}", key, hash);
        record.external_id = Some(hash);
        Ok(())
    }

    /// Mark a pending record failed
    pub fn fail(&mut self, key: RecordKey) -> Result<(), LedgerError> {
        let record = self.get_mut(key)?;
        Self::transition(record, TxStatus::Failed)
    }

    /// Fail every pending record that never received a transaction hash
    ///
    /// Accepted records keep their status; only their receipt decides it.
    /// Returns how many records were failed.
    pub fn fail_unaccepted(&mut self) -> usize {
        let mut failed = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| r.status.is_pending() && r.external_id.is_none())
        {
            record.status = TxStatus::Failed;
            debug!("Record {} failed before acceptance", record.key);
            failed += 1;
        }
        failed
    }

    /// Apply a confirmation signal to the record carrying `hash`
    pub fn settle(&mut self, hash: &TxHash, receipt: ReceiptStatus) -> Result<TxStatus, LedgerError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.external_id.as_ref() == Some(hash))
            .ok_or_else(|| LedgerError::UnknownHash(hash.clone()))?;

        let status = TxStatus::from(receipt);
        Self::transition(record, status)?;
        Ok(status)
    }

    fn transition(record: &mut TransactionRecord, to: TxStatus) -> Result<(), LedgerError> {
        if !record.status.is_pending() {
            warn!(
                "Ignoring {} for record {} - already {}",
                to, record.key, record.status
            );
            return Err(LedgerError::AlreadySettled(record.key));
        }

        debug!("Record {} {} -> {}", record.key, record.status, to);
        record.status = to;
        Ok(())
    }

    fn get_mut(&mut self, key: RecordKey) -> Result<&mut TransactionRecord, LedgerError> {
        self.records
            .iter_mut()
            .find(|r| r.key == key)
            .ok_or(LedgerError::UnknownRecord(key))
    }

    /// Look up a record by placeholder key
    pub fn get(&self, key: RecordKey) -> Option<&TransactionRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Look up a record by transaction hash
    pub fn find_by_hash(&self, hash: &TxHash) -> Option<&TransactionRecord> {
        self.records
            .iter()
            .find(|r| r.external_id.as_ref() == Some(hash))
    }

    /// All records in insertion order
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// All records, most recent first (history table order)
    pub fn newest_first(&self) -> Vec<TransactionRecord> {
        self.records.iter().rev().cloned().collect()
    }

    /// Records still waiting to settle
    pub fn pending(&self) -> Vec<&TransactionRecord> {
        self.records
            .iter()
            .filter(|r| r.status.is_pending())
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.records.iter().any(|r| r.status.is_pending())
    }

    /// Most recently opened record that is still pending
    pub fn current_pending(&self) -> Option<&TransactionRecord> {
        self.records.iter().rev().find(|r| r.status.is_pending())
    }

    /// Hashes of accepted records still waiting for a receipt
    pub fn awaiting_confirmation(&self) -> Vec<TxHash> {
        self.records
            .iter()
            .filter(|r| r.is_awaiting_confirmation())
            .filter_map(|r| r.external_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop the whole history
    pub fn clear(&mut self) {
        debug!("Clearing {} ledger records", self.records.len());
        self.records.clear();
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
