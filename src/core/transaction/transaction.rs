// src/core/transaction/transaction.rs

use crate::core::transaction::undo::UndoEntry;
use crate::core::transaction::IsolationLevel;
use std::collections::HashMap;
use std::time::Instant;

/// Represents the state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is currently active and ongoing.
    Active,
    /// Transaction has been successfully committed.
    Committed,
    /// Transaction has been aborted (treated identically to `RolledBack`).
    Aborted,
    /// Transaction was explicitly rolled back.
    RolledBack,
}

/// A row version stamp: `(table_name, row_id)`.
pub type VersionKey = (String, u64);

/// A single transaction's lifecycle, undo log, and — under
/// `RepeatableRead`/`Serializable` — the version stamps it has observed and
/// written.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: u64,
    pub state: TransactionState,
    pub isolation: IsolationLevel,
    pub log: Vec<UndoEntry>,
    pub start_time: Instant,
    pub end_time: Option<Instant>,
    pub is_autocommit: bool,
    /// Row version observed the first time this transaction read it.
    pub read_versions: HashMap<VersionKey, u64>,
    /// Row version this transaction wrote, checked against the live table
    /// state at commit time.
    pub write_versions: HashMap<VersionKey, u64>,
}

impl Transaction {
    #[must_use]
    pub fn new(id: u64, isolation: IsolationLevel, is_autocommit: bool) -> Self {
        Self {
            id,
            state: TransactionState::Active,
            isolation,
            log: Vec::new(),
            start_time: Instant::now(),
            end_time: None,
            is_autocommit,
            read_versions: HashMap::new(),
            write_versions: HashMap::new(),
        }
    }

    pub fn record_read(&mut self, table: &str, row_id: u64, version: u64) {
        if self.isolation.should_check_conflicts() {
            self.read_versions.entry((table.to_string(), row_id)).or_insert(version);
        }
    }

    pub fn record_write(&mut self, table: &str, row_id: u64, version: u64) {
        if self.isolation.should_check_conflicts() {
            self.write_versions.insert((table.to_string(), row_id), version);
        }
    }

    pub fn finish(&mut self, state: TransactionState) {
        self.state = state;
        self.end_time = Some(Instant::now());
    }
}
