// src/core/transaction/manager.rs

use crate::core::common::error::DbError;
use crate::core::transaction::transaction::{Transaction, TransactionState};
use crate::core::transaction::IsolationLevel;
use log::{debug, info};

/// Begin/commit/rollback bookkeeping and transaction history.
///
/// Pure lifecycle state: at most one transaction is `ACTIVE` per `Database`
/// at any time. Mutating the actual table state is
/// the caller's (`Database`'s) job; this type only tracks which transaction
/// is current, hands out monotonically increasing ids, and retains
/// finished transactions in `history`.
#[derive(Debug, Default)]
pub struct TransactionManager {
    current: Option<Transaction>,
    next_id: u64,
    history: Vec<Transaction>,
}

impl TransactionManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current: None, next_id: 1, history: Vec::new() }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Transaction> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn current_mut(&mut self) -> Option<&mut Transaction> {
        self.current.as_mut()
    }

    #[must_use]
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Starts a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NestedTxn` if a transaction is already `ACTIVE`.
    pub fn begin(
        &mut self,
        isolation: IsolationLevel,
        is_autocommit: bool,
    ) -> Result<u64, DbError> {
        if self.current.is_some() {
            return Err(DbError::NestedTxn);
        }
        let id = self.next_id;
        self.next_id += 1;
        debug!("begin transaction {id} (isolation={isolation:?}, autocommit={is_autocommit})");
        self.current = Some(Transaction::new(id, isolation, is_autocommit));
        Ok(id)
    }

    /// Finalizes the current transaction as `Committed` and moves it into
    /// history.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NoTxn` if no transaction is `ACTIVE`.
    pub fn commit(&mut self) -> Result<Transaction, DbError> {
        let mut txn = self.current.take().ok_or(DbError::NoTxn)?;
        txn.finish(TransactionState::Committed);
        info!("commit transaction {}", txn.id);
        self.history.push(txn.clone());
        Ok(txn)
    }

    /// Takes the current transaction out so its undo log can be replayed by
    /// the caller, marking it `RolledBack` and moving it into history.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NoTxn` if no transaction is `ACTIVE`.
    pub fn take_for_rollback(&mut self) -> Result<Transaction, DbError> {
        let mut txn = self.current.take().ok_or(DbError::NoTxn)?;
        txn.finish(TransactionState::RolledBack);
        info!("rollback transaction {}", txn.id);
        self.history.push(txn.clone());
        Ok(txn)
    }
}
