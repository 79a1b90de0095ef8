// src/core/database.rs

use crate::core::common::error::DbError;
use crate::core::common::EngineConfig;
use crate::core::foreign_key::ForeignKey;
use crate::core::join::{JoinExecutor, ResultRow};
use crate::core::statement::{Assignment, JoinCondition, JoinType, Statement, WhereClause};
use crate::core::storage::Table;
use crate::core::transaction::{IsolationLevel, Transaction, TransactionManager, UndoEntry, UndoOp};
use crate::core::types::{ColumnDef, Row, Schema, Value};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type TableHandle = Arc<Mutex<Table>>;

/// An in-memory relational database: a named collection of tables, the
/// foreign keys between them, and the one transaction that may be `ACTIVE`
/// at a time.
///
/// Acquire the `Database`-level lock only long enough to look up or create a
/// table handle, then drop it before touching the table itself — so two
/// operations on different tables never block each other on the catalog
/// lock. Within a single operation, `Database` is always locked before any
/// `Table` it hands back, never the reverse, which rules out lock-order
/// deadlocks between concurrent callers.
pub struct Database {
    pub name: String,
    tables: Mutex<HashMap<String, TableHandle>>,
    foreign_keys: Mutex<HashMap<String, ForeignKey>>,
    transactions: Mutex<TransactionManager>,
    is_open: AtomicBool,
    pub config: EngineConfig,
}

impl Database {
    #[must_use]
    pub fn open(name: impl Into<String>, config: EngineConfig) -> Self {
        let name = name.into();
        info!("opening database {name}");
        Self {
            name,
            tables: Mutex::new(HashMap::new()),
            foreign_keys: Mutex::new(HashMap::new()),
            transactions: Mutex::new(TransactionManager::new()),
            is_open: AtomicBool::new(true),
            config,
        }
    }

    pub fn close(&self) {
        info!("closing database {}", self.name);
        self.is_open.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), DbError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DbError::NotOpen)
        }
    }

    fn check_identifier(&self, name: &str) -> Result<(), DbError> {
        if name.len() > self.config.max_identifier_len {
            return Err(DbError::NameTooLong {
                what: format!("identifier {name}"),
                max: self.config.max_identifier_len,
            });
        }
        Ok(())
    }

    fn check_literal(&self, value: &Value) -> Result<(), DbError> {
        if let Value::Varchar(s) | Value::Text(s) = value {
            if s.len() > self.config.max_literal_len {
                return Err(DbError::NameTooLong {
                    what: "string literal".to_string(),
                    max: self.config.max_literal_len,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.lock().unwrap_or_else(|e| e.into_inner()).contains_key(name)
    }

    fn get_handle(&self, name: &str) -> Result<TableHandle, DbError> {
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::NotFound(name.to_string()))
    }

    fn log_undo(&self, txn: &mut Option<&mut Transaction>, entry: UndoEntry) {
        if let Some(txn) = txn {
            txn.log.push(entry);
        }
    }

    /// Creates an empty table.
    ///
    /// # Errors
    ///
    /// Returns `DbError::DuplicateName` if a table with this name exists,
    /// or `DbError::NameTooLong` if the name exceeds the configured limit.
    pub fn create_table(
        &self,
        table_name: &str,
        columns: Vec<ColumnDef>,
        mut txn: Option<&mut Transaction>,
    ) -> Result<(), DbError> {
        self.check_open()?;
        self.check_identifier(table_name)?;
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        if tables.contains_key(table_name) {
            return Err(DbError::DuplicateName(table_name.to_string()));
        }
        debug!("create table {table_name}");
        let schema = Schema::new(columns);
        tables.insert(table_name.to_string(), Arc::new(Mutex::new(Table::new(table_name, schema))));
        self.log_undo(&mut txn, UndoEntry::create_table(table_name));
        Ok(())
    }

    /// Drops a table. Irreversible: rolling back a transaction that dropped
    /// a table cannot resurrect it.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the table doesn't exist.
    pub fn drop_table(&self, table_name: &str, mut txn: Option<&mut Transaction>) -> Result<(), DbError> {
        self.check_open()?;
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        if tables.remove(table_name).is_none() {
            return Err(DbError::NotFound(table_name.to_string()));
        }
        debug!("drop table {table_name}");
        self.log_undo(&mut txn, UndoEntry::drop_table(table_name));
        Ok(())
    }

    /// Creates a secondary index over one column of an existing table.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the table or column doesn't exist.
    pub fn create_index(
        &self,
        index_name: &str,
        table_name: &str,
        column: &str,
        mut txn: Option<&mut Transaction>,
    ) -> Result<(), DbError> {
        self.check_open()?;
        let handle = self.get_handle(table_name)?;
        let mut table = handle.lock().unwrap_or_else(|e| e.into_inner());
        table.create_index(index_name, column)?;
        self.log_undo(&mut txn, UndoEntry::create_index(table_name, index_name));
        Ok(())
    }

    /// Drops a secondary index.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the table or index doesn't exist.
    pub fn drop_index(
        &self,
        index_name: &str,
        table_name: &str,
        column: &str,
        mut txn: Option<&mut Transaction>,
    ) -> Result<(), DbError> {
        self.check_open()?;
        let handle = self.get_handle(table_name)?;
        let mut table = handle.lock().unwrap_or_else(|e| e.into_inner());
        let col_def = table.drop_index(column)?;
        self.log_undo(&mut txn, UndoEntry::drop_index(table_name, index_name, col_def));
        Ok(())
    }

    pub fn add_foreign_key(&self, fk: ForeignKey) {
        self.foreign_keys.lock().unwrap_or_else(|e| e.into_inner()).insert(fk.name.clone(), fk);
    }

    pub fn drop_foreign_key(&self, name: &str) -> Option<ForeignKey> {
        self.foreign_keys.lock().unwrap_or_else(|e| e.into_inner()).remove(name)
    }

    #[must_use]
    pub fn foreign_keys_on(&self, child_table: &str) -> Vec<ForeignKey> {
        self.foreign_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|fk| fk.child_table == child_table)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn foreign_keys_referencing(&self, parent_table: &str) -> Vec<ForeignKey> {
        self.foreign_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|fk| fk.parent_table == parent_table)
            .cloned()
            .collect()
    }

    /// Starts a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NestedTxn` if one is already `ACTIVE`.
    pub fn begin(&self, isolation: IsolationLevel) -> Result<u64, DbError> {
        self.check_open()?;
        self.transactions.lock().unwrap_or_else(|e| e.into_inner()).begin(isolation, false)
    }

    /// Commits the active transaction, validating version stamps under
    /// `RepeatableRead`/`Serializable` isolation before finalizing.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NoTxn` if none is active, or
    /// `DbError::SerializationFailure` if a row this transaction wrote was
    /// concurrently modified since it was read.
    pub fn commit(&self) -> Result<(), DbError> {
        self.check_open()?;
        let mut mgr = self.transactions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = mgr.current() {
            if current.isolation.should_check_conflicts() {
                for ((table_name, row_id), read_version) in &current.read_versions {
                    if let Ok(handle) = self.get_handle(table_name) {
                        let table = handle.lock().unwrap_or_else(|e| e.into_inner());
                        if table.version_of(*row_id) != *read_version {
                            return Err(DbError::SerializationFailure(format!(
                                "row {row_id} of {table_name} changed since it was read"
                            )));
                        }
                    }
                }
                for ((table_name, row_id), write_version) in &current.write_versions {
                    if let Ok(handle) = self.get_handle(table_name) {
                        let table = handle.lock().unwrap_or_else(|e| e.into_inner());
                        if table.version_of(*row_id) != *write_version {
                            return Err(DbError::SerializationFailure(format!(
                                "row {row_id} of {table_name} was concurrently modified since this transaction wrote it"
                            )));
                        }
                    }
                }
            }
        }
        mgr.commit()?;
        Ok(())
    }

    /// Rolls back the active transaction, replaying its undo log in strict
    /// LIFO order.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NoTxn` if none is active.
    pub fn rollback(&self) -> Result<(), DbError> {
        self.check_open()?;
        let txn = {
            let mut mgr = self.transactions.lock().unwrap_or_else(|e| e.into_inner());
            mgr.take_for_rollback()?
        };
        for entry in txn.log.into_iter().rev() {
            self.undo(entry);
        }
        Ok(())
    }

    fn undo(&self, entry: UndoEntry) {
        match entry.op {
            UndoOp::Insert => {
                if let (Ok(handle), Some(row_id)) = (self.get_handle(&entry.table_name), entry.row_id) {
                    handle.lock().unwrap_or_else(|e| e.into_inner()).remove_row(row_id);
                }
            }
            UndoOp::Update => {
                if let (Ok(handle), Some(before)) = (self.get_handle(&entry.table_name), entry.before_image) {
                    handle.lock().unwrap_or_else(|e| e.into_inner()).replace_row(before.row_id, before.values);
                }
            }
            UndoOp::Delete => {
                if let (Ok(handle), Some(before)) = (self.get_handle(&entry.table_name), entry.before_image) {
                    handle.lock().unwrap_or_else(|e| e.into_inner()).restore_row(before);
                }
            }
            UndoOp::CreateTable => {
                self.tables.lock().unwrap_or_else(|e| e.into_inner()).remove(&entry.table_name);
            }
            UndoOp::DropTable => {
                warn!("cannot undo DROP TABLE {}: table contents are not retained", entry.table_name);
            }
            UndoOp::CreateIndex => {
                if let Some(index_name) = &entry.index_name {
                    if let Ok(handle) = self.get_handle(&entry.table_name) {
                        let mut table = handle.lock().unwrap_or_else(|e| e.into_inner());
                        let _ = table.drop_index(index_name);
                    }
                }
            }
            UndoOp::DropIndex => {
                if let (Some(index_name), Some(col)) = (&entry.index_name, &entry.column_def) {
                    if let Ok(handle) = self.get_handle(&entry.table_name) {
                        let mut table = handle.lock().unwrap_or_else(|e| e.into_inner());
                        let _ = table.create_index(index_name, &col.name);
                    }
                }
            }
        }
    }

    fn enforce_fk_on_insert(&self, table_name: &str, values: &[Value], schema: &Schema) -> Result<(), DbError> {
        for fk in self.foreign_keys_on(table_name) {
            let Some(col_idx) = schema.get_column_index(&fk.child_column) else { continue };
            let parent = self.get_handle(&fk.parent_table)?;
            let parent = parent.lock().unwrap_or_else(|e| e.into_inner());
            fk.enforce_insert(&values[col_idx], &parent)?;
        }
        Ok(())
    }

    /// Deletes every child row referencing `parent_value`, for foreign keys
    /// with `on_delete_cascade` set, returning what was removed from each
    /// table so the caller can log undo entries for them.
    ///
    /// # Errors
    ///
    /// Returns `DbError::FKViolation` if a referencing foreign key does not
    /// cascade and at least one child row references `parent_value`.
    fn cascade_delete(
        &self,
        parent_table: &str,
        parent_value: &Value,
    ) -> Result<Vec<(String, Row)>, DbError> {
        let mut removed = Vec::new();
        for fk in self.foreign_keys_referencing(parent_table) {
            let child = self.get_handle(&fk.child_table)?;
            let mut child_guard = child.lock().unwrap_or_else(|e| e.into_inner());
            let Some(col_idx) = child_guard.schema.get_column_index(&fk.child_column) else { continue };
            let to_remove: Vec<u64> = child_guard
                .rows
                .iter()
                .filter(|r| &r.values[col_idx] == parent_value)
                .map(|r| r.row_id)
                .collect();
            if to_remove.is_empty() {
                continue;
            }
            if !fk.on_delete_cascade {
                return Err(DbError::FKViolation(format!(
                    "{}.{} is still referenced by {}",
                    fk.parent_table, fk.parent_column, fk.child_table
                )));
            }
            for row_id in to_remove {
                if let Some(row) = child_guard.remove_row(row_id) {
                    removed.push((fk.child_table.clone(), row));
                }
            }
        }
        Ok(removed)
    }

    /// Rewrites every child row referencing `old_value` to reference
    /// `new_value` instead, for foreign keys with `on_update_cascade` set,
    /// returning the before/after image of each rewritten row so the caller
    /// can log undo entries for them.
    ///
    /// # Errors
    ///
    /// Returns `DbError::FKViolation` if a referencing foreign key does not
    /// cascade and at least one child row references `old_value`.
    fn cascade_update(
        &self,
        parent_table: &str,
        old_value: &Value,
        new_value: &Value,
    ) -> Result<Vec<(String, Row, Row)>, DbError> {
        let mut rewritten = Vec::new();
        for fk in self.foreign_keys_referencing(parent_table) {
            let child = self.get_handle(&fk.child_table)?;
            let mut child_guard = child.lock().unwrap_or_else(|e| e.into_inner());
            let Some(col_idx) = child_guard.schema.get_column_index(&fk.child_column) else { continue };
            let to_update: Vec<u64> = child_guard
                .rows
                .iter()
                .filter(|r| &r.values[col_idx] == old_value)
                .map(|r| r.row_id)
                .collect();
            if to_update.is_empty() {
                continue;
            }
            if !fk.on_update_cascade {
                return Err(DbError::FKViolation(format!(
                    "{}.{} is still referenced by {}",
                    fk.parent_table, fk.parent_column, fk.child_table
                )));
            }
            for row_id in to_update {
                let Some(before) = child_guard.find_row(row_id).cloned() else { continue };
                let mut new_values = before.values.clone();
                new_values[col_idx] = new_value.clone();
                if let Some(prior) = child_guard.replace_row(row_id, new_values.clone()) {
                    rewritten.push((fk.child_table.clone(), prior, Row::new(row_id, new_values)));
                }
            }
        }
        Ok(rewritten)
    }

    /// Executes one statement, wrapping it in an implicit
    /// begin/commit when autocommit is enabled and no transaction is
    /// active.
    ///
    /// # Errors
    ///
    /// Propagates whatever the underlying operation returns.
    pub fn execute(&self, statement: Statement) -> Result<ExecutionResult, DbError> {
        self.check_open()?;
        if let Statement::Begin { isolation } = statement {
            let id = self.begin(isolation)?;
            return Ok(ExecutionResult::TransactionStarted(id));
        }
        if matches!(statement, Statement::Commit) {
            self.commit()?;
            return Ok(ExecutionResult::Ack);
        }
        if matches!(statement, Statement::Rollback) {
            self.rollback()?;
            return Ok(ExecutionResult::Ack);
        }

        let is_autocommit = self.config.autocommit_enabled
            && self.transactions.lock().unwrap_or_else(|e| e.into_inner()).current().is_none();
        if is_autocommit {
            self.transactions
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .begin(self.config.default_isolation_level, true)?;
        }

        let result = self.execute_dml(statement);

        if is_autocommit {
            if result.is_ok() {
                self.commit()?;
            } else {
                let _ = self.rollback();
            }
        }
        result
    }

    fn with_current_txn<T>(&self, f: impl FnOnce(Option<&mut Transaction>) -> Result<T, DbError>) -> Result<T, DbError> {
        let mut mgr = self.transactions.lock().unwrap_or_else(|e| e.into_inner());
        f(mgr.current_mut())
    }

    /// Like `with_current_txn`, but first checks that the active
    /// transaction's isolation level permits writes.
    fn with_current_txn_write<T>(&self, f: impl FnOnce(Option<&mut Transaction>) -> Result<T, DbError>) -> Result<T, DbError> {
        let mut mgr = self.transactions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(txn) = mgr.current() {
            if !txn.isolation.can_write() {
                return Err(DbError::Unsupported(format!("{:?} transactions cannot write", txn.isolation)));
            }
        }
        f(mgr.current_mut())
    }

    fn execute_dml(&self, statement: Statement) -> Result<ExecutionResult, DbError> {
        match statement {
            Statement::CreateTable { table_name, columns } => {
                self.with_current_txn_write(|txn| self.create_table(&table_name, columns, txn))?;
                Ok(ExecutionResult::Ack)
            }
            Statement::DropTable { table_name } => {
                self.with_current_txn_write(|txn| self.drop_table(&table_name, txn))?;
                Ok(ExecutionResult::Ack)
            }
            Statement::CreateIndex { index_name, table_name, column } => {
                self.with_current_txn_write(|txn| self.create_index(&index_name, &table_name, &column, txn))?;
                Ok(ExecutionResult::Ack)
            }
            Statement::DropIndex { index_name, table_name } => {
                let column = {
                    let handle = self.get_handle(&table_name)?;
                    let table = handle.lock().unwrap_or_else(|e| e.into_inner());
                    table
                        .indexes
                        .values()
                        .find(|i| i.name() == index_name)
                        .map(|i| i.column().to_string())
                        .ok_or_else(|| DbError::NotFound(index_name.clone()))?
                };
                self.with_current_txn_write(|txn| self.drop_index(&index_name, &table_name, &column, txn))?;
                Ok(ExecutionResult::Ack)
            }
            Statement::Insert { table_name, values } => {
                for v in &values {
                    self.check_literal(v)?;
                }
                let handle = self.get_handle(&table_name)?;
                let schema = { handle.lock().unwrap_or_else(|e| e.into_inner()).schema.clone() };
                self.enforce_fk_on_insert(&table_name, &values, &schema)?;
                let (row, version) = {
                    let mut table = handle.lock().unwrap_or_else(|e| e.into_inner());
                    let row = table.insert_row(values)?;
                    let version = table.version_of(row.row_id);
                    (row, version)
                };
                self.with_current_txn_write(|txn| {
                    if let Some(txn) = txn {
                        txn.log.push(UndoEntry::insert(table_name.as_str(), row.clone()));
                        txn.record_write(&table_name, row.row_id, version);
                    }
                    Ok(())
                })?;
                Ok(ExecutionResult::Rows(vec![row]))
            }
            Statement::Select { table_name, r#where } => {
                let handle = self.get_handle(&table_name)?;
                let table = handle.lock().unwrap_or_else(|e| e.into_inner());
                let rows: Vec<Row> = table.matching(r#where.as_ref()).into_iter().cloned().collect();
                drop(table);
                self.with_current_txn(|txn| {
                    if let Some(txn) = txn {
                        if txn.isolation.can_read_uncommitted() {
                            return Ok(());
                        }
                        let handle = self.get_handle(&table_name)?;
                        let table = handle.lock().unwrap_or_else(|e| e.into_inner());
                        for row in &rows {
                            txn.record_read(&table_name, row.row_id, table.version_of(row.row_id));
                        }
                    }
                    Ok(())
                })?;
                Ok(ExecutionResult::Rows(rows))
            }
            Statement::Join { join, join_type, r#where } => {
                Ok(ExecutionResult::Joined(self.run_join(&join, join_type, r#where.as_ref())?))
            }
            Statement::Update { table_name, assignments, r#where } => {
                self.update(&table_name, assignments, r#where)
            }
            Statement::Delete { table_name, r#where } => self.delete(&table_name, r#where),
            Statement::Begin { .. } | Statement::Commit | Statement::Rollback => unreachable!(),
        }
    }

    fn run_join(
        &self,
        join: &JoinCondition,
        join_type: JoinType,
        r#where: Option<&WhereClause>,
    ) -> Result<Vec<ResultRow>, DbError> {
        let left = self.get_handle(&join.left_table)?;
        let right = self.get_handle(&join.right_table)?;
        let left = left.lock().unwrap_or_else(|e| e.into_inner());
        let right = right.lock().unwrap_or_else(|e| e.into_inner());
        JoinExecutor::join(join, join_type, &left, &right, r#where)
            .map_err(DbError::Internal)
    }

    fn update(
        &self,
        table_name: &str,
        assignments: Vec<Assignment>,
        r#where: Option<WhereClause>,
    ) -> Result<ExecutionResult, DbError> {
        let handle = self.get_handle(table_name)?;
        let referencing_fks = self.foreign_keys_referencing(table_name);
        let mut cascaded: Vec<(String, Row, Row)> = Vec::new();
        let updated = {
            let mut table = handle.lock().unwrap_or_else(|e| e.into_inner());
            let targets: Vec<Row> = table.matching(r#where.as_ref()).into_iter().cloned().collect();
            let pk_idx = table.schema.columns.iter().position(|c| c.primary_key);
            let mut updated = Vec::new();
            for before in targets {
                let mut new_values = before.values.clone();
                for assign in &assignments {
                    if let Some(idx) = table.schema.get_column_index(&assign.column) {
                        new_values[idx] = assign.value.clone();
                    }
                }
                if let Some(pk_idx) = pk_idx {
                    let old_pk = &before.values[pk_idx];
                    let new_pk = &new_values[pk_idx];
                    let pk_name = &table.schema.columns[pk_idx].name;
                    if old_pk != new_pk && referencing_fks.iter().any(|fk| &fk.parent_column == pk_name) {
                        cascaded.extend(self.cascade_update(table_name, old_pk, new_pk)?);
                    }
                }
                if let Some(prior) = table.replace_row(before.row_id, new_values.clone()) {
                    let after = Row::new(before.row_id, new_values);
                    updated.push((prior, after.clone(), table.version_of(after.row_id)));
                }
            }
            updated
        };
        self.with_current_txn_write(|txn| {
            if let Some(txn) = txn {
                for (child_table, before, after) in &cascaded {
                    txn.log.push(UndoEntry::update(child_table.as_str(), before.clone(), after.clone()));
                }
                for (before, after, version) in &updated {
                    txn.log.push(UndoEntry::update(table_name, before.clone(), after.clone()));
                    txn.record_write(table_name, after.row_id, *version);
                }
            }
            Ok(())
        })?;
        Ok(ExecutionResult::Rows(updated.into_iter().map(|(_, after, _)| after).collect()))
    }

    fn delete(&self, table_name: &str, r#where: Option<WhereClause>) -> Result<ExecutionResult, DbError> {
        let handle = self.get_handle(table_name)?;
        let mut cascaded: Vec<(String, Row)> = Vec::new();
        let removed = {
            let mut table = handle.lock().unwrap_or_else(|e| e.into_inner());
            let targets: Vec<Row> = table.matching(r#where.as_ref()).into_iter().cloned().collect();
            let pk_idx = table.schema.columns.iter().position(|c| c.primary_key);
            let mut removed = Vec::new();
            for row in targets {
                if let Some(pk_idx) = pk_idx {
                    cascaded.extend(self.cascade_delete(table_name, &row.values[pk_idx])?);
                }
                if table.remove_row(row.row_id).is_some() {
                    removed.push(row);
                }
            }
            removed
        };
        self.with_current_txn_write(|txn| {
            if let Some(txn) = txn {
                for (child_table, row) in &cascaded {
                    txn.log.push(UndoEntry::delete(child_table.as_str(), row.clone()));
                }
                for row in &removed {
                    txn.log.push(UndoEntry::delete(table_name, row.clone()));
                }
            }
            Ok(())
        })?;
        Ok(ExecutionResult::Rows(removed))
    }
}

/// What `Database::execute` hands back for one statement.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    Ack,
    TransactionStarted(u64),
    Rows(Vec<Row>),
    Joined(Vec<ResultRow>),
}
