// src/core/storage/table.rs

use crate::core::common::error::DbError;
use crate::core::statement::{Condition, Operator, WhereClause};
use crate::core::storage::index::Index;
use crate::core::types::{ColumnDef, Row, Schema, Value};
use std::collections::HashMap;

/// A single table: its schema, its rows, and the secondary indexes built
/// over it.
///
/// Row ids are assigned monotonically and never reused, even across
/// deletes. Each row also carries a version stamp bumped on every
/// mutation, consulted by `Transaction::record_read`/`record_write`
/// under `RepeatableRead`/`Serializable` isolation.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
    pub rows: Vec<Row>,
    pub indexes: HashMap<String, Index>,
    next_row_id: u64,
    pub row_versions: HashMap<u64, u64>,
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
            indexes: HashMap::new(),
            next_row_id: 1,
            row_versions: HashMap::new(),
        }
    }

    #[must_use]
    pub fn version_of(&self, row_id: u64) -> u64 {
        self.row_versions.get(&row_id).copied().unwrap_or(0)
    }

    fn bump_version(&mut self, row_id: u64) -> u64 {
        let v = self.row_versions.entry(row_id).or_insert(0);
        *v += 1;
        *v
    }

    /// Validates and stores one new row, advancing every secondary index.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Arity` on a column-count mismatch, or
    /// `DbError::FKViolation` on a NOT NULL/primary-key violation (the
    /// latter reuses the same variant the caller maps foreign key failures
    /// onto, since both are constraint violations rejected before the row
    /// is stored).
    pub fn insert_row(&mut self, values: Vec<Value>) -> Result<Row, DbError> {
        if values.len() != self.schema.columns.len() {
            return Err(DbError::Arity { expected: self.schema.columns.len(), found: values.len() });
        }
        for (col, value) in self.schema.columns.iter().zip(values.iter()) {
            if !col.nullable && value.is_null() {
                return Err(DbError::Internal(format!(
                    "column {} of table {} does not accept NULL",
                    col.name, self.name
                )));
            }
        }
        if let Some(pk_idx) = self.schema.columns.iter().position(|c| c.primary_key) {
            let candidate = &values[pk_idx];
            if self.rows.iter().any(|r| &r.values[pk_idx] == candidate) {
                return Err(DbError::DuplicateName(format!(
                    "primary key {} already exists in table {}",
                    candidate, self.name
                )));
            }
        }
        for (idx, col) in self.schema.columns.iter().enumerate() {
            if col.unique && !col.primary_key {
                let candidate = &values[idx];
                if !candidate.is_null() && self.rows.iter().any(|r| &r.values[idx] == candidate) {
                    return Err(DbError::DuplicateName(format!(
                        "unique constraint on {} violated in table {}",
                        col.name, self.name
                    )));
                }
            }
        }

        let row_id = self.next_row_id;
        self.next_row_id += 1;
        let row = Row::new(row_id, values);
        self.bump_version(row_id);
        for (idx, col) in self.schema.columns.iter().enumerate() {
            if let Some(index) = self.indexes.get_mut(&col.name) {
                index.insert(&row.values[idx], row_id);
            }
        }
        self.rows.push(row.clone());
        Ok(row)
    }

    /// Re-inserts a row with its original id, used by rollback/undo replay.
    /// Bypasses constraint checks: the row previously existed and is being
    /// restored, not newly created.
    pub fn restore_row(&mut self, row: Row) {
        self.bump_version(row.row_id);
        for (idx, col) in self.schema.columns.iter().enumerate() {
            if let Some(index) = self.indexes.get_mut(&col.name) {
                index.insert(&row.values[idx], row.row_id);
            }
        }
        self.next_row_id = self.next_row_id.max(row.row_id + 1);
        self.rows.push(row);
    }

    #[must_use]
    pub fn find_row(&self, row_id: u64) -> Option<&Row> {
        self.rows.iter().find(|r| r.row_id == row_id)
    }

    pub fn remove_row(&mut self, row_id: u64) -> Option<Row> {
        let pos = self.rows.iter().position(|r| r.row_id == row_id)?;
        let row = self.rows.remove(pos);
        self.bump_version(row_id);
        for (idx, col) in self.schema.columns.iter().enumerate() {
            if let Some(index) = self.indexes.get_mut(&col.name) {
                index.remove(&row.values[idx], row_id);
            }
        }
        Some(row)
    }

    pub fn replace_row(&mut self, row_id: u64, new_values: Vec<Value>) -> Option<Row> {
        let pos = self.rows.iter().position(|r| r.row_id == row_id)?;
        let before = self.rows[pos].clone();
        for (idx, col) in self.schema.columns.iter().enumerate() {
            if let Some(index) = self.indexes.get_mut(&col.name) {
                index.remove(&before.values[idx], row_id);
                index.insert(&new_values[idx], row_id);
            }
        }
        self.rows[pos].values = new_values;
        self.bump_version(row_id);
        Some(before)
    }

    #[must_use]
    pub fn scan(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn matching(&self, clause: Option<&WhereClause>) -> Vec<&Row> {
        self.rows.iter().filter(|row| self.row_matches(row, clause)).collect()
    }

    #[must_use]
    pub fn row_matches(&self, row: &Row, clause: Option<&WhereClause>) -> bool {
        let Some(clause) = clause else {
            return true;
        };
        if clause.is_empty() {
            return true;
        }
        clause
            .groups
            .iter()
            .any(|group| group.iter().all(|cond| self.condition_matches(row, cond)))
    }

    fn condition_matches(&self, row: &Row, cond: &Condition) -> bool {
        let Some(col_idx) = self.schema.get_column_index(&cond.column) else {
            return false;
        };
        let actual = &row.values[col_idx];
        match cond.operator {
            Operator::IsNull => actual.is_null(),
            Operator::IsNotNull => !actual.is_null(),
            Operator::In => cond.values.iter().any(|v| v == actual),
            Operator::Eq => cond.value.as_ref().is_some_and(|v| actual == v),
            Operator::NotEq => cond.value.as_ref().is_some_and(|v| actual != v),
            Operator::Lt => cond.value.as_ref().is_some_and(|v| actual < v),
            Operator::Gt => cond.value.as_ref().is_some_and(|v| actual > v),
            Operator::Lte => cond.value.as_ref().is_some_and(|v| actual <= v),
            Operator::Gte => cond.value.as_ref().is_some_and(|v| actual >= v),
            Operator::Like => match cond.value.as_ref() {
                Some(Value::Varchar(p) | Value::Text(p)) => actual.like(p),
                _ => false,
            },
        }
    }

    /// Adds a column to every existing row, filled with `default` (or
    /// `Value::Null` if `None`).
    ///
    /// # Errors
    ///
    /// Returns `DbError::DuplicateName` if the column already exists.
    pub fn add_column(&mut self, col: ColumnDef, default: Value) -> Result<(), DbError> {
        if self.schema.get_column_index(&col.name).is_some() {
            return Err(DbError::DuplicateName(col.name));
        }
        for row in &mut self.rows {
            row.values.push(default.clone());
        }
        self.schema.columns.push(col);
        Ok(())
    }

    /// Drops a column and its index, if any, shifting every row's values.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the column doesn't exist, or
    /// `DbError::CannotDropPK` if it's the primary key.
    pub fn drop_column(&mut self, name: &str) -> Result<(), DbError> {
        let idx = self
            .schema
            .get_column_index(name)
            .ok_or_else(|| DbError::NotFound(name.to_string()))?;
        if self.schema.columns[idx].primary_key {
            return Err(DbError::CannotDropPK);
        }
        self.indexes.remove(name);
        self.schema.columns.remove(idx);
        for row in &mut self.rows {
            row.values.remove(idx);
        }
        Ok(())
    }

    /// Builds a secondary index over `column` from the current row set.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the column doesn't exist, or
    /// `DbError::DuplicateName` if an index with this name already exists.
    pub fn create_index(&mut self, index_name: &str, column: &str) -> Result<(), DbError> {
        let col_idx = self
            .schema
            .get_column_index(column)
            .ok_or_else(|| DbError::NotFound(column.to_string()))?;
        if self.indexes.contains_key(column) {
            return Err(DbError::DuplicateName(index_name.to_string()));
        }
        let mut index = Index::new(index_name, column);
        for row in &self.rows {
            index.insert(&row.values[col_idx], row.row_id);
        }
        self.indexes.insert(column.to_string(), index);
        Ok(())
    }

    /// Removes the secondary index on `column`, returning its `ColumnDef`
    /// so the caller can log an undo entry capable of rebuilding it.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if no such index exists.
    pub fn drop_index(&mut self, column: &str) -> Result<ColumnDef, DbError> {
        self.indexes.remove(column).ok_or_else(|| DbError::NotFound(column.to_string()))?;
        let idx = self.schema.get_column_index(column).expect("indexed column must exist");
        Ok(self.schema.columns[idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DataType;

    fn people() -> Table {
        let schema = Schema::new(vec![
            ColumnDef::new("id", DataType::Integer).primary_key(),
            ColumnDef::new("name", DataType::Varchar),
            ColumnDef::new("age", DataType::Integer).not_null(),
        ]);
        Table::new("people", schema)
    }

    #[test]
    fn insert_assigns_increasing_row_ids() {
        let mut t = people();
        let a = t.insert_row(vec![Value::Integer(1), Value::Varchar("a".into()), Value::Integer(10)])
            .unwrap();
        let b = t.insert_row(vec![Value::Integer(2), Value::Varchar("b".into()), Value::Integer(20)])
            .unwrap();
        assert!(b.row_id > a.row_id);
    }

    #[test]
    fn insert_rejects_duplicate_primary_key() {
        let mut t = people();
        t.insert_row(vec![Value::Integer(1), Value::Varchar("a".into()), Value::Integer(10)]).unwrap();
        let err = t
            .insert_row(vec![Value::Integer(1), Value::Varchar("b".into()), Value::Integer(20)])
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateName(_)));
    }

    #[test]
    fn insert_rejects_null_in_not_null_column() {
        let mut t = people();
        let err = t.insert_row(vec![Value::Integer(1), Value::Varchar("a".into()), Value::Null]).unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
    }

    #[test]
    fn row_id_is_not_reused_after_delete() {
        let mut t = people();
        let a = t.insert_row(vec![Value::Integer(1), Value::Varchar("a".into()), Value::Integer(10)])
            .unwrap();
        t.remove_row(a.row_id);
        let b = t.insert_row(vec![Value::Integer(2), Value::Varchar("b".into()), Value::Integer(20)])
            .unwrap();
        assert!(b.row_id > a.row_id);
    }

    #[test]
    fn matching_filters_by_equality() {
        let mut t = people();
        t.insert_row(vec![Value::Integer(1), Value::Varchar("a".into()), Value::Integer(10)]).unwrap();
        t.insert_row(vec![Value::Integer(2), Value::Varchar("b".into()), Value::Integer(20)]).unwrap();
        let clause = WhereClause::single(Condition::new("age", Operator::Gte, Value::Integer(15)));
        let rows = t.matching(Some(&clause));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values[1], Value::Varchar("b".into()));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let mut t = people();
        t.insert_row(vec![Value::Integer(1), Value::Varchar("a".into()), Value::Integer(10)]).unwrap();
        t.insert_row(vec![Value::Integer(2), Value::Varchar("b".into()), Value::Integer(20)]).unwrap();
        t.insert_row(vec![Value::Integer(3), Value::Varchar("c".into()), Value::Integer(30)]).unwrap();
        // age = 10 AND name = 'a', OR age = 30
        let clause = WhereClause::new()
            .and(Condition::new("age", Operator::Eq, Value::Integer(10)))
            .and(Condition::new("name", Operator::Eq, Value::Varchar("a".into())))
            .or(Condition::new("age", Operator::Eq, Value::Integer(30)));
        let rows = t.matching(Some(&clause));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn drop_pk_column_is_rejected() {
        let mut t = people();
        assert_eq!(t.drop_column("id"), Err(DbError::CannotDropPK));
    }
}
