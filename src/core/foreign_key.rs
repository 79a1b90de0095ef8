// src/core/foreign_key.rs

use crate::core::common::error::DbError;
use crate::core::storage::Table;
use crate::core::types::Value;

/// A `child.column -> parent.column` referential constraint.
///
/// NULL in the child column always satisfies the constraint, matching SQL's
/// standard FK semantics (a NULL foreign key simply has no parent to
/// reference). `on_delete_cascade`/`on_update_cascade` are opt-in flags
/// that let a violating delete or update cascade into the child table
/// instead of being rejected.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub name: String,
    pub child_table: String,
    pub child_column: String,
    pub parent_table: String,
    pub parent_column: String,
    pub on_delete_cascade: bool,
    pub on_update_cascade: bool,
}

impl ForeignKey {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        child_table: impl Into<String>,
        child_column: impl Into<String>,
        parent_table: impl Into<String>,
        parent_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            child_table: child_table.into(),
            child_column: child_column.into(),
            parent_table: parent_table.into(),
            parent_column: parent_column.into(),
            on_delete_cascade: false,
            on_update_cascade: false,
        }
    }

    #[must_use]
    pub fn cascade_on_delete(mut self) -> Self {
        self.on_delete_cascade = true;
        self
    }

    #[must_use]
    pub fn cascade_on_update(mut self) -> Self {
        self.on_update_cascade = true;
        self
    }

    /// Rejects a prospective child-row value that has no matching parent.
    ///
    /// # Errors
    ///
    /// Returns `DbError::FKViolation` if `value` is non-NULL and absent
    /// from `parent_table`'s `parent_column`.
    pub fn enforce_insert(&self, value: &Value, parent_table: &Table) -> Result<(), DbError> {
        if value.is_null() {
            return Ok(());
        }
        let Some(parent_col) = parent_table.schema.get_column_index(&self.parent_column) else {
            return Err(DbError::Internal(format!(
                "foreign key {} references unknown column {}.{}",
                self.name, self.parent_table, self.parent_column
            )));
        };
        let exists = parent_table.rows.iter().any(|r| &r.values[parent_col] == value);
        if exists {
            Ok(())
        } else {
            Err(DbError::FKViolation(format!(
                "value {value} has no matching row in {}.{}",
                self.parent_table, self.parent_column
            )))
        }
    }

    /// Checks whether deleting `parent_value` from the parent table is safe
    /// without cascading: true if no child row currently references it.
    #[must_use]
    pub fn parent_value_is_referenced(&self, parent_value: &Value, child_table: &Table) -> bool {
        let Some(child_col) = child_table.schema.get_column_index(&self.child_column) else {
            return false;
        };
        child_table.rows.iter().any(|r| &r.values[child_col] == parent_value)
    }
}
