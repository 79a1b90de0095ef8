// src/core/transaction/undo.rs

use crate::core::types::{ColumnDef, Row};

/// The operation an undo-log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOp {
    Insert,
    Update,
    Delete,
    CreateTable,
    DropTable,
    CreateIndex,
    DropIndex,
}

/// One entry in a transaction's undo log.
///
/// Before/after images are deep copies owned exclusively by the entry.
/// Rollback walks a transaction's log in reverse and applies the inverse
/// of each recorded operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub op: UndoOp,
    pub table_name: String,
    pub row_id: Option<u64>,
    pub before_image: Option<Row>,
    pub after_image: Option<Row>,
    pub index_name: Option<String>,
    pub column_def: Option<ColumnDef>,
}

impl UndoEntry {
    #[must_use]
    pub fn insert(table_name: impl Into<String>, after: Row) -> Self {
        Self {
            op: UndoOp::Insert,
            table_name: table_name.into(),
            row_id: Some(after.row_id),
            before_image: None,
            after_image: Some(after),
            index_name: None,
            column_def: None,
        }
    }

    #[must_use]
    pub fn update(table_name: impl Into<String>, before: Row, after: Row) -> Self {
        Self {
            op: UndoOp::Update,
            table_name: table_name.into(),
            row_id: Some(before.row_id),
            before_image: Some(before),
            after_image: Some(after),
            index_name: None,
            column_def: None,
        }
    }

    #[must_use]
    pub fn delete(table_name: impl Into<String>, before: Row) -> Self {
        Self {
            op: UndoOp::Delete,
            table_name: table_name.into(),
            row_id: Some(before.row_id),
            before_image: Some(before),
            after_image: None,
            index_name: None,
            column_def: None,
        }
    }

    #[must_use]
    pub fn create_table(table_name: impl Into<String>) -> Self {
        Self {
            op: UndoOp::CreateTable,
            table_name: table_name.into(),
            row_id: None,
            before_image: None,
            after_image: None,
            index_name: None,
            column_def: None,
        }
    }

    #[must_use]
    pub fn drop_table(table_name: impl Into<String>) -> Self {
        Self {
            op: UndoOp::DropTable,
            table_name: table_name.into(),
            row_id: None,
            before_image: None,
            after_image: None,
            index_name: None,
            column_def: None,
        }
    }

    #[must_use]
    pub fn create_index(table_name: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            op: UndoOp::CreateIndex,
            table_name: table_name.into(),
            row_id: None,
            before_image: None,
            after_image: None,
            index_name: Some(index_name.into()),
            column_def: None,
        }
    }

    #[must_use]
    pub fn drop_index(
        table_name: impl Into<String>,
        index_name: impl Into<String>,
        column_def: ColumnDef,
    ) -> Self {
        Self {
            op: UndoOp::DropIndex,
            table_name: table_name.into(),
            row_id: None,
            before_image: None,
            after_image: None,
            index_name: Some(index_name.into()),
            column_def: Some(column_def),
        }
    }
}
