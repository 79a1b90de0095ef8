// src/core/types/row.rs

use crate::core::types::Value;
use serde::{Deserialize, Serialize};

/// A stored row: a stable identifier plus an ordered vector of values.
///
/// `values.len() == table.columns.len()` outside a mutating critical
/// section; `row_id` is unique within its table and never recycled, even
/// across a rolled-back insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub row_id: u64,
    pub values: Vec<Value>,
}

impl Row {
    #[must_use]
    pub fn new(row_id: u64, values: Vec<Value>) -> Self {
        Self { row_id, values }
    }

    /// A deep copy, used at every ownership boundary this engine crosses:
    /// undo-log image capture, join projection, and result-set assembly.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}
