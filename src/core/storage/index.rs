// src/core/storage/index.rs

use crate::core::types::Value;
use std::collections::BTreeMap;

/// An ordered, in-memory secondary index over a single column.
///
/// Maps each distinct `Value` seen in the indexed column to the set of row
/// ids holding it. On-disk storage is out of scope, so there is no
/// `file_path`/`save`/`load` here — an index is rebuilt from `Table::rows`
/// whenever it's needed fresh.
#[derive(Debug, Clone, Default)]
pub struct Index {
    name: String,
    column: String,
    entries: BTreeMap<Value, Vec<u64>>,
}

impl Index {
    #[must_use]
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self { name: name.into(), column: column.into(), entries: BTreeMap::new() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn insert(&mut self, value: &Value, row_id: u64) {
        let ids = self.entries.entry(value.clone()).or_default();
        if !ids.contains(&row_id) {
            ids.push(row_id);
        }
    }

    pub fn remove(&mut self, value: &Value, row_id: u64) {
        if let Some(ids) = self.entries.get_mut(value) {
            ids.retain(|id| *id != row_id);
            if ids.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    #[must_use]
    pub fn find(&self, value: &Value) -> &[u64] {
        self.entries.get(value).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_find_returns_row_id() {
        let mut idx = Index::new("idx_name", "name");
        idx.insert(&Value::Varchar("alice".into()), 1);
        idx.insert(&Value::Varchar("alice".into()), 2);
        assert_eq!(idx.find(&Value::Varchar("alice".into())), &[1, 2]);
    }

    #[test]
    fn remove_drops_row_id_and_empty_entry() {
        let mut idx = Index::new("idx_name", "name");
        idx.insert(&Value::Varchar("alice".into()), 1);
        idx.remove(&Value::Varchar("alice".into()), 1);
        assert!(idx.find(&Value::Varchar("alice".into())).is_empty());
        assert!(idx.is_empty());
    }

    #[test]
    fn duplicate_insert_is_idempotent() {
        let mut idx = Index::new("idx_name", "name");
        idx.insert(&Value::Integer(1), 7);
        idx.insert(&Value::Integer(1), 7);
        assert_eq!(idx.find(&Value::Integer(1)), &[7]);
    }
}
