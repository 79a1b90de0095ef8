// src/core/transaction/isolation.rs

use serde::{Deserialize, Serialize};

/// Transaction isolation level.
///
/// `RepeatableRead` and `Serializable` transactions are enforced with
/// per-row version stamps — see `Transaction::read_versions`/
/// `write_versions` and `TransactionManager::commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// Whether a transaction at this level may observe another, still
    /// `ACTIVE` transaction's uncommitted writes.
    #[must_use]
    pub fn can_read_uncommitted(self) -> bool {
        matches!(self, Self::ReadUncommitted)
    }

    /// Whether a transaction at this level may issue writes. Every level
    /// permits it; the only hard requirement for writing is that the
    /// transaction's `TransactionState` is `Active`, which callers enforce
    /// separately. Kept as its own hook so a future read-only level has
    /// somewhere to say no.
    #[must_use]
    pub fn can_write(self) -> bool {
        true
    }

    /// Whether this level demands conflict detection against concurrent
    /// writers at commit time.
    #[must_use]
    pub fn should_check_conflicts(self) -> bool {
        matches!(self, Self::RepeatableRead | Self::Serializable)
    }
}

impl Default for IsolationLevel {
    fn default() -> Self {
        Self::ReadCommitted
    }
}
