// src/core/common/error.rs

use std::fmt;

/// The error taxonomy for the storage and transaction engine.
///
/// Mirrors the failure modes a caller-facing collaborator (parser, shell)
/// needs to distinguish: lookup/validation failures are returned directly,
/// never printed. No `thiserror` — manual `Display`/`Error` impls, matching
/// the rest of this crate's error types.
#[derive(Debug, Clone, PartialEq)]
pub enum DbError {
    /// DDL/DML attempted on a closed database.
    NotOpen,
    /// A table, column, index, or constraint could not be found.
    NotFound(String),
    /// A table, column, index, or constraint with this name already exists.
    DuplicateName(String),
    /// The number of supplied values did not match the number of columns.
    Arity { expected: usize, found: usize },
    /// A foreign key constraint rejected the mutation.
    FKViolation(String),
    /// `begin` was called while a transaction was already `ACTIVE`.
    NestedTxn,
    /// `commit`/`rollback` was called with no `ACTIVE` transaction.
    NoTxn,
    /// An attempt was made to drop the primary-key column.
    CannotDropPK,
    /// The requested operation is not supported (e.g. undoing `DROP TABLE`).
    Unsupported(String),
    /// An identifier or literal exceeded its bounded length.
    NameTooLong { what: String, max: usize },
    /// A write conflicted with another transaction under `REPEATABLE READ`
    /// or `SERIALIZABLE` isolation.
    SerializationFailure(String),
    /// An internal invariant was violated (poisoned lock and similar
    /// conditions a caller cannot recover from).
    Internal(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOpen => write!(f, "database is not open"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::DuplicateName(name) => write!(f, "duplicate name: {name}"),
            Self::Arity { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
            Self::FKViolation(msg) => write!(f, "foreign key violation: {msg}"),
            Self::NestedTxn => write!(f, "a transaction is already active"),
            Self::NoTxn => write!(f, "no active transaction"),
            Self::CannotDropPK => write!(f, "cannot drop the primary key column"),
            Self::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Self::NameTooLong { what, max } => {
                write!(f, "{what} exceeds the maximum length of {max}")
            }
            Self::SerializationFailure(msg) => write!(f, "serialization failure: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for DbError {}
