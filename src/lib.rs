#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    deprecated,
    unused,
    clippy::todo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::unreachable,
    clippy::missing_safety_doc,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::missing_docs
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::option_if_let_else,
    clippy::cognitive_complexity,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::struct_excessive_bools,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp,
    clippy::doc_markdown,
    clippy::wildcard_imports,
    clippy::struct_field_names,
    clippy::module_inception,
    clippy::missing_fields_in_debug,
    clippy::use_self,
    clippy::return_self_not_must_use,
    clippy::bool_to_int_with_if,
    clippy::partial_pub_fields,
    clippy::multiple_crate_versions,
    clippy::single_match_else,
    clippy::implicit_hasher,
    clippy::linkedlist,
    clippy::default_trait_access,
    clippy::missing_transmute_annotations,
    clippy::multiple_inherent_impl,
    clippy::get_unwrap,
    clippy::impl_trait_in_params,
    clippy::future_not_send,
    clippy::type_complexity,
    clippy::result_large_err,
    clippy::large_stack_frames,
    clippy::significant_drop_in_scrutinee,
    clippy::significant_drop_tightening,
    clippy::items_after_statements,
    clippy::match_wildcard_for_single_variants,
    clippy::needless_pass_by_value,
    clippy::redundant_closure_for_method_calls,
    clippy::unused_async,
    clippy::unnecessary_wraps,
    clippy::trivially_copy_pass_by_ref,
    clippy::match_same_arms,
    clippy::explicit_deref_methods,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
    clippy::from_iter_instead_of_collect,
    clippy::if_not_else,
    clippy::equatable_if_let,
    clippy::or_fun_call,
    clippy::iter_without_into_iter,
    clippy::infinite_loop,
    clippy::ref_as_ptr,
    clippy::ref_option_ref,
    clippy::option_option,
    clippy::match_bool,
    clippy::let_underscore_untyped,
    clippy::empty_enum_variants_with_brackets,
    clippy::pattern_type_mismatch,
    clippy::ignored_unit_patterns,
    clippy::redundant_pub_crate,
    clippy::allow_attributes,
    clippy::no_effect_underscore_binding,
    clippy::used_underscore_binding,
    clippy::tests_outside_test_module
)]

//! # relcore - an in-memory relational storage and transaction engine
//!
//! relcore is a small embedded relational engine: typed rows over a
//! per-table catalog, two-table joins, foreign key enforcement, and
//! ACID transactions backed by an undo log. It has no SQL parser and no
//! on-disk persistence — those are the job of a layer built on top.
//!
//! ## Quick start
//!
//! ```
//! use relcore::{ColumnDef, DataType, Database, EngineConfig, Statement, Value};
//!
//! let db = Database::open("example", EngineConfig::default());
//! db.create_table(
//!     "users",
//!     vec![
//!         ColumnDef::new("id", DataType::Integer).primary_key(),
//!         ColumnDef::new("name", DataType::Varchar),
//!     ],
//!     None,
//! )
//! .unwrap();
//!
//! db.execute(Statement::Insert {
//!     table_name: "users".into(),
//!     values: vec![Value::Integer(1), Value::Varchar("alice".into())],
//! })
//! .unwrap();
//! ```
//!
//! ## Architecture
//!
//! - [`core::types`]: the `Value`/`Row`/`Schema` data model.
//! - [`core::storage`]: per-table row storage, constraint checks, and
//!   secondary indexes.
//! - [`core::foreign_key`]: cross-table referential integrity.
//! - [`core::join`]: the two-table nested-loop join executor.
//! - [`core::transaction`]: isolation levels, the undo log, and
//!   begin/commit/rollback lifecycle.
//! - [`core::database`]: ties the above together behind one `Database`
//!   handle.

pub mod core;

pub use crate::core::common::{DbError, EngineConfig};
pub use crate::core::foreign_key::ForeignKey;
pub use crate::core::join::{JoinExecutor, ResultRow};
pub use crate::core::statement::{
    Assignment, Condition, JoinCondition, JoinType, Operator, Statement, WhereClause,
};
pub use crate::core::transaction::{IsolationLevel, Transaction, TransactionState};
pub use crate::core::types::{ColumnDef, DataType, Row, Schema, Value};
pub use crate::core::{Database, ExecutionResult};
