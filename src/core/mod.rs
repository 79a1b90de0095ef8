pub mod common;
pub mod database;
pub mod foreign_key;
pub mod join;
pub mod statement;
pub mod storage;
pub mod transaction;
pub mod types;

pub use database::{Database, ExecutionResult};
pub use foreign_key::ForeignKey;
pub use join::{JoinExecutor, ResultRow};
pub use statement::{
    Assignment, Condition, JoinCondition, JoinType, Operator, Statement, WhereClause,
};
