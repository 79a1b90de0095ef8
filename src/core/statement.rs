// src/core/statement.rs

use crate::core::transaction::IsolationLevel;
use crate::core::types::{ColumnDef, Value};

/// A comparison operator in a `WHERE` predicate. The full grid is
/// supported, not just equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,
    Like,
    IsNull,
    IsNotNull,
    In,
}

/// A single `column OP value` test.
///
/// `IsNull`/`IsNotNull` ignore `value`; `In` reads `values` instead of
/// `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Option<Value>,
    pub values: Vec<Value>,
}

impl Condition {
    #[must_use]
    pub fn new(column: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self { column: column.into(), operator, value: Some(value), values: Vec::new() }
    }

    #[must_use]
    pub fn is_null(column: impl Into<String>) -> Self {
        Self { column: column.into(), operator: Operator::IsNull, value: None, values: Vec::new() }
    }

    #[must_use]
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: Operator::IsNotNull,
            value: None,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_list(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self { column: column.into(), operator: Operator::In, value: None, values }
    }
}

/// A `WHERE` clause in disjunctive-normal form: a list of AND-groups, any one
/// of which satisfying the row is enough (groups are OR'd together,
/// conditions within a group are AND'd). This gives `AND` its usual tighter
/// binding than `OR` without needing a general expression tree.
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    pub groups: Vec<Vec<Condition>>,
}

impl WhereClause {
    #[must_use]
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    #[must_use]
    pub fn single(condition: Condition) -> Self {
        Self { groups: vec![vec![condition]] }
    }

    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        if self.groups.is_empty() {
            self.groups.push(Vec::new());
        }
        let last = self.groups.len() - 1;
        self.groups[last].push(condition);
        self
    }

    #[must_use]
    pub fn or(mut self, condition: Condition) -> Self {
        self.groups.push(vec![condition]);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The kind of join a two-table query requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

/// `left.column = right.column`, the only join predicate shape this engine
/// supports — no theta-joins.
#[derive(Debug, Clone)]
pub struct JoinCondition {
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
}

/// An assignment in an `UPDATE ... SET col = value` list.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

/// An internal command descriptor, issued by a caller (e.g. a SQL front end,
/// out of scope here) and executed by `Database`.
#[derive(Debug, Clone)]
pub enum Statement {
    CreateTable { table_name: String, columns: Vec<ColumnDef> },
    DropTable { table_name: String },
    CreateIndex { index_name: String, table_name: String, column: String },
    DropIndex { index_name: String, table_name: String },
    Insert { table_name: String, values: Vec<Value> },
    Select { table_name: String, r#where: Option<WhereClause> },
    Join { join: JoinCondition, join_type: JoinType, r#where: Option<WhereClause> },
    Update { table_name: String, assignments: Vec<Assignment>, r#where: Option<WhereClause> },
    Delete { table_name: String, r#where: Option<WhereClause> },
    Begin { isolation: IsolationLevel },
    Commit,
    Rollback,
}
