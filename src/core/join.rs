// src/core/join.rs

use crate::core::statement::{Condition, JoinCondition, JoinType, Operator, WhereClause};
use crate::core::storage::Table;
use crate::core::types::{Row, Value};
use std::collections::HashMap;

/// One output tuple of a join (or a bare scan): the contributing row ids,
/// keyed by table name, and the projected `"table.column"` values.
///
/// Row identity is a `(left_id, Option<right_id>)` pair rather than a
/// packed/shifted `u64` — it reads directly as "which rows produced this",
/// and a NULL-padded side naturally carries `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub row_ids: (u64, Option<u64>),
    pub table_names: Vec<String>,
    pub values: HashMap<String, Value>,
}

/// Executes single-table scans and two-table nested-loop equi-joins.
///
/// Buffers the right side, iterates the left side once, and pairs every
/// match. Only equi-joins on two tables are supported — no multi-way
/// joins, no theta-joins.
pub struct JoinExecutor;

impl JoinExecutor {
    fn project(table_name: &str, row: &Row, table: &Table) -> HashMap<String, Value> {
        table
            .schema
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| (format!("{table_name}.{}", col.name), row.values[idx].clone()))
            .collect()
    }

    #[must_use]
    pub fn scan(table_name: &str, table: &Table, r#where: Option<&WhereClause>) -> Vec<ResultRow> {
        table
            .matching(r#where)
            .into_iter()
            .map(|row| ResultRow {
                row_ids: (row.row_id, None),
                table_names: vec![table_name.to_string()],
                values: Self::project(table_name, row, table),
            })
            .collect()
    }

    /// Nested-loop equi-join of `left`/`right` on `condition.{left,right}_column`,
    /// applying `join_type`'s NULL-padding rule first and then, if given, a
    /// `WHERE` clause over the combined tuple. The clause's `Condition::column`
    /// is looked up against the already-joined, already-padded row's
    /// `"table.column"` keys, so predicates can reference either side.
    #[must_use]
    pub fn join(
        condition: &JoinCondition,
        join_type: JoinType,
        left: &Table,
        right: &Table,
        r#where: Option<&WhereClause>,
    ) -> Result<Vec<ResultRow>, String> {
        let left_col = left
            .schema
            .get_column_index(&condition.left_column)
            .ok_or_else(|| format!("unknown column {}", condition.left_column))?;
        let right_col = right
            .schema
            .get_column_index(&condition.right_column)
            .ok_or_else(|| format!("unknown column {}", condition.right_column))?;

        let mut results = Vec::new();
        let mut matched_right: Vec<bool> = vec![false; right.rows.len()];

        for left_row in &left.rows {
            let mut matched_left = false;
            for (ri, right_row) in right.rows.iter().enumerate() {
                if left_row.values[left_col] == right_row.values[right_col] {
                    matched_left = true;
                    matched_right[ri] = true;
                    results.push(Self::combine(condition, left_row, Some(right_row), left, right));
                }
            }
            if !matched_left && matches!(join_type, JoinType::Left | JoinType::Full) {
                results.push(Self::combine(condition, left_row, None, left, right));
            }
        }

        if matches!(join_type, JoinType::Right | JoinType::Full) {
            for (ri, right_row) in right.rows.iter().enumerate() {
                if !matched_right[ri] {
                    results.push(Self::combine_right_only(condition, right_row, left, right));
                }
            }
        }

        if let Some(clause) = r#where {
            results.retain(|row| Self::result_matches(row, clause));
        }

        Ok(results)
    }

    fn result_matches(row: &ResultRow, clause: &WhereClause) -> bool {
        if clause.is_empty() {
            return true;
        }
        clause.groups.iter().any(|group| group.iter().all(|cond| Self::result_condition_matches(row, cond)))
    }

    fn result_condition_matches(row: &ResultRow, cond: &Condition) -> bool {
        let actual = row.values.get(&cond.column).unwrap_or(&Value::Null);
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

    fn combine(
        condition: &JoinCondition,
        left_row: &Row,
        right_row: Option<&Row>,
        left: &Table,
        right: &Table,
    ) -> ResultRow {
        let mut values = Self::project(&condition.left_table, left_row, left);
        let right_id = right_row.map(|r| r.row_id);
        match right_row {
            Some(row) => values.extend(Self::project(&condition.right_table, row, right)),
            None => {
                for col in &right.schema.columns {
                    values.insert(format!("{}.{}", condition.right_table, col.name), Value::Null);
                }
            }
        }
        ResultRow {
            row_ids: (left_row.row_id, right_id),
            table_names: vec![condition.left_table.clone(), condition.right_table.clone()],
            values,
        }
    }

    fn combine_right_only(
        condition: &JoinCondition,
        right_row: &Row,
        left: &Table,
        right: &Table,
    ) -> ResultRow {
        let mut values = HashMap::new();
        for col in &left.schema.columns {
            values.insert(format!("{}.{}", condition.left_table, col.name), Value::Null);
        }
        values.extend(Self::project(&condition.right_table, right_row, right));
        ResultRow {
            row_ids: (right_row.row_id, None),
            table_names: vec![condition.left_table.clone(), condition.right_table.clone()],
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ColumnDef, DataType, Schema};

    fn users() -> Table {
        let schema = Schema::new(vec![
            ColumnDef::new("id", DataType::Integer).primary_key(),
            ColumnDef::new("name", DataType::Varchar),
        ]);
        let mut t = Table::new("users", schema);
        t.insert_row(vec![Value::Integer(1), Value::Varchar("alice".into())]).unwrap();
        t.insert_row(vec![Value::Integer(2), Value::Varchar("bob".into())]).unwrap();
        t
    }

    fn orders() -> Table {
        let schema = Schema::new(vec![
            ColumnDef::new("id", DataType::Integer).primary_key(),
            ColumnDef::new("user_id", DataType::Integer),
        ]);
        let mut t = Table::new("orders", schema);
        t.insert_row(vec![Value::Integer(100), Value::Integer(1)]).unwrap();
        t
    }

    fn cond() -> JoinCondition {
        JoinCondition {
            left_table: "users".into(),
            left_column: "id".into(),
            right_table: "orders".into(),
            right_column: "user_id".into(),
        }
    }

    #[test]
    fn inner_join_only_returns_matches() {
        let (u, o) = (users(), orders());
        let rows = JoinExecutor::join(&cond(), JoinType::Inner, &u, &o, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values["users.name"], Value::Varchar("alice".into()));
    }

    #[test]
    fn left_join_pads_unmatched_left_rows_with_null() {
        let (u, o) = (users(), orders());
        let rows = JoinExecutor::join(&cond(), JoinType::Left, &u, &o, None).unwrap();
        assert_eq!(rows.len(), 2);
        let bob = rows.iter().find(|r| r.values["users.name"] == Value::Varchar("bob".into())).unwrap();
        assert_eq!(bob.values["orders.id"], Value::Null);
        assert_eq!(bob.row_ids.1, None);
    }

    #[test]
    fn full_join_pads_both_sides() {
        let schema = Schema::new(vec![
            ColumnDef::new("id", DataType::Integer).primary_key(),
            ColumnDef::new("user_id", DataType::Integer),
        ]);
        let mut o = Table::new("orders", schema);
        o.insert_row(vec![Value::Integer(100), Value::Integer(1)]).unwrap();
        o.insert_row(vec![Value::Integer(200), Value::Integer(99)]).unwrap();
        let u = users();
        let rows = JoinExecutor::join(&cond(), JoinType::Full, &u, &o, None).unwrap();
        // alice+100, bob+NULL, NULL+200
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn join_applies_where_clause_after_combining_rows() {
        let (u, o) = (users(), orders());
        let clause = WhereClause::single(Condition::new("orders.id", Operator::Eq, Value::Integer(100)));
        let rows = JoinExecutor::join(&cond(), JoinType::Left, &u, &o, Some(&clause)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values["users.name"], Value::Varchar("alice".into()));

        let clause = WhereClause::single(Condition::is_null("orders.id"));
        let rows = JoinExecutor::join(&cond(), JoinType::Left, &u, &o, Some(&clause)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values["users.name"], Value::Varchar("bob".into()));
    }
}
