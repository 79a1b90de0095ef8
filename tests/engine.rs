// tests/engine.rs

use relcore::{
    ColumnDef, Condition, DataType, Database, EngineConfig, ForeignKey, IsolationLevel,
    JoinCondition, JoinType, Operator, Statement, Value, WhereClause,
};

fn users_orders_db() -> Database {
    let db = Database::open("engine_test", EngineConfig::default());
    db.create_table(
        "users",
        vec![
            ColumnDef::new("id", DataType::Integer).primary_key(),
            ColumnDef::new("name", DataType::Varchar).not_null(),
        ],
        None,
    )
    .unwrap();
    db.create_table(
        "orders",
        vec![
            ColumnDef::new("id", DataType::Integer).primary_key(),
            ColumnDef::new("user_id", DataType::Integer),
            ColumnDef::new("total", DataType::Integer),
        ],
        None,
    )
    .unwrap();
    db.add_foreign_key(ForeignKey::new("fk_orders_user", "orders", "user_id", "users", "id"));
    db
}

#[test]
fn insert_then_select_sees_the_row() {
    let db = users_orders_db();
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(1), Value::Varchar("alice".into())],
    })
    .unwrap();

    let rows = match db
        .execute(Statement::Select { table_name: "users".into(), r#where: None })
        .unwrap()
    {
        relcore::ExecutionResult::Rows(rows) => rows,
        _ => panic!("expected rows"),
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values[1], Value::Varchar("alice".into()));
}

#[test]
fn explicit_rollback_restores_prior_state_and_preserves_row_id_sequence() {
    let db = users_orders_db();
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(1), Value::Varchar("alice".into())],
    })
    .unwrap();

    db.begin(IsolationLevel::ReadCommitted).unwrap();
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(2), Value::Varchar("bob".into())],
    })
    .unwrap();
    db.rollback().unwrap();

    let rows = match db
        .execute(Statement::Select { table_name: "users".into(), r#where: None })
        .unwrap()
    {
        relcore::ExecutionResult::Rows(rows) => rows,
        _ => panic!("expected rows"),
    };
    assert_eq!(rows.len(), 1);

    // the rolled-back insert's row id is never reused.
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(3), Value::Varchar("carol".into())],
    })
    .unwrap();
    let rows = match db
        .execute(Statement::Select { table_name: "users".into(), r#where: None })
        .unwrap()
    {
        relcore::ExecutionResult::Rows(rows) => rows,
        _ => panic!("expected rows"),
    };
    let ids: Vec<u64> = rows.iter().map(|r| r.row_id).collect();
    assert!(ids.iter().all(|id| *id != 2 || rows.len() > 2));
    assert!(*ids.iter().max().unwrap() > 1);
}

#[test]
fn bare_dml_outside_a_transaction_autocommits() {
    let db = users_orders_db();
    // No explicit begin/commit: each statement must autocommit on its own.
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(1), Value::Varchar("alice".into())],
    })
    .unwrap();
    assert!(db.commit().is_err(), "autocommit must not leave a transaction active");
}

#[test]
fn foreign_key_rejects_orphan_and_accepts_null() {
    let db = users_orders_db();
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(1), Value::Varchar("alice".into())],
    })
    .unwrap();

    let err = db
        .execute(Statement::Insert {
            table_name: "orders".into(),
            values: vec![Value::Integer(100), Value::Integer(99), Value::Integer(50)],
        })
        .unwrap_err();
    assert!(matches!(err, relcore::DbError::FKViolation(_)));

    // NULL foreign key is always accepted.
    db.execute(Statement::Insert {
        table_name: "orders".into(),
        values: vec![Value::Integer(101), Value::Null, Value::Integer(75)],
    })
    .unwrap();

    db.execute(Statement::Insert {
        table_name: "orders".into(),
        values: vec![Value::Integer(102), Value::Integer(1), Value::Integer(20)],
    })
    .unwrap();
}

#[test]
fn two_table_join_matches_on_equality() {
    let db = users_orders_db();
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(1), Value::Varchar("alice".into())],
    })
    .unwrap();
    db.execute(Statement::Insert {
        table_name: "orders".into(),
        values: vec![Value::Integer(100), Value::Integer(1), Value::Integer(42)],
    })
    .unwrap();

    let join = JoinCondition {
        left_table: "users".into(),
        left_column: "id".into(),
        right_table: "orders".into(),
        right_column: "user_id".into(),
    };
    let result = db.execute(Statement::Join { join, join_type: JoinType::Inner, r#where: None }).unwrap();
    match result {
        relcore::ExecutionResult::Joined(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].values["orders.total"], Value::Integer(42));
        }
        _ => panic!("expected a joined result"),
    }
}

#[test]
fn join_with_where_clause_filters_the_combined_rows() {
    let db = users_orders_db();
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(1), Value::Varchar("alice".into())],
    })
    .unwrap();
    db.execute(Statement::Insert {
        table_name: "orders".into(),
        values: vec![Value::Integer(100), Value::Integer(1), Value::Integer(42)],
    })
    .unwrap();
    db.execute(Statement::Insert {
        table_name: "orders".into(),
        values: vec![Value::Integer(101), Value::Integer(1), Value::Integer(7)],
    })
    .unwrap();

    let join = JoinCondition {
        left_table: "users".into(),
        left_column: "id".into(),
        right_table: "orders".into(),
        right_column: "user_id".into(),
    };
    let clause = WhereClause::single(Condition::new("orders.total", Operator::Gt, Value::Integer(10)));
    let result = db
        .execute(Statement::Join { join, join_type: JoinType::Inner, r#where: Some(clause) })
        .unwrap();
    match result {
        relcore::ExecutionResult::Joined(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].values["orders.id"], Value::Integer(100));
        }
        _ => panic!("expected a joined result"),
    }
}

#[test]
fn on_update_cascade_rewrites_child_rows() {
    let db = users_orders_db();
    db.drop_foreign_key("fk_orders_user");
    db.add_foreign_key(
        ForeignKey::new("fk_orders_user", "orders", "user_id", "users", "id").cascade_on_update(),
    );
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(1), Value::Varchar("alice".into())],
    })
    .unwrap();
    db.execute(Statement::Insert {
        table_name: "orders".into(),
        values: vec![Value::Integer(100), Value::Integer(1), Value::Integer(42)],
    })
    .unwrap();

    db.execute(Statement::Update {
        table_name: "users".into(),
        assignments: vec![relcore::Assignment { column: "id".into(), value: Value::Integer(5) }],
        r#where: Some(WhereClause::single(Condition::new("id", Operator::Eq, Value::Integer(1)))),
    })
    .unwrap();

    let rows = match db
        .execute(Statement::Select { table_name: "orders".into(), r#where: None })
        .unwrap()
    {
        relcore::ExecutionResult::Rows(rows) => rows,
        _ => panic!("expected rows"),
    };
    assert_eq!(rows[0].values[1], Value::Integer(5));
}

#[test]
fn nested_transaction_is_refused() {
    let db = users_orders_db();
    db.begin(IsolationLevel::ReadCommitted).unwrap();
    assert_eq!(db.begin(IsolationLevel::ReadCommitted), Err(relcore::DbError::NestedTxn));
    db.commit().unwrap();
}

#[test]
fn where_clause_combines_and_before_or() {
    let db = users_orders_db();
    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        db.execute(Statement::Insert {
            table_name: "users".into(),
            values: vec![Value::Integer(id), Value::Varchar(name.into())],
        })
        .unwrap();
    }
    // id = 1 AND name = 'alice', OR id = 3
    let clause = WhereClause::new()
        .and(Condition::new("id", Operator::Eq, Value::Integer(1)))
        .and(Condition::new("name", Operator::Eq, Value::Varchar("alice".into())))
        .or(Condition::new("id", Operator::Eq, Value::Integer(3)));
    let rows = match db
        .execute(Statement::Select { table_name: "users".into(), r#where: Some(clause) })
        .unwrap()
    {
        relcore::ExecutionResult::Rows(rows) => rows,
        _ => panic!("expected rows"),
    };
    assert_eq!(rows.len(), 2);
}

#[test]
fn update_then_rollback_restores_the_original_value() {
    let db = users_orders_db();
    db.execute(Statement::Insert {
        table_name: "users".into(),
        values: vec![Value::Integer(1), Value::Varchar("alice".into())],
    })
    .unwrap();

    db.begin(IsolationLevel::ReadCommitted).unwrap();
    db.execute(Statement::Update {
        table_name: "users".into(),
        assignments: vec![relcore::Assignment { column: "name".into(), value: Value::Varchar("alicia".into()) }],
        r#where: Some(WhereClause::single(Condition::new("id", Operator::Eq, Value::Integer(1)))),
    })
    .unwrap();
    db.rollback().unwrap();

    let rows = match db
        .execute(Statement::Select { table_name: "users".into(), r#where: None })
        .unwrap()
    {
        relcore::ExecutionResult::Rows(rows) => rows,
        _ => panic!("expected rows"),
    };
    assert_eq!(rows[0].values[1], Value::Varchar("alice".into()));
}
