use super::*;
use crate::dialect::{COCKROACH_DB, MYSQL, POSTGRES, SQLITE};
use crate::expr::{
    BoolExpr, Expr, Integer, OrderedExpr, Text, TextExpr, TypedExpr, count_star, exists, max,
};
use crate::table::{Column, Readable, Table};

struct Users {
    table: Table,
    id: Column<Integer>,
    name: Column<Text>,
    age: Column<Integer>,
}

fn users() -> Users {
    let table = Table::new("users");
    Users {
        id: table.column("id"),
        name: table.column("name"),
        age: table.column("age"),
        table,
    }
}

fn pg(stmt: &impl Statement) -> (String, Vec<Value>) {
    stmt.sql(&POSTGRES).unwrap()
}

#[test]
fn test_select_clause_order() {
    let u = users();
    let stmt = select(&[&u.age, &count_star().alias("n")])
        .distinct()
        .from(&u.table)
        .where_expr(u.age.gt(18))
        .group_by(&[&u.age])
        .having(count_star().gt(1))
        .order_by([u.age.desc()])
        .limit(10)
        .offset(20);

    let (sql, args) = pg(&stmt);
    assert_eq!(
        sql,
        "SELECT DISTINCT users.age AS \"users.age\", COUNT(*) AS \"n\" FROM users \
         WHERE (users.age > $1) GROUP BY users.age HAVING (COUNT(*) > $2) \
         ORDER BY users.age DESC LIMIT $3 OFFSET $4;"
    );
    assert_eq!(
        args,
        vec![Value::Int(18), Value::Int(1), Value::Int(10), Value::Int(20)]
    );
    assert_eq!(stmt.kind(), StatementKind::Select);
}

#[test]
fn test_select_where_calls_are_anded() {
    let u = users();
    let stmt = u
        .table
        .select(&[&u.id])
        .where_expr(u.age.gt(18))
        .where_expr(u.name.like("a%"));
    assert_eq!(
        pg(&stmt).0,
        "SELECT users.id AS \"users.id\" FROM users WHERE ((users.age > $1) AND (users.name LIKE $2));"
    );
}

#[test]
fn test_select_without_from() {
    let stmt = select(&[&crate::expr::int(1).alias("one")]);
    assert_eq!(pg(&stmt).0, "SELECT $1 AS \"one\";");
}

#[test]
fn test_empty_projection() {
    let u = users();
    let err = select(&[]).from(&u.table).sql(&POSTGRES).unwrap_err();
    assert_eq!(err, BuildError::EmptyProjection);
}

#[test]
fn test_project_appends() {
    let u = users();
    let stmt = select(&[&u.id]).project(&u.name).from(&u.table);
    assert_eq!(stmt.projections().len(), 2);
    assert_eq!(
        pg(&stmt).0,
        "SELECT users.id AS \"users.id\", users.name AS \"users.name\" FROM users;"
    );
}

#[test]
fn test_offset_without_limit() {
    let u = users();
    let stmt = select(&[&u.id]).from(&u.table).offset(5);
    assert_eq!(pg(&stmt).0, "SELECT users.id AS \"users.id\" FROM users OFFSET $1;");

    let err = stmt.sql(&MYSQL).unwrap_err();
    assert_eq!(err, BuildError::unsupported("mysql", "OFFSET without LIMIT"));
    assert!(stmt.sql(&SQLITE).is_err());

    let (sql, _) = stmt.clone().limit(1).sql(&MYSQL).unwrap();
    assert_eq!(sql, "SELECT users.id AS `users.id` FROM users LIMIT ? OFFSET ?;");
}

#[test]
fn test_row_locks() {
    let u = users();
    let base = select(&[&u.id]).from(&u.table).where_expr(u.id.eq(1));

    assert_eq!(
        pg(&base.clone().for_lock(RowLock::update().skip_locked())).0,
        "SELECT users.id AS \"users.id\" FROM users WHERE (users.id = $1) FOR UPDATE SKIP LOCKED;"
    );
    assert!(pg(&base.clone().for_lock(RowLock::key_share().nowait())).0.ends_with("FOR KEY SHARE NOWAIT;"));
    assert!(pg(&base.clone().for_lock(RowLock::no_key_update())).0.ends_with("FOR NO KEY UPDATE;"));

    let share = base.clone().for_lock(RowLock::share());
    assert!(share.sql(&MYSQL).unwrap().0.ends_with("FOR SHARE;"));

    let err = base.clone().for_lock(RowLock::key_share()).sql(&MYSQL).unwrap_err();
    assert_eq!(err, BuildError::unsupported("mysql", "FOR KEY SHARE"));
    assert!(base.for_lock(RowLock::update()).sql(&SQLITE).is_err());
}

#[test]
fn test_with_cte() {
    let u = users();
    let adults = select(&[&u.id, &u.name])
        .from(&u.table)
        .where_expr(u.age.gt_eq(18))
        .as_cte("adults")
        .unwrap();
    let adult_name = u.name.from_table(&adults).unwrap();

    let stmt = select(&[&adult_name])
        .with(&[&adults])
        .from(&adults)
        .where_expr(adult_name.not_eq("root"));
    let (sql, args) = pg(&stmt);
    assert_eq!(
        sql,
        "WITH adults AS (SELECT users.id AS \"users.id\", users.name AS \"users.name\" FROM users \
         WHERE (users.age >= $1)) SELECT adults.\"users.name\" AS \"users.name\" FROM adults \
         WHERE (adults.\"users.name\" != $2);"
    );
    assert_eq!(args, vec![Value::Int(18), Value::from("root")]);
}

#[test]
fn test_cte_requires_with() {
    let u = users();
    let adults = select(&[&u.id])
        .from(&u.table)
        .where_expr(u.age.gt_eq(18))
        .as_cte("adults")
        .unwrap();
    let adult_id = u.id.from_table(&adults).unwrap();

    let err = select(&[&adult_id]).from(&adults).sql(&POSTGRES).unwrap_err();
    assert_eq!(err, BuildError::UndeclaredCte("adults".into()));

    let joined = select(&[&u.name])
        .from(&u.table.inner_join(&adults, u.id.eq(&adult_id)))
        .sql(&MYSQL)
        .unwrap_err();
    assert_eq!(joined, BuildError::UndeclaredCte("adults".into()));

    let declared = select(&[&adult_id]).with(&[&adults]).from(&adults);
    assert!(declared.sql(&POSTGRES).is_ok());
}

#[test]
fn test_later_cte_reads_earlier_one() {
    let u = users();
    let adults = select(&[&u.id]).from(&u.table).as_cte("adults").unwrap();
    let adult_id = u.id.from_table(&adults).unwrap();
    let first = select(&[&adult_id]).from(&adults).limit(1).as_cte("first").unwrap();
    let first_id = adult_id.from_table(&first).unwrap();

    let stmt = select(&[&first_id]).with(&[&adults, &first]).from(&first);
    assert_eq!(
        pg(&stmt).0,
        "WITH adults AS (SELECT users.id AS \"users.id\" FROM users), \
         first AS (SELECT adults.\"users.id\" AS \"users.id\" FROM adults LIMIT $1) \
         SELECT first.\"users.id\" AS \"users.id\" FROM first;"
    );

    let out_of_order = select(&[&first_id]).with(&[&first, &adults]).from(&first);
    assert_eq!(
        out_of_order.sql(&POSTGRES).unwrap_err(),
        BuildError::UndeclaredCte("adults".into())
    );
}

#[test]
fn test_column_outside_from_is_rejected() {
    let u = users();
    let accounts = Table::new("accounts");
    let owner = accounts.column::<Integer>("owner_id");

    let err = select(&[&owner]).from(&u.table).sql(&POSTGRES).unwrap_err();
    assert_eq!(err, BuildError::TableNotInScope("accounts".into()));

    let err = select(&[&u.id])
        .from(&u.table)
        .where_expr(owner.eq(1))
        .sql(&POSTGRES)
        .unwrap_err();
    assert_eq!(err, BuildError::TableNotInScope("accounts".into()));

    // Columns of an aliased table are qualified by the alias only.
    let aliased = u.table.aliased("u");
    let err = select(&[&u.id]).from(&aliased).sql(&POSTGRES).unwrap_err();
    assert_eq!(err, BuildError::TableNotInScope("users".into()));

    let err = u
        .table
        .update()
        .set(u.name.set("x"))
        .where_expr(owner.eq(1))
        .sql(&POSTGRES)
        .unwrap_err();
    assert_eq!(err, BuildError::TableNotInScope("accounts".into()));

    let err = u
        .table
        .delete()
        .where_expr(u.id.eq(1))
        .returning(&[&owner])
        .sql(&POSTGRES)
        .unwrap_err();
    assert_eq!(err, BuildError::TableNotInScope("accounts".into()));

    let err = select(&[&owner]).sql(&POSTGRES).unwrap_err();
    assert_eq!(err, BuildError::TableNotInScope("accounts".into()));
}

#[test]
fn test_correlated_sub_query_sees_outer_sources() {
    let u = users();
    let orders = Table::new("orders");
    let order_user = orders.column::<Integer>("user_id");
    let order_id = orders.column::<Integer>("id");

    let has_orders = exists(&select(&[&order_id]).from(&orders).where_expr(order_user.eq(&u.id)));
    let stmt = select(&[&u.name]).from(&u.table).where_expr(has_orders.clone());
    assert_eq!(
        pg(&stmt).0,
        "SELECT users.name AS \"users.name\" FROM users WHERE EXISTS \
         (SELECT orders.id AS \"orders.id\" FROM orders WHERE (orders.user_id = users.id));"
    );

    let purge = u.table.delete().where_expr(has_orders.clone());
    assert!(purge.sql(&POSTGRES).is_ok());

    // The outer scope does not leak into a sibling statement.
    let stray = select(&[&order_id]).from(&orders).where_expr(order_user.eq(&u.id));
    assert_eq!(
        stray.sql(&POSTGRES).unwrap_err(),
        BuildError::TableNotInScope("users".into())
    );
}

#[test]
fn test_insert_scope_is_the_bare_table_name() {
    let u = users();
    let stmt = u
        .table
        .insert(&[&u.id])
        .values([Expr::from(1)])
        .returning(&[&u.id]);
    assert!(stmt.sql(&POSTGRES).is_ok());

    let aliased = u.table.aliased("x");
    let aliased_id = aliased.column::<Integer>("id");
    let err = aliased
        .insert(&[&aliased_id])
        .values([Expr::from(1)])
        .returning(&[&aliased_id])
        .sql(&POSTGRES)
        .unwrap_err();
    assert_eq!(err, BuildError::TableNotInScope("x".into()));
}

#[test]
fn test_sub_query_in_from() {
    let u = users();
    let oldest = select(&[&max(&u.age).alias("oldest")])
        .from(&u.table)
        .as_table("m")
        .unwrap();
    let oldest_age = oldest.column::<Integer>("oldest").unwrap();
    let stmt = oldest.select(&[&oldest_age]).where_expr(oldest_age.gt(100));
    assert_eq!(
        pg(&stmt).0,
        "SELECT m.\"oldest\" AS \"oldest\" FROM (SELECT MAX(users.age) AS \"oldest\" FROM users) AS m \
         WHERE (m.\"oldest\" > $1);"
    );
}

#[test]
fn test_insert_values() {
    let u = users();
    let stmt = u
        .table
        .insert(&[&u.id, &u.name])
        .values([Expr::from(1), Expr::from("alice")])
        .values([Expr::from(2), Expr::from("bob")])
        .returning(&[&u.id]);

    let (sql, args) = pg(&stmt);
    assert_eq!(
        sql,
        "INSERT INTO users (id, name) VALUES ($1, $2), ($3, $4) RETURNING users.id AS \"users.id\";"
    );
    assert_eq!(
        args,
        vec![Value::Int(1), Value::from("alice"), Value::Int(2), Value::from("bob")]
    );
    assert_eq!(stmt.kind(), StatementKind::Insert);

    let (sql, _) = stmt.clone().sql(&SQLITE).unwrap();
    assert!(sql.starts_with("INSERT INTO users (id, name) VALUES (?, ?), (?, ?)"));
    assert_eq!(
        stmt.sql(&MYSQL).unwrap_err(),
        BuildError::unsupported("mysql", "RETURNING")
    );
}

#[test]
fn test_insert_on_conflict() {
    let u = users();
    let upsert = u
        .table
        .insert(&[&u.id, &u.name])
        .values([Expr::from(1), Expr::from("alice")])
        .on_conflict_do_update(&[&u.id], [u.name.set(u.name.excluded())]);
    assert_eq!(
        pg(&upsert).0,
        "INSERT INTO users (id, name) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name;"
    );
    assert_eq!(
        upsert.sql(&MYSQL).unwrap_err(),
        BuildError::unsupported("mysql", "ON CONFLICT")
    );

    let ignore = u
        .table
        .insert(&[&u.id])
        .values([Expr::from(1)])
        .on_conflict_do_nothing(&[]);
    assert_eq!(
        ignore.sql(&SQLITE).unwrap().0,
        "INSERT INTO users (id) VALUES (?) ON CONFLICT DO NOTHING;"
    );
}

#[test]
fn test_insert_select() {
    let u = users();
    let archive = Table::new("archive");
    let stmt = archive
        .insert(&[&u.id, &u.name])
        .from_select(select(&[&u.id, &u.name]).from(&u.table).where_expr(u.age.lt(10)));
    assert_eq!(
        pg(&stmt).0,
        "INSERT INTO archive (id, name) SELECT users.id AS \"users.id\", users.name AS \"users.name\" \
         FROM users WHERE (users.age < $1);"
    );
}

#[test]
fn test_insert_errors() {
    let u = users();
    assert_eq!(
        u.table.insert(&[]).sql(&POSTGRES).unwrap_err(),
        BuildError::EmptyClause {
            statement: "INSERT",
            clause: "column list",
        }
    );
    assert_eq!(
        u.table.insert(&[&u.id]).sql(&POSTGRES).unwrap_err(),
        BuildError::EmptyClause {
            statement: "INSERT",
            clause: "VALUES",
        }
    );
    assert_eq!(
        u.table
            .insert(&[&u.id, &u.name])
            .values([Expr::from(1), Expr::from("a")])
            .values([Expr::from(2)])
            .sql(&POSTGRES)
            .unwrap_err(),
        BuildError::ValueCountMismatch {
            row: 2,
            expected: 2,
            got: 1,
        }
    );
}

#[test]
fn test_update() {
    let u = users();
    let stmt = u
        .table
        .update()
        .set(u.name.set("bob"))
        .set(u.age.set(u.age.as_expression()))
        .where_expr(u.id.eq(7))
        .returning(&[&u.age]);
    let (sql, args) = pg(&stmt);
    assert_eq!(
        sql,
        "UPDATE users SET name = $1, age = users.age WHERE (users.id = $2) RETURNING users.age AS \"users.age\";"
    );
    assert_eq!(args, vec![Value::from("bob"), Value::Int(7)]);
    assert_eq!(stmt.kind(), StatementKind::Update);
}

#[test]
fn test_update_requires_where_and_set() {
    let u = users();
    assert_eq!(
        u.table.update().set(u.name.set("x")).sql(&POSTGRES).unwrap_err(),
        BuildError::MissingWhere("UPDATE")
    );
    assert_eq!(
        u.table.update().where_expr(u.id.eq(1)).sql(&POSTGRES).unwrap_err(),
        BuildError::EmptyClause {
            statement: "UPDATE",
            clause: "SET",
        }
    );
}

#[test]
fn test_delete() {
    let u = users();
    let stmt = u.table.delete().where_expr(u.id.in_list([1, 2]));
    assert_eq!(pg(&stmt).0, "DELETE FROM users WHERE users.id IN ($1, $2);");
    assert_eq!(
        stmt.sql(&MYSQL).unwrap().0,
        "DELETE FROM users WHERE users.id IN (?, ?);"
    );
    assert_eq!(
        u.table.delete().sql(&POSTGRES).unwrap_err(),
        BuildError::MissingWhere("DELETE")
    );
}

#[test]
fn test_lock_postgres() {
    let a = Table::new("a");
    let b = Table::with_schema("app", "b");

    assert_eq!(a.lock().sql(&POSTGRES).unwrap().0, "LOCK TABLE a;");
    let stmt = LockStatement::tables(&[&a, &b])
        .in_mode(TableLockMode::ShareRowExclusive)
        .nowait();
    let (sql, args) = stmt.sql(&POSTGRES).unwrap();
    assert_eq!(sql, "LOCK TABLE a, app.b IN SHARE ROW EXCLUSIVE MODE NOWAIT;");
    assert!(args.is_empty());
    assert_eq!(stmt.kind(), StatementKind::Lock);

    assert_eq!(
        a.lock().read().sql(&POSTGRES).unwrap_err(),
        BuildError::unsupported("postgres", "lock mode READ")
    );
}

#[test]
fn test_lock_mysql() {
    let a = Table::new("a");
    let b = Table::new("b").aliased("bb");
    assert_eq!(a.lock().write().sql(&MYSQL).unwrap().0, "LOCK TABLES a WRITE;");
    assert_eq!(
        LockStatement::tables(&[&a, &b]).read().sql(&MYSQL).unwrap().0,
        "LOCK TABLES a READ, b AS bb READ;"
    );

    assert!(a.lock().sql(&MYSQL).is_err());
    assert!(a.lock().write().nowait().sql(&MYSQL).is_err());
    assert!(a.lock().in_mode(TableLockMode::Exclusive).sql(&MYSQL).is_err());
}

#[test]
fn test_lock_unsupported_dialects() {
    let a = Table::new("a");
    for dialect in [&SQLITE as &dyn Dialect, &COCKROACH_DB] {
        let err = a.lock().in_mode(TableLockMode::Exclusive).sql(dialect).unwrap_err();
        assert_eq!(err, BuildError::unsupported(dialect.name(), "LOCK TABLE"));
    }
    assert_eq!(
        LockStatement::new(Vec::new()).sql(&POSTGRES).unwrap_err(),
        BuildError::EmptyClause {
            statement: "LOCK",
            clause: "table list",
        }
    );
}

#[test]
fn test_unlock() {
    let stmt = unlock_tables();
    assert_eq!(stmt.sql(&MYSQL).unwrap().0, "UNLOCK TABLES;");
    assert_eq!(stmt.kind(), StatementKind::Unlock);
    assert_eq!(
        stmt.sql(&POSTGRES).unwrap_err(),
        BuildError::unsupported("postgres", "UNLOCK TABLES")
    );
}

#[test]
fn test_debug_sql_single_terminator() {
    let u = users();
    let stmt = u.table.delete().where_expr(u.name.eq("o'neil").or(u.age.is_null()));
    assert_eq!(
        stmt.debug_sql(&POSTGRES).unwrap(),
        "DELETE FROM users WHERE ((users.name = 'o''neil') OR users.age IS NULL);"
    );
}

#[test]
fn test_statement_kind_display() {
    assert_eq!(StatementKind::Select.to_string(), "SELECT");
    assert_eq!(StatementKind::Unlock.as_str(), "UNLOCK");
}
