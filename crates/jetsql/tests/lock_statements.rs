use jetsql::prelude::*;
use jetsql::LockStatement;

fn address() -> Table {
    Table::with_schema("dvds", "address")
}

#[test]
fn postgres_lock_every_mode() {
    for mode in TableLockMode::POSTGRES_MODES {
        let stmt = address().lock().in_mode(mode);
        let expected = format!("LOCK TABLE dvds.address IN {} MODE;", mode.as_str());
        assert_eq!(stmt.debug_sql(&POSTGRES).unwrap(), expected);

        let (sql, args) = stmt.sql(&POSTGRES).unwrap();
        assert_eq!(sql, expected);
        assert!(args.is_empty());
    }
}

#[test]
fn postgres_lock_every_mode_nowait() {
    for mode in TableLockMode::POSTGRES_MODES {
        let stmt = address().lock().in_mode(mode).nowait();
        assert_eq!(
            stmt.debug_sql(&POSTGRES).unwrap(),
            format!("LOCK TABLE dvds.address IN {} MODE NOWAIT;", mode.as_str())
        );
    }
}

#[test]
fn postgres_mode_names() {
    let names: Vec<_> = TableLockMode::POSTGRES_MODES
        .iter()
        .map(|mode| mode.as_str())
        .collect();
    assert_eq!(
        names,
        [
            "ACCESS SHARE",
            "ROW SHARE",
            "ROW EXCLUSIVE",
            "SHARE UPDATE EXCLUSIVE",
            "SHARE",
            "SHARE ROW EXCLUSIVE",
            "EXCLUSIVE",
            "ACCESS EXCLUSIVE",
        ]
    );
}

#[test]
fn postgres_lock_several_tables() {
    let customer = Table::with_schema("dvds", "customer");
    let stmt = LockStatement::tables(&[&address(), &customer]).in_mode(TableLockMode::Exclusive);
    assert_eq!(
        stmt.sql(&POSTGRES).unwrap().0,
        "LOCK TABLE dvds.address, dvds.customer IN EXCLUSIVE MODE;"
    );
}

#[test]
fn mysql_lock_read_write() {
    let customer = Table::with_schema("dvds", "customer");
    assert_eq!(
        customer.lock().read().sql(&MYSQL).unwrap().0,
        "LOCK TABLES dvds.customer READ;"
    );
    assert_eq!(
        customer.lock().write().sql(&MYSQL).unwrap().0,
        "LOCK TABLES dvds.customer WRITE;"
    );
}

#[test]
fn mysql_unlock_tables() {
    let (sql, args) = unlock_tables().sql(&MYSQL).unwrap();
    assert_eq!(sql, "UNLOCK TABLES;");
    assert!(args.is_empty());
}

#[test]
fn cockroach_and_sqlite_reject_locks() {
    for dialect in [&COCKROACH_DB as &dyn Dialect, &SQLITE] {
        let err = address()
            .lock()
            .in_mode(TableLockMode::AccessShare)
            .sql(dialect)
            .unwrap_err();
        assert!(matches!(err, BuildError::DialectUnsupported { .. }), "{err}");
        assert!(unlock_tables().sql(dialect).is_err());
    }
}

#[test]
fn modes_do_not_cross_dialects() {
    assert!(address().lock().write().sql(&POSTGRES).is_err());
    assert!(address().lock().in_mode(TableLockMode::RowShare).sql(&MYSQL).is_err());
}
