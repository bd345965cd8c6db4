use super::*;
use chrono::NaiveDate;

fn lit(dialect: &dyn Dialect, value: &Value) -> String {
    dialect.literal(value).unwrap()
}

#[test]
fn test_reserved_lists_are_sorted() {
    let mut sorted = COMMON_RESERVED.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, COMMON_RESERVED);
}

#[test]
fn test_plain_identifiers_stay_bare() {
    assert_eq!(POSTGRES.identifier("table1"), "table1");
    assert_eq!(POSTGRES.identifier("_col_2"), "_col_2");
    assert_eq!(MYSQL.identifier("col_bool"), "col_bool");
}

#[test]
fn test_identifier_quoting() {
    assert_eq!(POSTGRES.identifier("ColBool"), "\"ColBool\"");
    assert_eq!(POSTGRES.identifier("user"), "\"user\"");
    assert_eq!(POSTGRES.identifier("2col"), "\"2col\"");
    assert_eq!(POSTGRES.identifier("table1.col_bool"), "\"table1.col_bool\"");
    assert_eq!(MYSQL.identifier("order"), "`order`");
    // MySQL-only reserved word
    assert_eq!(MYSQL.identifier("key"), "`key`");
    assert_eq!(POSTGRES.identifier("key"), "key");
}

#[test]
fn test_quote_doubling() {
    assert_eq!(POSTGRES.quote_identifier("a\"b"), "\"a\"\"b\"");
    assert_eq!(MYSQL.quote_identifier("a`b"), "`a``b`");
}

#[test]
fn test_placeholders() {
    assert_eq!(POSTGRES.placeholder(3), "$3");
    assert_eq!(COCKROACH_DB.placeholder(1), "$1");
    assert_eq!(MYSQL.placeholder(3), "?");
    assert_eq!(SQLITE.placeholder(3), "?");
}

#[test]
fn test_string_escaping() {
    assert_eq!(lit(&POSTGRES, &Value::from("it's")), "'it''s'");
    assert_eq!(lit(&POSTGRES, &Value::from("a\\b")), "'a\\b'");
    assert_eq!(lit(&MYSQL, &Value::from("it's a\\b")), "'it''s a\\\\b'");
    assert_eq!(lit(&SQLITE, &Value::from("it's")), "'it''s'");
}

#[test]
fn test_scalar_literals() {
    assert_eq!(lit(&POSTGRES, &Value::Bool(true)), "TRUE");
    assert_eq!(lit(&MYSQL, &Value::Bool(false)), "FALSE");
    assert_eq!(lit(&POSTGRES, &Value::Int(-12)), "-12");
    assert_eq!(lit(&POSTGRES, &Value::Float(1.11)), "1.11");
    assert_eq!(lit(&POSTGRES, &Value::Float(2.0)), "2.0");
    assert_eq!(lit(&POSTGRES, &Value::Float(f64::NAN)), "'NaN'::float8");
    assert_eq!(lit(&POSTGRES, &Value::Null), "NULL");
}

#[test]
fn test_non_finite_floats() {
    assert_eq!(lit(&POSTGRES, &Value::Float(f64::INFINITY)), "'Infinity'::float8");
    assert_eq!(lit(&COCKROACH_DB, &Value::Float(f64::NEG_INFINITY)), "'-Infinity'::float8");

    for dialect in [&MYSQL as &dyn Dialect, &SQLITE] {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = dialect.literal(&Value::Float(x)).unwrap_err();
            assert!(matches!(err, BuildError::DialectUnsupported { .. }), "{err}");
            assert!(dialect.check_value(&Value::Float(x)).is_err());
        }
        assert!(dialect.check_value(&Value::Float(0.5)).is_ok());
    }
}

#[test]
fn test_bytes_and_dates() {
    let bytes = Value::Bytes(vec![0xde, 0xad]);
    assert_eq!(lit(&POSTGRES, &bytes), "'\\xdead'::bytea");
    assert_eq!(lit(&MYSQL, &bytes), "X'dead'");

    let date = Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    assert_eq!(lit(&POSTGRES, &date), "'2024-01-31'::date");
    assert_eq!(lit(&SQLITE, &date), "'2024-01-31'");
}

#[test]
fn test_uuid_literals() {
    let id = uuid::Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
    let value = Value::from(id);
    assert_eq!(
        lit(&POSTGRES, &value),
        "'67e55044-10b1-426f-9247-bb680e5fe0c8'::uuid"
    );
    assert_eq!(
        lit(&COCKROACH_DB, &value),
        "'67e55044-10b1-426f-9247-bb680e5fe0c8'::uuid"
    );
    assert_eq!(lit(&MYSQL, &value), "'67e55044-10b1-426f-9247-bb680e5fe0c8'");
}

#[test]
fn test_lock_support_matrix() {
    assert_eq!(
        POSTGRES.table_lock_style(),
        Some(TableLockStyle::LockTableInMode)
    );
    assert_eq!(MYSQL.table_lock_style(), Some(TableLockStyle::LockTables));
    assert_eq!(SQLITE.table_lock_style(), None);
    assert_eq!(COCKROACH_DB.table_lock_style(), None);

    assert!(POSTGRES.supports_table_lock_mode(TableLockMode::AccessExclusive));
    assert!(!POSTGRES.supports_table_lock_mode(TableLockMode::Read));
    assert!(MYSQL.supports_table_lock_mode(TableLockMode::Write));
    assert!(!MYSQL.supports_table_lock_mode(TableLockMode::Share));

    assert!(MYSQL.supports_row_lock(RowLockStrength::Update));
    assert!(!MYSQL.supports_row_lock(RowLockStrength::KeyShare));
    assert!(!SQLITE.supports_row_lock(RowLockStrength::Update));
}
