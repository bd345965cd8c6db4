//! PostgreSQL dialect.

use super::{Dialect, TableLockStyle, float_literal, hex};
use crate::error::BuildResult;
use crate::stmt::{RowLockStrength, TableLockMode};
use crate::value::Value;
use std::borrow::Cow;

/// PostgreSQL: `"` identifiers, `$n` placeholders, `LOCK TABLE … IN … MODE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Postgres;

/// Shared instance.
pub static POSTGRES: Postgres = Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> Cow<'static, str> {
        Cow::Owned(format!("${index}"))
    }

    fn literal(&self, value: &Value) -> BuildResult<String> {
        Ok(pg_literal(self, value))
    }

    fn supports_ilike(&self) -> bool {
        true
    }

    fn supports_row_lock(&self, _strength: RowLockStrength) -> bool {
        true
    }

    fn table_lock_style(&self) -> Option<TableLockStyle> {
        Some(TableLockStyle::LockTableInMode)
    }

    fn supports_table_lock_mode(&self, mode: TableLockMode) -> bool {
        !matches!(mode, TableLockMode::Read | TableLockMode::Write)
    }
}

/// Inline literal rendering shared with the CockroachDB dialect.
pub(super) fn pg_literal(dialect: &dyn Dialect, value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) if x.is_finite() => float_literal(*x),
        Value::Float(x) => {
            let special = if x.is_nan() {
                "NaN"
            } else if x.is_sign_positive() {
                "Infinity"
            } else {
                "-Infinity"
            };
            format!("'{special}'::float8")
        }
        Value::Text(s) => dialect.string_literal(s),
        Value::Bytes(b) => format!("'\\x{}'::bytea", hex(b)),
        Value::Date(_) => format!("'{value}'::date"),
        Value::Time(_) => format!("'{value}'::time"),
        Value::Timestamp(_) => format!("'{value}'::timestamp"),
        Value::TimestampTz(_) => format!("'{value}'::timestamptz"),
        Value::Json(v) => dialect.string_literal(&v.to_string()),
        Value::Uuid(_) => format!("'{value}'::uuid"),
    }
}
