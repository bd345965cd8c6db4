//! SQLite dialect.

use super::{Dialect, NullSafeEquality, finite_floats_only, float_literal, hex};
use crate::error::BuildResult;
use crate::stmt::RowLockStrength;
use crate::value::Value;
use std::borrow::Cow;

/// SQLite: `"` identifiers, `?` placeholders, no table or row locks.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sqlite;

/// Shared instance.
pub static SQLITE: Sqlite = Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> Cow<'static, str> {
        Cow::Borrowed("?")
    }

    fn check_value(&self, value: &Value) -> BuildResult<()> {
        finite_floats_only(self.name(), value)
    }

    fn literal(&self, value: &Value) -> BuildResult<String> {
        self.check_value(value)?;
        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) => float_literal(*x),
            Value::Text(s) => self.string_literal(s),
            Value::Bytes(b) => format!("X'{}'", hex(b)),
            Value::Date(_)
            | Value::Time(_)
            | Value::Timestamp(_)
            | Value::TimestampTz(_)
            | Value::Uuid(_) => self.string_literal(&value.to_string()),
            Value::Json(v) => self.string_literal(&v.to_string()),
        })
    }

    fn null_safe_equality(&self) -> NullSafeEquality {
        NullSafeEquality::Is
    }

    fn supports_offset_without_limit(&self) -> bool {
        false
    }

    fn supports_row_lock(&self, _strength: RowLockStrength) -> bool {
        false
    }
}
