//! MySQL / MariaDB dialect.

use super::{
    COMMON_RESERVED, Dialect, NullSafeEquality, TableLockStyle, finite_floats_only, float_literal,
    hex,
};
use crate::error::BuildResult;
use crate::stmt::{RowLockStrength, TableLockMode};
use crate::value::Value;
use std::borrow::Cow;

/// MySQL and MariaDB: backtick identifiers, `?` placeholders, `LOCK TABLES`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySql;

/// Shared instance.
pub static MYSQL: MySql = MySql;

/// Words reserved by MySQL on top of the common set. Sorted.
const MYSQL_RESERVED: &[&str] = &[
    "div", "dual", "interval", "key", "keys", "match", "mod", "range", "rank", "read", "regexp",
    "row", "rows", "write", "xor",
];

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn placeholder(&self, _index: usize) -> Cow<'static, str> {
        Cow::Borrowed("?")
    }

    fn is_reserved(&self, word: &str) -> bool {
        COMMON_RESERVED.binary_search(&word).is_ok()
            || MYSQL_RESERVED.binary_search(&word).is_ok()
    }

    // Backslash is an escape character under the default sql_mode.
    fn string_literal(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for c in s.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                '\0' => out.push_str("\\0"),
                _ => out.push(c),
            }
        }
        out.push('\'');
        out
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

    fn concat_operator(&self) -> Option<&'static str> {
        None
    }

    fn null_safe_equality(&self) -> NullSafeEquality {
        NullSafeEquality::Spaceship
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_on_conflict(&self) -> bool {
        false
    }

    fn supports_full_join(&self) -> bool {
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn supports_offset_without_limit(&self) -> bool {
        false
    }

    fn supports_row_lock(&self, strength: RowLockStrength) -> bool {
        matches!(strength, RowLockStrength::Update | RowLockStrength::Share)
    }

    fn table_lock_style(&self) -> Option<TableLockStyle> {
        Some(TableLockStyle::LockTables)
    }

    fn supports_table_lock_mode(&self, mode: TableLockMode) -> bool {
        matches!(mode, TableLockMode::Read | TableLockMode::Write)
    }
}
