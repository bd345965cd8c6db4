//! SQL dialect policies.
//!
//! Statement trees are dialect-neutral. A [`Dialect`] decides identifier
//! quoting, placeholder syntax, inline literal rendering for debug SQL, and
//! which clauses and lock modes the target engine accepts.

mod cockroach;
mod mysql;
mod postgres;
mod sqlite;

pub use cockroach::{COCKROACH_DB, CockroachDb};
pub use mysql::{MYSQL, MySql};
pub use postgres::{POSTGRES, Postgres};
pub use sqlite::{SQLITE, Sqlite};

use crate::error::{BuildError, BuildResult};
use crate::stmt::{RowLockStrength, TableLockMode};
use crate::value::Value;
use std::borrow::Cow;
use std::fmt;

/// Shape of the table-lock statement a dialect understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLockStyle {
    /// `LOCK TABLE t IN <mode> MODE [NOWAIT]` (Postgres).
    LockTableInMode,
    /// `LOCK TABLES t READ|WRITE` / `UNLOCK TABLES` (MySQL, MariaDB).
    LockTables,
}

/// How a dialect spells null-safe (in)equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullSafeEquality {
    /// `a IS DISTINCT FROM b` / `a IS NOT DISTINCT FROM b`
    DistinctFrom,
    /// `a IS NOT b` / `a IS b`
    Is,
    /// `NOT (a <=> b)` / `(a <=> b)`
    Spaceship,
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Placeholder for the argument at 1-based `index`.
    fn placeholder(&self, index: usize) -> Cow<'static, str>;

    /// Whether `word` (lowercase) must be quoted when used as an identifier.
    fn is_reserved(&self, word: &str) -> bool {
        COMMON_RESERVED.binary_search(&word).is_ok()
    }

    /// Reject values the engine cannot represent. Applied to bound arguments
    /// and inline literals alike.
    fn check_value(&self, value: &Value) -> BuildResult<()> {
        let _ = value;
        Ok(())
    }

    /// Render a value inline for debug SQL. Fails for anything
    /// [`Dialect::check_value`] rejects.
    fn literal(&self, value: &Value) -> BuildResult<String>;

    /// Quote a string literal.
    fn string_literal(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Operator used for string concatenation, or `None` to use `CONCAT(a, b)`.
    fn concat_operator(&self) -> Option<&'static str> {
        Some("||")
    }

    fn null_safe_equality(&self) -> NullSafeEquality {
        NullSafeEquality::DistinctFrom
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_on_conflict(&self) -> bool {
        true
    }

    fn supports_full_join(&self) -> bool {
        true
    }

    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    fn supports_ilike(&self) -> bool {
        false
    }

    /// Whether `OFFSET` may appear without `LIMIT`.
    fn supports_offset_without_limit(&self) -> bool {
        true
    }

    fn supports_row_lock(&self, strength: RowLockStrength) -> bool;

    /// Table-lock statement style, `None` when the engine has no table locks.
    fn table_lock_style(&self) -> Option<TableLockStyle> {
        None
    }

    fn supports_table_lock_mode(&self, mode: TableLockMode) -> bool {
        let _ = mode;
        false
    }

    /// Always-quoted identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(quote);
        for c in name.chars() {
            if c == quote {
                out.push(quote);
            }
            out.push(c);
        }
        out.push(quote);
        out
    }

    /// Identifier quoted only when it is not a plain lowercase word or is reserved.
    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if is_plain_identifier(name) && !self.is_reserved(name) {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(self.quote_identifier(name))
        }
    }
}

/// Reserved words shared by every supported dialect. Sorted for binary search.
pub(crate) const COMMON_RESERVED: &[&str] = &[
    "all", "and", "any", "as", "asc", "between", "both", "by", "case", "cast", "check", "collate",
    "column", "constraint", "create", "cross", "current_date", "current_time",
    "current_timestamp", "current_user", "default", "delete", "desc", "distinct", "do", "else",
    "end", "except", "exists", "false", "fetch", "for", "foreign", "from", "full", "grant",
    "group", "having", "in", "inner", "insert", "intersect", "into", "is", "join", "leading",
    "left", "like", "limit", "lock", "natural", "not", "null", "offset", "on", "only", "or",
    "order", "outer", "primary", "references", "right", "select", "set", "some", "table", "then",
    "to", "trailing", "true", "union", "unique", "update", "user", "using", "values", "when",
    "where", "window", "with",
];

/// `[a-z_][a-z0-9_]*`
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Float rendering shared by the dialects; keeps a decimal point on integral values.
pub(crate) fn float_literal(x: f64) -> String {
    format!("{x:?}")
}

/// NaN and the infinities have no literal and no column type to land in.
pub(crate) fn finite_floats_only(dialect: &'static str, value: &Value) -> BuildResult<()> {
    match value {
        Value::Float(x) if !x.is_finite() => {
            Err(BuildError::unsupported(dialect, format!("non-finite float {x}")))
        }
        _ => Ok(()),
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests;
