//! Statement trees.
//!
//! Every statement is a plain value built with consuming builder methods.
//! Serialization only reads the tree, so a statement can be rendered any
//! number of times, from any number of threads.

mod delete;
mod insert;
mod lock;
mod select;
mod update;

pub use delete::DeleteStatement;
pub use insert::InsertStatement;
pub use lock::{LockStatement, TableLockMode, UnlockStatement, unlock_tables};
pub use select::{LockWait, RowLock, RowLockStrength, SelectStatement, select};
pub use update::UpdateStatement;

use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::expr::Projection;
use crate::serialize::{Serialize, SerializeContext, serialize};
use crate::value::Value;
use serde::Serialize as SerdeSerialize;
use std::fmt;

/// The kind of top-level statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerdeSerialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementKind {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// LOCK TABLE(S)
    Lock,
    /// UNLOCK TABLES
    Unlock,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Lock => "LOCK",
            Self::Unlock => "UNLOCK",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete, executable statement.
pub trait Statement: Serialize + Send + Sync {
    fn kind(&self) -> StatementKind;

    /// Placeholder SQL, terminated by a single `;`, and its ordered arguments.
    fn sql(&self, dialect: &dyn Dialect) -> BuildResult<(String, Vec<Value>)> {
        let (mut sql, args) = serialize(self, dialect, false)?;
        sql.push(';');
        Ok((sql, args))
    }

    /// SQL with every argument inlined as a dialect-escaped literal.
    fn debug_sql(&self, dialect: &dyn Dialect) -> BuildResult<String> {
        let (mut sql, _) = serialize(self, dialect, true)?;
        sql.push(';');
        Ok(sql)
    }
}

/// ` RETURNING …` shared by INSERT, UPDATE and DELETE.
pub(crate) fn write_returning(
    ctx: &mut SerializeContext<'_>,
    returning: &[Projection],
) -> BuildResult<()> {
    if returning.is_empty() {
        return Ok(());
    }
    let dialect = ctx.dialect();
    if !dialect.supports_returning() {
        return Err(BuildError::unsupported(dialect.name(), "RETURNING"));
    }
    ctx.write(" RETURNING ");
    ctx.write_list(returning, ", ")
}

#[cfg(test)]
mod tests;
