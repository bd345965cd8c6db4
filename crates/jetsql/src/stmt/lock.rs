//! Explicit table locks.

use super::{Statement, StatementKind};
use crate::dialect::TableLockStyle;
use crate::error::{BuildError, BuildResult};
use crate::serialize::{Serialize, SerializeContext};
use crate::table::Table;

/// Table lock modes. The first eight are Postgres `LOCK TABLE … IN <mode> MODE`
/// strengths; `Read` and `Write` are MySQL `LOCK TABLES` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableLockMode {
    AccessShare,
    RowShare,
    RowExclusive,
    ShareUpdateExclusive,
    Share,
    ShareRowExclusive,
    Exclusive,
    AccessExclusive,
    Read,
    Write,
}

impl TableLockMode {
    /// Postgres lock strengths, weakest first.
    pub const POSTGRES_MODES: [TableLockMode; 8] = [
        Self::AccessShare,
        Self::RowShare,
        Self::RowExclusive,
        Self::ShareUpdateExclusive,
        Self::Share,
        Self::ShareRowExclusive,
        Self::Exclusive,
        Self::AccessExclusive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessShare => "ACCESS SHARE",
            Self::RowShare => "ROW SHARE",
            Self::RowExclusive => "ROW EXCLUSIVE",
            Self::ShareUpdateExclusive => "SHARE UPDATE EXCLUSIVE",
            Self::Share => "SHARE",
            Self::ShareRowExclusive => "SHARE ROW EXCLUSIVE",
            Self::Exclusive => "EXCLUSIVE",
            Self::AccessExclusive => "ACCESS EXCLUSIVE",
            Self::Read => "READ",
            Self::Write => "WRITE",
        }
    }
}

/// `LOCK TABLE …` / `LOCK TABLES …`
#[derive(Debug, Clone)]
pub struct LockStatement {
    tables: Vec<Table>,
    mode: Option<TableLockMode>,
    nowait: bool,
}

impl LockStatement {
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            tables,
            mode: None,
            nowait: false,
        }
    }

    /// Lock several tables in one statement.
    pub fn tables(tables: &[&Table]) -> Self {
        Self::new(tables.iter().map(|t| (*t).clone()).collect())
    }

    pub fn in_mode(mut self, mode: TableLockMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// MySQL `READ` lock.
    pub fn read(self) -> Self {
        self.in_mode(TableLockMode::Read)
    }

    /// MySQL `WRITE` lock.
    pub fn write(self) -> Self {
        self.in_mode(TableLockMode::Write)
    }

    pub fn nowait(mut self) -> Self {
        self.nowait = true;
        self
    }

    fn check_mode(&self, ctx: &SerializeContext<'_>) -> BuildResult<()> {
        let dialect = ctx.dialect();
        match self.mode {
            Some(mode) if !dialect.supports_table_lock_mode(mode) => Err(BuildError::unsupported(
                dialect.name(),
                format!("lock mode {}", mode.as_str()),
            )),
            _ => Ok(()),
        }
    }
}

impl Serialize for LockStatement {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        if self.tables.is_empty() {
            return Err(BuildError::EmptyClause {
                statement: "LOCK",
                clause: "table list",
            });
        }
        let dialect = ctx.dialect();
        match dialect.table_lock_style() {
            None => Err(BuildError::unsupported(dialect.name(), "LOCK TABLE")),
            Some(TableLockStyle::LockTableInMode) => {
                self.check_mode(ctx)?;
                ctx.write("LOCK TABLE ");
                ctx.write_list_with(&self.tables, ", ", |ctx, table| {
                    table.write_name(ctx);
                    Ok(())
                })?;
                if let Some(mode) = self.mode {
                    ctx.write(" IN ");
                    ctx.write(mode.as_str());
                    ctx.write(" MODE");
                }
                if self.nowait {
                    ctx.write(" NOWAIT");
                }
                Ok(())
            }
            Some(TableLockStyle::LockTables) => {
                let Some(mode) = self.mode else {
                    return Err(BuildError::unsupported(
                        dialect.name(),
                        "LOCK TABLES without READ or WRITE",
                    ));
                };
                if self.nowait {
                    return Err(BuildError::unsupported(dialect.name(), "LOCK TABLES … NOWAIT"));
                }
                self.check_mode(ctx)?;
                ctx.write("LOCK TABLES ");
                ctx.write_list_with(&self.tables, ", ", |ctx, table| {
                    table.serialize(ctx)?;
                    ctx.write(" ");
                    ctx.write(mode.as_str());
                    Ok(())
                })
            }
        }
    }
}

impl Statement for LockStatement {
    fn kind(&self) -> StatementKind {
        StatementKind::Lock
    }
}

/// `UNLOCK TABLES` (MySQL, MariaDB).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlockStatement;

pub fn unlock_tables() -> UnlockStatement {
    UnlockStatement
}

impl Serialize for UnlockStatement {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        let dialect = ctx.dialect();
        if dialect.table_lock_style() != Some(TableLockStyle::LockTables) {
            return Err(BuildError::unsupported(dialect.name(), "UNLOCK TABLES"));
        }
        ctx.write("UNLOCK TABLES");
        Ok(())
    }
}

impl Statement for UnlockStatement {
    fn kind(&self) -> StatementKind {
        StatementKind::Unlock
    }
}
