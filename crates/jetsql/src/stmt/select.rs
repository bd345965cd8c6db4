//! SELECT statements.

use super::{Statement, StatementKind};
use crate::error::{BuildError, BuildResult};
use crate::expr::{
    AnyExpression, BinaryOp, Bool, Expr, Expression, OrderBy, Projectable, Projection, SqlType,
};
use crate::serialize::{Serialize, SerializeContext};
use crate::table::{DerivedKind, DerivedTable, Readable, TableSource};
use crate::value::Value;
use std::sync::Arc;

/// Row-lock strength of a `FOR …` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLockStrength {
    Update,
    NoKeyUpdate,
    Share,
    KeyShare,
}

impl RowLockStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "UPDATE",
            Self::NoKeyUpdate => "NO KEY UPDATE",
            Self::Share => "SHARE",
            Self::KeyShare => "KEY SHARE",
        }
    }
}

/// Behaviour when a row is already locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockWait {
    #[default]
    Wait,
    NoWait,
    SkipLocked,
}

/// `FOR UPDATE [NOWAIT | SKIP LOCKED]` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLock {
    strength: RowLockStrength,
    wait: LockWait,
}

impl RowLock {
    pub fn new(strength: RowLockStrength) -> Self {
        Self {
            strength,
            wait: LockWait::Wait,
        }
    }

    pub fn update() -> Self {
        Self::new(RowLockStrength::Update)
    }

    pub fn no_key_update() -> Self {
        Self::new(RowLockStrength::NoKeyUpdate)
    }

    pub fn share() -> Self {
        Self::new(RowLockStrength::Share)
    }

    pub fn key_share() -> Self {
        Self::new(RowLockStrength::KeyShare)
    }

    pub fn nowait(mut self) -> Self {
        self.wait = LockWait::NoWait;
        self
    }

    pub fn skip_locked(mut self) -> Self {
        self.wait = LockWait::SkipLocked;
        self
    }
}

impl Serialize for RowLock {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        let dialect = ctx.dialect();
        if !dialect.supports_row_lock(self.strength) {
            return Err(BuildError::unsupported(
                dialect.name(),
                format!("FOR {}", self.strength.as_str()),
            ));
        }
        ctx.write("FOR ");
        ctx.write(self.strength.as_str());
        match self.wait {
            LockWait::Wait => {}
            LockWait::NoWait => ctx.write(" NOWAIT"),
            LockWait::SkipLocked => ctx.write(" SKIP LOCKED"),
        }
        Ok(())
    }
}

/// Start a SELECT with the given projection list.
///
/// ```
/// use jetsql::prelude::*;
///
/// let users = Table::new("users");
/// let id = users.column::<Integer>("id");
/// let name = users.column::<Text>("name");
///
/// let stmt = select(&[&id, &name]).from(&users).where_expr(id.eq(7));
/// let (sql, args) = stmt.sql(&POSTGRES).unwrap();
/// assert_eq!(
///     sql,
///     "SELECT users.id AS \"users.id\", users.name AS \"users.name\" \
///      FROM users WHERE (users.id = $1);"
/// );
/// assert_eq!(args, vec![Value::Int(7)]);
/// ```
pub fn select(projections: &[&dyn Projectable]) -> SelectStatement {
    SelectStatement::new(projections)
}

fn and(existing: Option<Expr>, cond: Expr) -> Expr {
    match existing {
        Some(prev) => Expr::binary(BinaryOp::And, prev, cond),
        None => cond,
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, Default)]
pub struct SelectStatement {
    ctes: Vec<DerivedTable>,
    distinct: bool,
    projections: Vec<Projection>,
    from: Option<TableSource>,
    filter: Option<Expr>,
    group_by: Vec<Expr>,
    having: Option<Expr>,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
    lock: Option<RowLock>,
}

impl SelectStatement {
    pub fn new(projections: &[&dyn Projectable]) -> Self {
        Self {
            projections: projections.iter().map(|p| p.projection()).collect(),
            ..Self::default()
        }
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    /// Append one more projection.
    pub fn project(mut self, projection: &dyn Projectable) -> Self {
        self.projections.push(projection.projection());
        self
    }

    /// Prefix the statement with `WITH …`. Pass tables built with [`SelectStatement::as_cte`].
    pub fn with(mut self, ctes: &[&DerivedTable]) -> Self {
        self.ctes.extend(ctes.iter().map(|cte| (*cte).clone()));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn from<R: Readable + ?Sized>(mut self, source: &R) -> Self {
        self.from = Some(source.source());
        self
    }

    /// Add a WHERE condition; repeated calls are ANDed together.
    pub fn where_expr(mut self, cond: impl Into<Expression<Bool>>) -> Self {
        self.filter = Some(and(self.filter.take(), cond.into().into_expr()));
        self
    }

    pub fn group_by(mut self, exprs: &[&dyn AnyExpression]) -> Self {
        self.group_by.extend(exprs.iter().map(|e| e.to_expr()));
        self
    }

    /// Add a HAVING condition; repeated calls are ANDed together.
    pub fn having(mut self, cond: impl Into<Expression<Bool>>) -> Self {
        self.having = Some(and(self.having.take(), cond.into().into_expr()));
        self
    }

    pub fn order_by(mut self, items: impl IntoIterator<Item = OrderBy>) -> Self {
        self.order_by.extend(items);
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Row-lock clause (`FOR UPDATE`, `FOR SHARE SKIP LOCKED`, ...).
    pub fn for_lock(mut self, lock: RowLock) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Wrap this SELECT as `(…) AS alias` for use in FROM.
    ///
    /// Fails when a projection has no name or two projections share one.
    pub fn as_table(&self, alias: &str) -> BuildResult<DerivedTable> {
        DerivedTable::new(self.clone(), alias, DerivedKind::SubQuery)
    }

    /// Wrap this SELECT as a common table expression named `name`.
    pub fn as_cte(&self, name: &str) -> BuildResult<DerivedTable> {
        DerivedTable::new(self.clone(), name, DerivedKind::Cte)
    }

    /// Use this SELECT as a scalar sub-query of type `T`.
    pub fn scalar<T: SqlType>(&self) -> Expression<T> {
        Expression::from_expr(Expr::SubQuery(Arc::new(self.clone())))
    }
}

impl Serialize for SelectStatement {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        if self.projections.is_empty() {
            return Err(BuildError::EmptyProjection);
        }

        let mut sources = Vec::new();
        if let Some(from) = &self.from {
            from.collect_scope(&mut sources);
        }
        ctx.scoped(sources, |ctx| self.write_body(ctx))
    }
}

impl SelectStatement {
    fn write_body(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        if !self.ctes.is_empty() {
            ctx.write("WITH ");
            ctx.write_list_with(&self.ctes, ", ", |ctx, cte| cte.write_definition(ctx))?;
            ctx.write(" ");
        }

        ctx.write("SELECT ");
        if self.distinct {
            ctx.write("DISTINCT ");
        }
        ctx.write_list(&self.projections, ", ")?;

        if let Some(from) = &self.from {
            ctx.write(" FROM ");
            from.serialize(ctx)?;
        }

        if let Some(filter) = &self.filter {
            ctx.write(" WHERE ");
            filter.serialize(ctx)?;
        }

        if !self.group_by.is_empty() {
            ctx.write(" GROUP BY ");
            ctx.write_list(&self.group_by, ", ")?;
        }

        if let Some(having) = &self.having {
            ctx.write(" HAVING ");
            having.serialize(ctx)?;
        }

        if !self.order_by.is_empty() {
            ctx.write(" ORDER BY ");
            ctx.write_list(&self.order_by, ", ")?;
        }

        if self.offset.is_some() && self.limit.is_none() {
            let dialect = ctx.dialect();
            if !dialect.supports_offset_without_limit() {
                return Err(BuildError::unsupported(dialect.name(), "OFFSET without LIMIT"));
            }
        }
        if let Some(limit) = self.limit {
            ctx.write(" LIMIT ");
            ctx.write_value(&Value::Int(limit))?;
        }
        if let Some(offset) = self.offset {
            ctx.write(" OFFSET ");
            ctx.write_value(&Value::Int(offset))?;
        }

        if let Some(lock) = &self.lock {
            ctx.write(" ");
            lock.serialize(ctx)?;
        }
        Ok(())
    }
}

impl Statement for SelectStatement {
    fn kind(&self) -> StatementKind {
        StatementKind::Select
    }
}
