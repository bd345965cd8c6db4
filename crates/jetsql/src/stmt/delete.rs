//! DELETE statements.

use super::{Statement, StatementKind, write_returning};
use crate::error::{BuildError, BuildResult};
use crate::expr::{BinaryOp, Bool, Expr, Expression, Projectable, Projection};
use crate::serialize::{Serialize, SerializeContext};
use crate::table::Table;

/// A DELETE statement. Serialization refuses to emit it without WHERE.
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    table: Table,
    filter: Option<Expr>,
    returning: Vec<Projection>,
}

impl DeleteStatement {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            filter: None,
            returning: Vec::new(),
        }
    }

    /// Add a WHERE condition; repeated calls are ANDed together.
    pub fn where_expr(mut self, cond: impl Into<Expression<Bool>>) -> Self {
        let cond = cond.into().into_expr();
        self.filter = Some(match self.filter.take() {
            Some(prev) => Expr::binary(BinaryOp::And, prev, cond),
            None => cond,
        });
        self
    }

    pub fn returning(mut self, projections: &[&dyn Projectable]) -> Self {
        self.returning
            .extend(projections.iter().map(|p| p.projection()));
        self
    }
}

impl Serialize for DeleteStatement {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        let Some(filter) = &self.filter else {
            return Err(BuildError::MissingWhere("DELETE"));
        };

        ctx.scoped(vec![self.table.scope_name()], |ctx| {
            ctx.write("DELETE FROM ");
            self.table.serialize(ctx)?;
            ctx.write(" WHERE ");
            filter.serialize(ctx)?;
            write_returning(ctx, &self.returning)
        })
    }
}

impl Statement for DeleteStatement {
    fn kind(&self) -> StatementKind {
        StatementKind::Delete
    }
}
