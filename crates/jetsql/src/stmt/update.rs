//! UPDATE statements.

use super::{Statement, StatementKind, write_returning};
use crate::error::{BuildError, BuildResult};
use crate::expr::{BinaryOp, Bool, Expr, Expression, Projectable, Projection};
use crate::serialize::{Serialize, SerializeContext};
use crate::table::{Assignment, Table};

/// An UPDATE statement. Serialization refuses to emit it without WHERE.
#[derive(Debug, Clone)]
pub struct UpdateStatement {
    table: Table,
    assignments: Vec<Assignment>,
    filter: Option<Expr>,
    returning: Vec<Projection>,
}

impl UpdateStatement {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            filter: None,
            returning: Vec::new(),
        }
    }

    /// Add a `column = value` pair; build it with `Column::set`.
    pub fn set(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
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

impl Serialize for UpdateStatement {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        if self.assignments.is_empty() {
            return Err(BuildError::EmptyClause {
                statement: "UPDATE",
                clause: "SET",
            });
        }
        let Some(filter) = &self.filter else {
            return Err(BuildError::MissingWhere("UPDATE"));
        };

        ctx.scoped(vec![self.table.scope_name()], |ctx| {
            ctx.write("UPDATE ");
            self.table.serialize(ctx)?;
            ctx.write(" SET ");
            ctx.write_list(&self.assignments, ", ")?;
            ctx.write(" WHERE ");
            filter.serialize(ctx)?;
            write_returning(ctx, &self.returning)
        })
    }
}

impl Statement for UpdateStatement {
    fn kind(&self) -> StatementKind {
        StatementKind::Update
    }
}
