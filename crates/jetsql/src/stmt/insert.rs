//! INSERT statements.

use super::{SelectStatement, Statement, StatementKind, write_returning};
use crate::error::{BuildError, BuildResult};
use crate::expr::{Expr, Projectable, Projection};
use crate::serialize::{Serialize, SerializeContext};
use crate::table::{AnyColumn, Assignment, ColumnRef, Table};

#[derive(Debug, Clone)]
enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Select(Box<SelectStatement>),
}

#[derive(Debug, Clone)]
enum ConflictAction {
    Nothing,
    Update(Vec<Assignment>),
}

#[derive(Debug, Clone)]
struct OnConflict {
    target: Vec<ColumnRef>,
    action: ConflictAction,
}

/// An INSERT statement.
#[derive(Debug, Clone)]
pub struct InsertStatement {
    table: Table,
    columns: Vec<ColumnRef>,
    source: Option<InsertSource>,
    on_conflict: Option<OnConflict>,
    returning: Vec<Projection>,
}

fn column_refs(columns: &[&dyn AnyColumn]) -> Vec<ColumnRef> {
    columns.iter().map(|c| c.column_ref().clone()).collect()
}

impl InsertStatement {
    pub fn new(table: Table, columns: &[&dyn AnyColumn]) -> Self {
        Self {
            table,
            columns: column_refs(columns),
            source: None,
            on_conflict: None,
            returning: Vec::new(),
        }
    }

    /// Append a VALUES row. Its length must match the column list.
    pub fn values(mut self, row: impl IntoIterator<Item = Expr>) -> Self {
        let row: Vec<Expr> = row.into_iter().collect();
        match &mut self.source {
            Some(InsertSource::Values(rows)) => rows.push(row),
            _ => self.source = Some(InsertSource::Values(vec![row])),
        }
        self
    }

    /// `INSERT … SELECT`; replaces any VALUES rows.
    pub fn from_select(mut self, select: SelectStatement) -> Self {
        self.source = Some(InsertSource::Select(Box::new(select)));
        self
    }

    /// `ON CONFLICT (<target>) DO NOTHING`
    pub fn on_conflict_do_nothing(mut self, target: &[&dyn AnyColumn]) -> Self {
        self.on_conflict = Some(OnConflict {
            target: column_refs(target),
            action: ConflictAction::Nothing,
        });
        self
    }

    /// `ON CONFLICT (<target>) DO UPDATE SET …`
    pub fn on_conflict_do_update(
        mut self,
        target: &[&dyn AnyColumn],
        assignments: impl IntoIterator<Item = Assignment>,
    ) -> Self {
        self.on_conflict = Some(OnConflict {
            target: column_refs(target),
            action: ConflictAction::Update(assignments.into_iter().collect()),
        });
        self
    }

    pub fn returning(mut self, projections: &[&dyn Projectable]) -> Self {
        self.returning
            .extend(projections.iter().map(|p| p.projection()));
        self
    }

    fn write_values(&self, rows: &[Vec<Expr>], ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        if rows.is_empty() {
            return Err(BuildError::EmptyClause {
                statement: "INSERT",
                clause: "VALUES",
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(BuildError::ValueCountMismatch {
                    row: i + 1,
                    expected: self.columns.len(),
                    got: row.len(),
                });
            }
        }

        ctx.write(" VALUES ");
        ctx.write_list_with(rows, ", ", |ctx, row| {
            ctx.write("(");
            ctx.write_list(row, ", ")?;
            ctx.write(")");
            Ok(())
        })
    }

    fn write_on_conflict(&self, conflict: &OnConflict, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        let dialect = ctx.dialect();
        if !dialect.supports_on_conflict() {
            return Err(BuildError::unsupported(dialect.name(), "ON CONFLICT"));
        }
        ctx.write(" ON CONFLICT");
        if !conflict.target.is_empty() {
            ctx.write(" (");
            ctx.write_list_with(&conflict.target, ", ", |ctx, column| {
                column.write_bare(ctx);
                Ok(())
            })?;
            ctx.write(")");
        }
        match &conflict.action {
            ConflictAction::Nothing => ctx.write(" DO NOTHING"),
            ConflictAction::Update(assignments) => {
                if assignments.is_empty() {
                    return Err(BuildError::EmptyClause {
                        statement: "INSERT",
                        clause: "ON CONFLICT DO UPDATE SET",
                    });
                }
                ctx.write(" DO UPDATE SET ");
                ctx.write_list(assignments, ", ")?;
            }
        }
        Ok(())
    }
}

impl Serialize for InsertStatement {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        if self.columns.is_empty() {
            return Err(BuildError::EmptyClause {
                statement: "INSERT",
                clause: "column list",
            });
        }

        // The target is written without its alias, so only the bare name qualifies.
        ctx.scoped(vec![self.table.name_arc()], |ctx| self.write_body(ctx))
    }
}

impl InsertStatement {
    fn write_body(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        ctx.write("INSERT INTO ");
        self.table.write_name(ctx);
        ctx.write(" (");
        ctx.write_list_with(&self.columns, ", ", |ctx, column| {
            column.write_bare(ctx);
            Ok(())
        })?;
        ctx.write(")");

        match &self.source {
            Some(InsertSource::Values(rows)) => self.write_values(rows, ctx)?,
            Some(InsertSource::Select(select)) => {
                ctx.write(" ");
                select.serialize(ctx)?;
            }
            None => self.write_values(&[], ctx)?,
        }

        if let Some(conflict) = &self.on_conflict {
            self.write_on_conflict(conflict, ctx)?;
        }
        write_returning(ctx, &self.returning)
    }
}

impl Statement for InsertStatement {
    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }
}
