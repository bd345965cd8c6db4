//! Derived tables: a SELECT wrapped under an alias, either inline
//! (`(SELECT …) AS alias`) or as a common table expression.

use super::column::{Column, ColumnRef};
use super::ColumnSource;
use crate::error::{BuildError, BuildResult};
use crate::expr::{SqlType, TypeTag};
use crate::serialize::{Serialize, SerializeContext};
use crate::stmt::SelectStatement;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedKind {
    /// `(SELECT …) AS alias` in FROM.
    SubQuery,
    /// `WITH alias AS (SELECT …)`, referenced by name.
    Cte,
}

/// An output column of a derived table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedColumn {
    name: Arc<str>,
    tag: TypeTag,
}

impl DerivedColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }
}

#[derive(Debug)]
struct Inner {
    alias: Arc<str>,
    kind: DerivedKind,
    select: SelectStatement,
    columns: Vec<DerivedColumn>,
}

/// A SELECT exposed as a table. The output-column alias map is resolved once,
/// on construction.
#[derive(Debug, Clone)]
pub struct DerivedTable {
    inner: Arc<Inner>,
}

impl DerivedTable {
    pub(crate) fn new(select: SelectStatement, alias: &str, kind: DerivedKind) -> BuildResult<Self> {
        if alias.is_empty() || alias.contains('\0') {
            return Err(BuildError::InvalidIdentifier(alias.to_string()));
        }

        let mut columns: Vec<DerivedColumn> = Vec::with_capacity(select.projections().len());
        for (i, projection) in select.projections().iter().enumerate() {
            let Some(name) = projection.output_name() else {
                return Err(BuildError::UnnamedProjection {
                    table: alias.to_string(),
                    position: i + 1,
                });
            };
            if columns.iter().any(|c| *c.name == *name) {
                return Err(BuildError::DuplicateAlias {
                    table: alias.to_string(),
                    alias: name.into_owned(),
                });
            }
            columns.push(DerivedColumn {
                name: Arc::from(name.as_ref()),
                tag: projection.type_tag(),
            });
        }

        Ok(Self {
            inner: Arc::new(Inner {
                alias: Arc::from(alias),
                kind,
                select,
                columns,
            }),
        })
    }

    pub fn alias(&self) -> &str {
        &self.inner.alias
    }

    pub(crate) fn alias_arc(&self) -> Arc<str> {
        self.inner.alias.clone()
    }

    pub fn kind(&self) -> DerivedKind {
        self.inner.kind
    }

    /// The wrapped SELECT.
    pub fn statement(&self) -> &SelectStatement {
        &self.inner.select
    }

    /// Output columns, in projection order.
    pub fn columns(&self) -> &[DerivedColumn] {
        &self.inner.columns
    }

    /// Output column by its resolved name (e.g. `"table1.col_bool"`).
    pub fn column<T: SqlType>(&self, name: &str) -> BuildResult<Column<T>> {
        self.bind(&ColumnRef::unbound(name)).map(Column::from_ref)
    }

    /// `alias AS (SELECT …)` inside a WITH clause. The name is readable by
    /// the rest of the statement, including later CTEs.
    pub(crate) fn write_definition(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        ctx.write_ident(&self.inner.alias);
        ctx.write(" AS (");
        self.inner.select.serialize(ctx)?;
        ctx.write(")");
        ctx.declare_cte(&self.inner.alias);
        Ok(())
    }
}

impl ColumnSource for DerivedTable {
    fn bind(&self, column: &ColumnRef) -> BuildResult<ColumnRef> {
        let resolved = column.projection_alias();
        if !self.inner.columns.iter().any(|c| *c.name == *resolved) {
            return Err(BuildError::ColumnNotFound {
                table: self.inner.alias.to_string(),
                column: resolved.into_owned(),
            });
        }
        Ok(ColumnRef::derived(column.name(), &self.inner.alias, &resolved))
    }
}

impl Serialize for DerivedTable {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        match self.inner.kind {
            DerivedKind::SubQuery => {
                ctx.write("(");
                self.inner.select.serialize(ctx)?;
                ctx.write(") AS ");
                ctx.write_ident(&self.inner.alias);
            }
            DerivedKind::Cte => {
                ctx.check_cte(&self.inner.alias)?;
                ctx.write_ident(&self.inner.alias);
            }
        }
        Ok(())
    }
}
