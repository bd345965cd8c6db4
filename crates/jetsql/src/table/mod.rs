//! Tables, columns and FROM-sources.
//!
//! A FROM-source is one of a closed set of variants ([`TableSource`]): a base
//! [`Table`], a [`DerivedTable`] wrapping a SELECT, or a [`JoinTable`].
//! Capabilities are traits: [`Readable`] sources can be selected from and
//! joined, [`ColumnSource`]s can rebind columns, and only base tables can be
//! locked.

mod column;
mod derived;
mod join;

pub use column::{
    Assignment, BoolColumn, BytesColumn, Column, ColumnRef, DateColumn, FloatColumn,
    IntegerColumn, JsonColumn, TextColumn, TimeColumn, TimestampColumn, TimestampTzColumn,
    UuidColumn,
};
pub use derived::{DerivedColumn, DerivedKind, DerivedTable};
pub use join::{JoinKind, JoinTable};

use crate::error::{BuildError, BuildResult};
use crate::expr::{Bool, Expression, Projectable};
use crate::serialize::{Serialize, SerializeContext};
use crate::stmt::{
    DeleteStatement, InsertStatement, LockStatement, SelectStatement, UpdateStatement,
};
use std::sync::Arc;

/// A base table, optionally schema-qualified and aliased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    schema: Option<Arc<str>>,
    name: Arc<str>,
    alias: Option<Arc<str>>,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            schema: None,
            name: Arc::from(name),
            alias: None,
        }
    }

    pub fn with_schema(schema: &str, name: &str) -> Self {
        Self {
            schema: Some(Arc::from(schema)),
            name: Arc::from(name),
            alias: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name used to qualify columns: the alias if set, else the table name.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Copy of this table under `alias`; columns created from the copy are
    /// qualified by the alias.
    pub fn aliased(&self, alias: &str) -> Self {
        Self {
            alias: Some(Arc::from(alias)),
            ..self.clone()
        }
    }

    /// Column of this table.
    pub fn column<T: crate::expr::SqlType>(&self, name: &str) -> Column<T> {
        Column::bound(name, self.qualifier())
    }

    /// `LOCK TABLE <self>`
    pub fn lock(&self) -> LockStatement {
        LockStatement::new(vec![self.clone()])
    }

    /// `INSERT INTO <self> (<columns>)`
    pub fn insert(&self, columns: &[&dyn AnyColumn]) -> InsertStatement {
        InsertStatement::new(self.clone(), columns)
    }

    /// `UPDATE <self>`
    pub fn update(&self) -> UpdateStatement {
        UpdateStatement::new(self.clone())
    }

    /// `DELETE FROM <self>`
    pub fn delete(&self) -> DeleteStatement {
        DeleteStatement::new(self.clone())
    }

    /// Name this table contributes to a statement's scope.
    pub(crate) fn scope_name(&self) -> Arc<str> {
        self.alias.clone().unwrap_or_else(|| self.name.clone())
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        self.name.clone()
    }

    /// Schema-qualified name, without alias.
    pub(crate) fn write_name(&self, ctx: &mut SerializeContext<'_>) {
        if let Some(schema) = &self.schema {
            ctx.write_ident(schema);
            ctx.write(".");
        }
        ctx.write_ident(&self.name);
    }
}

impl Serialize for Table {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        if self.name.is_empty() {
            return Err(BuildError::InvalidIdentifier(self.name.to_string()));
        }
        self.write_name(ctx);
        if let Some(alias) = &self.alias {
            ctx.write(" AS ");
            ctx.write_ident(alias);
        }
        Ok(())
    }
}

/// A FROM-source.
#[derive(Debug, Clone)]
pub enum TableSource {
    Table(Table),
    Derived(DerivedTable),
    Join(Arc<JoinTable>),
}

impl TableSource {
    /// Qualifiers this source makes visible, left to right.
    pub(crate) fn collect_scope(&self, out: &mut Vec<Arc<str>>) {
        match self {
            TableSource::Table(table) => out.push(table.scope_name()),
            TableSource::Derived(derived) => out.push(derived.alias_arc()),
            TableSource::Join(join) => join.collect_scope(out),
        }
    }
}

impl Serialize for TableSource {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        match self {
            TableSource::Table(table) => table.serialize(ctx),
            TableSource::Derived(derived) => derived.serialize(ctx),
            TableSource::Join(join) => join.serialize(ctx),
        }
    }
}

/// Sources usable in FROM: base tables, derived tables and joins.
pub trait Readable {
    fn source(&self) -> TableSource;

    /// `SELECT <projections> FROM <self>`
    fn select(&self, projections: &[&dyn Projectable]) -> SelectStatement {
        SelectStatement::new(projections).from(self)
    }

    fn inner_join(&self, other: &impl Readable, on: impl Into<Expression<Bool>>) -> JoinTable {
        JoinTable::new(self.source(), JoinKind::Inner, other.source(), Some(on.into()))
    }

    fn left_join(&self, other: &impl Readable, on: impl Into<Expression<Bool>>) -> JoinTable {
        JoinTable::new(self.source(), JoinKind::Left, other.source(), Some(on.into()))
    }

    fn right_join(&self, other: &impl Readable, on: impl Into<Expression<Bool>>) -> JoinTable {
        JoinTable::new(self.source(), JoinKind::Right, other.source(), Some(on.into()))
    }

    fn full_join(&self, other: &impl Readable, on: impl Into<Expression<Bool>>) -> JoinTable {
        JoinTable::new(self.source(), JoinKind::Full, other.source(), Some(on.into()))
    }

    fn cross_join(&self, other: &impl Readable) -> JoinTable {
        JoinTable::new(self.source(), JoinKind::Cross, other.source(), None)
    }
}

impl Readable for Table {
    fn source(&self) -> TableSource {
        TableSource::Table(self.clone())
    }
}

impl Readable for DerivedTable {
    fn source(&self) -> TableSource {
        TableSource::Derived(self.clone())
    }
}

impl Readable for JoinTable {
    fn source(&self) -> TableSource {
        TableSource::Join(Arc::new(self.clone()))
    }
}

/// Sources a column can be rebound to with [`Column::from_table`].
pub trait ColumnSource {
    fn bind(&self, column: &ColumnRef) -> BuildResult<ColumnRef>;
}

impl ColumnSource for Table {
    fn bind(&self, column: &ColumnRef) -> BuildResult<ColumnRef> {
        Ok(ColumnRef::bound(column.name(), self.qualifier()))
    }
}

/// Type-erased column, for INSERT column lists and ON CONFLICT targets.
pub trait AnyColumn {
    fn column_ref(&self) -> &ColumnRef;
}
