//! Typed columns.

use super::{AnyColumn, ColumnSource};
use crate::error::BuildResult;
use crate::expr::{
    AnyExpression, Bool, Bytes, Date, Expr, Expression, Float, Integer, Json, SqlType, Text,
    Time, Timestamp, TimestampTz, TypeTag, TypedExpr, Uuid,
};
use crate::serialize::{Serialize, SerializeContext};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Unbound,
    /// Base table, qualified by its alias or name.
    Table(Arc<str>),
    /// Derived table; `alias` is the resolved output name inside it.
    Derived { table: Arc<str>, alias: Arc<str> },
}

/// Untyped column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    name: Arc<str>,
    binding: Binding,
}

impl ColumnRef {
    pub fn unbound(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            binding: Binding::Unbound,
        }
    }

    pub fn bound(name: &str, qualifier: &str) -> Self {
        Self {
            name: Arc::from(name),
            binding: Binding::Table(Arc::from(qualifier)),
        }
    }

    pub(crate) fn derived(name: &str, table: &str, alias: &str) -> Self {
        Self {
            name: Arc::from(name),
            binding: Binding::Derived {
                table: Arc::from(table),
                alias: Arc::from(alias),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualifying table or derived-table alias.
    pub fn qualifier(&self) -> Option<&str> {
        match &self.binding {
            Binding::Unbound => None,
            Binding::Table(qualifier) => Some(qualifier),
            Binding::Derived { table, .. } => Some(table),
        }
    }

    /// Name this column takes when projected without an explicit alias.
    ///
    /// `table.col` for base-table columns, the resolved alias for derived
    /// columns, the bare name for unbound columns.
    pub fn projection_alias(&self) -> Cow<'_, str> {
        match &self.binding {
            Binding::Unbound => Cow::Borrowed(&self.name),
            Binding::Table(qualifier) => Cow::Owned(format!("{qualifier}.{}", self.name)),
            Binding::Derived { alias, .. } => Cow::Borrowed(alias),
        }
    }

    /// Unqualified column name, for INSERT column lists and SET targets.
    pub(crate) fn write_bare(&self, ctx: &mut SerializeContext<'_>) {
        ctx.write_ident(&self.name);
    }
}

impl Serialize for ColumnRef {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        match &self.binding {
            Binding::Unbound => ctx.write_ident(&self.name),
            Binding::Table(qualifier) => {
                ctx.check_source(qualifier)?;
                ctx.write_ident(qualifier);
                ctx.write(".");
                ctx.write_ident(&self.name);
            }
            Binding::Derived { table, alias } => {
                ctx.check_source(table)?;
                ctx.write_ident(table);
                ctx.write(".");
                ctx.write_quoted(alias);
            }
        }
        Ok(())
    }
}

/// A column of SQL type `T`.
pub struct Column<T> {
    column: ColumnRef,
    _type: PhantomData<fn() -> T>,
}

pub type BoolColumn = Column<Bool>;
pub type IntegerColumn = Column<Integer>;
pub type FloatColumn = Column<Float>;
pub type TextColumn = Column<Text>;
pub type BytesColumn = Column<Bytes>;
pub type DateColumn = Column<Date>;
pub type TimeColumn = Column<Time>;
pub type TimestampColumn = Column<Timestamp>;
pub type TimestampTzColumn = Column<TimestampTz>;
pub type JsonColumn = Column<Json>;
pub type UuidColumn = Column<Uuid>;

impl<T: SqlType> Column<T> {
    /// Column not yet bound to a table. Rebind it with [`Column::from_table`].
    pub fn new(name: &str) -> Self {
        Self::from_ref(ColumnRef::unbound(name))
    }

    pub(crate) fn bound(name: &str, qualifier: &str) -> Self {
        Self::from_ref(ColumnRef::bound(name, qualifier))
    }

    pub(crate) fn from_ref(column: ColumnRef) -> Self {
        Self {
            column,
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.column.name()
    }

    /// New column bound to `source`; `self` is left untouched.
    ///
    /// Against a derived table the column resolves through the table's alias
    /// map and fails with `ColumnNotFound` if it is not projected there.
    pub fn from_table(&self, source: &impl ColumnSource) -> BuildResult<Self> {
        source.bind(&self.column).map(Self::from_ref)
    }

    /// `SET <column> = <value>` item for UPDATE or ON CONFLICT DO UPDATE.
    pub fn set(&self, value: impl Into<Expression<T>>) -> Assignment {
        Assignment {
            column: self.column.clone(),
            value: value.into().into_expr(),
        }
    }

    /// `EXCLUDED.<column>`: the row proposed for insertion in ON CONFLICT DO UPDATE.
    pub fn excluded(&self) -> Expression<T> {
        Expression::from_expr(Expr::Excluded(Arc::from(self.column.name())))
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            column: self.column.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: SqlType> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("type", &T::TAG)
            .field("column", &self.column)
            .finish()
    }
}

impl<T: SqlType> AnyExpression for Column<T> {
    fn to_expr(&self) -> Expr {
        Expr::Column(self.column.clone())
    }

    fn type_tag(&self) -> TypeTag {
        T::TAG
    }
}

impl<T: SqlType> TypedExpr<T> for Column<T> {}

impl<T: SqlType> AnyColumn for Column<T> {
    fn column_ref(&self) -> &ColumnRef {
        &self.column
    }
}

impl<T: SqlType> Serialize for Column<T> {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        self.column.serialize(ctx)
    }
}

/// A `column = value` pair.
#[derive(Debug, Clone)]
pub struct Assignment {
    column: ColumnRef,
    value: Expr,
}

impl Serialize for Assignment {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        self.column.write_bare(ctx);
        ctx.write(" = ");
        self.value.serialize(ctx)
    }
}
