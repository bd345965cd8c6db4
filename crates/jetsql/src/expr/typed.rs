//! Typed expressions and their operator sets.

use super::order::OrderBy;
use super::projection::Projection;
use super::types::{Bool, Bytes, Comparable, Date, Float, Integer, Json, Numeric, SqlType, Text};
use super::types::{Time, Timestamp, TimestampTz, Uuid};
use super::{AnyExpression, BinaryOp, Expr, TypeTag};
use crate::error::BuildResult;
use crate::serialize::{Serialize, SerializeContext};
use crate::stmt::SelectStatement;
use crate::table::Column;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// An expression producing values of SQL type `T`.
pub struct Expression<T> {
    expr: Expr,
    _type: PhantomData<fn() -> T>,
}

impl<T: SqlType> Expression<T> {
    /// Wrap an untyped node. The caller vouches for its type.
    pub fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            _type: PhantomData,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<T> Clone for Expression<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: SqlType> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("type", &T::TAG)
            .field("expr", &self.expr)
            .finish()
    }
}

impl<T: SqlType> AnyExpression for Expression<T> {
    fn to_expr(&self) -> Expr {
        self.expr.clone()
    }

    fn type_tag(&self) -> TypeTag {
        T::TAG
    }
}

impl<T: SqlType> TypedExpr<T> for Expression<T> {}

impl<T: SqlType> Serialize for Expression<T> {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        self.expr.serialize(ctx)
    }
}

fn boolean(expr: Expr) -> Expression<Bool> {
    Expression::from_expr(expr)
}

fn operand<T: SqlType>(value: impl Into<Expression<T>>) -> Arc<Expr> {
    Arc::new(value.into().into_expr())
}

/// Operators available on every typed expression.
pub trait TypedExpr<T: SqlType>: AnyExpression + Sized {
    fn as_expression(&self) -> Expression<T> {
        Expression::from_expr(self.to_expr())
    }

    fn eq(&self, rhs: impl Into<Expression<T>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::Eq, self.to_expr(), rhs.into().into_expr()))
    }

    fn not_eq(&self, rhs: impl Into<Expression<T>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::NotEq, self.to_expr(), rhs.into().into_expr()))
    }

    /// Null-safe inequality.
    fn is_distinct_from(&self, rhs: impl Into<Expression<T>>) -> Expression<Bool> {
        boolean(Expr::DistinctFrom {
            lhs: Arc::new(self.to_expr()),
            rhs: operand(rhs),
            distinct: true,
        })
    }

    /// Null-safe equality.
    fn is_not_distinct_from(&self, rhs: impl Into<Expression<T>>) -> Expression<Bool> {
        boolean(Expr::DistinctFrom {
            lhs: Arc::new(self.to_expr()),
            rhs: operand(rhs),
            distinct: false,
        })
    }

    fn is_null(&self) -> Expression<Bool> {
        boolean(Expr::IsNull {
            operand: Arc::new(self.to_expr()),
            negated: false,
        })
    }

    fn is_not_null(&self) -> Expression<Bool> {
        boolean(Expr::IsNull {
            operand: Arc::new(self.to_expr()),
            negated: true,
        })
    }

    /// `x IN (a, b, ...)`; an empty list is always false.
    fn in_list<I>(&self, values: I) -> Expression<Bool>
    where
        I: IntoIterator,
        I::Item: Into<Expression<T>>,
    {
        boolean(Expr::InList {
            operand: Arc::new(self.to_expr()),
            list: values.into_iter().map(|v| v.into().into_expr()).collect(),
            negated: false,
        })
    }

    /// `x NOT IN (a, b, ...)`; an empty list is always true.
    fn not_in_list<I>(&self, values: I) -> Expression<Bool>
    where
        I: IntoIterator,
        I::Item: Into<Expression<T>>,
    {
        boolean(Expr::InList {
            operand: Arc::new(self.to_expr()),
            list: values.into_iter().map(|v| v.into().into_expr()).collect(),
            negated: true,
        })
    }

    fn in_select(&self, select: &SelectStatement) -> Expression<Bool> {
        boolean(Expr::InSelect {
            operand: Arc::new(self.to_expr()),
            select: Arc::new(select.clone()),
            negated: false,
        })
    }

    fn not_in_select(&self, select: &SelectStatement) -> Expression<Bool> {
        boolean(Expr::InSelect {
            operand: Arc::new(self.to_expr()),
            select: Arc::new(select.clone()),
            negated: true,
        })
    }

    fn asc(&self) -> OrderBy {
        OrderBy::asc(self.to_expr())
    }

    fn desc(&self) -> OrderBy {
        OrderBy::desc(self.to_expr())
    }

    /// Project this expression under an explicit alias.
    fn alias(&self, alias: &str) -> Projection {
        Projection::new(self.to_expr(), T::TAG).with_alias(alias)
    }
}

/// Ordering comparisons.
pub trait OrderedExpr<T: Comparable>: TypedExpr<T> {
    fn lt(&self, rhs: impl Into<Expression<T>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::Lt, self.to_expr(), rhs.into().into_expr()))
    }

    fn lt_eq(&self, rhs: impl Into<Expression<T>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::LtEq, self.to_expr(), rhs.into().into_expr()))
    }

    fn gt(&self, rhs: impl Into<Expression<T>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::Gt, self.to_expr(), rhs.into().into_expr()))
    }

    fn gt_eq(&self, rhs: impl Into<Expression<T>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::GtEq, self.to_expr(), rhs.into().into_expr()))
    }

    fn between(
        &self,
        low: impl Into<Expression<T>>,
        high: impl Into<Expression<T>>,
    ) -> Expression<Bool> {
        boolean(Expr::Between {
            operand: Arc::new(self.to_expr()),
            low: operand(low),
            high: operand(high),
            negated: false,
        })
    }

    fn not_between(
        &self,
        low: impl Into<Expression<T>>,
        high: impl Into<Expression<T>>,
    ) -> Expression<Bool> {
        boolean(Expr::Between {
            operand: Arc::new(self.to_expr()),
            low: operand(low),
            high: operand(high),
            negated: true,
        })
    }
}

impl<T: Comparable, E: TypedExpr<T>> OrderedExpr<T> for E {}

/// Arithmetic. Both operands share the same numeric type; mix types with `cast`.
pub trait NumericExpr<T: Numeric>: TypedExpr<T> {
    fn add(&self, rhs: impl Into<Expression<T>>) -> Expression<T> {
        Expression::from_expr(Expr::binary(BinaryOp::Add, self.to_expr(), rhs.into().into_expr()))
    }

    fn sub(&self, rhs: impl Into<Expression<T>>) -> Expression<T> {
        Expression::from_expr(Expr::binary(BinaryOp::Sub, self.to_expr(), rhs.into().into_expr()))
    }

    fn mul(&self, rhs: impl Into<Expression<T>>) -> Expression<T> {
        Expression::from_expr(Expr::binary(BinaryOp::Mul, self.to_expr(), rhs.into().into_expr()))
    }

    fn div(&self, rhs: impl Into<Expression<T>>) -> Expression<T> {
        Expression::from_expr(Expr::binary(BinaryOp::Div, self.to_expr(), rhs.into().into_expr()))
    }

    fn rem(&self, rhs: impl Into<Expression<T>>) -> Expression<T> {
        Expression::from_expr(Expr::binary(BinaryOp::Rem, self.to_expr(), rhs.into().into_expr()))
    }
}

impl<T: Numeric, E: TypedExpr<T>> NumericExpr<T> for E {}

/// String matching and concatenation.
pub trait TextExpr: TypedExpr<Text> {
    fn like(&self, pattern: impl Into<Expression<Text>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::Like, self.to_expr(), pattern.into().into_expr()))
    }

    fn not_like(&self, pattern: impl Into<Expression<Text>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::NotLike, self.to_expr(), pattern.into().into_expr()))
    }

    /// Case-insensitive LIKE; Postgres and CockroachDB only.
    fn ilike(&self, pattern: impl Into<Expression<Text>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::ILike, self.to_expr(), pattern.into().into_expr()))
    }

    fn not_ilike(&self, pattern: impl Into<Expression<Text>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::NotILike, self.to_expr(), pattern.into().into_expr()))
    }

    fn concat(&self, rhs: impl Into<Expression<Text>>) -> Expression<Text> {
        Expression::from_expr(Expr::binary(BinaryOp::Concat, self.to_expr(), rhs.into().into_expr()))
    }
}

impl<E: TypedExpr<Text>> TextExpr for E {}

/// Logical connectives.
pub trait BoolExpr: TypedExpr<Bool> {
    fn and(&self, rhs: impl Into<Expression<Bool>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::And, self.to_expr(), rhs.into().into_expr()))
    }

    fn or(&self, rhs: impl Into<Expression<Bool>>) -> Expression<Bool> {
        boolean(Expr::binary(BinaryOp::Or, self.to_expr(), rhs.into().into_expr()))
    }

    fn not(&self) -> Expression<Bool> {
        boolean(Expr::Not(Arc::new(self.to_expr())))
    }
}

impl<E: TypedExpr<Bool>> BoolExpr for E {}

impl<T: SqlType> From<&Expression<T>> for Expression<T> {
    fn from(expr: &Expression<T>) -> Self {
        expr.clone()
    }
}

impl<T: SqlType> From<Column<T>> for Expression<T> {
    fn from(column: Column<T>) -> Self {
        Expression::from_expr(column.to_expr())
    }
}

impl<T: SqlType> From<&Column<T>> for Expression<T> {
    fn from(column: &Column<T>) -> Self {
        Expression::from_expr(column.to_expr())
    }
}

impl<T: SqlType> From<Expression<T>> for Expr {
    fn from(expr: Expression<T>) -> Self {
        expr.expr
    }
}

impl<T: SqlType> From<&Expression<T>> for Expr {
    fn from(expr: &Expression<T>) -> Self {
        expr.expr.clone()
    }
}

impl<T: SqlType> From<&Column<T>> for Expr {
    fn from(column: &Column<T>) -> Self {
        column.to_expr()
    }
}

macro_rules! impl_literal {
    ($marker:ty: $($t:ty),* $(,)?) => {
        $(impl From<$t> for Expression<$marker> {
            fn from(v: $t) -> Self {
                Expression::from_expr(Expr::Value(Value::from(v)))
            }
        })*
    };
}

impl_literal!(Integer: i8, i16, i32, i64, u8, u16, u32);
impl_literal!(Float: f32, f64);
impl_literal!(Text: &str, String);
impl_literal!(Bool: bool);
impl_literal!(Bytes: Vec<u8>, &[u8]);
impl_literal!(Date: NaiveDate);
impl_literal!(Time: NaiveTime);
impl_literal!(Timestamp: NaiveDateTime);
impl_literal!(TimestampTz: DateTime<Utc>);
impl_literal!(Json: serde_json::Value);
impl_literal!(Uuid: ::uuid::Uuid);
