//! SQL functions, aggregates and escape hatches.

use super::types::{Bool, Comparable, Float, Integer, Numeric, SqlType, Text, TimestampTz};
use super::{Expr, Expression};
use crate::stmt::SelectStatement;
use crate::value::Value;
use std::sync::Arc;

fn call<T: SqlType>(name: &'static str, args: Vec<Expr>) -> Expression<T> {
    Expression::from_expr(Expr::func(name, args))
}

/// `COUNT(expr)`
pub fn count<T: SqlType>(expr: impl Into<Expression<T>>) -> Expression<Integer> {
    call("COUNT", vec![expr.into().into_expr()])
}

/// `COUNT(DISTINCT expr)`
pub fn count_distinct<T: SqlType>(expr: impl Into<Expression<T>>) -> Expression<Integer> {
    Expression::from_expr(Expr::Func {
        name: "COUNT",
        args: Arc::from(vec![expr.into().into_expr()]),
        distinct: true,
    })
}

/// `COUNT(*)`
pub fn count_star() -> Expression<Integer> {
    call("COUNT", vec![Expr::Keyword("*")])
}

pub fn max<T: Comparable>(expr: impl Into<Expression<T>>) -> Expression<T> {
    call("MAX", vec![expr.into().into_expr()])
}

pub fn min<T: Comparable>(expr: impl Into<Expression<T>>) -> Expression<T> {
    call("MIN", vec![expr.into().into_expr()])
}

pub fn sum<T: Numeric>(expr: impl Into<Expression<T>>) -> Expression<T> {
    call("SUM", vec![expr.into().into_expr()])
}

pub fn avg<T: Numeric>(expr: impl Into<Expression<T>>) -> Expression<Float> {
    call("AVG", vec![expr.into().into_expr()])
}

/// `COALESCE(expr, fallback)`
pub fn coalesce<T: SqlType>(
    expr: impl Into<Expression<T>>,
    fallback: impl Into<Expression<T>>,
) -> Expression<T> {
    call(
        "COALESCE",
        vec![expr.into().into_expr(), fallback.into().into_expr()],
    )
}

pub fn lower(expr: impl Into<Expression<Text>>) -> Expression<Text> {
    call("LOWER", vec![expr.into().into_expr()])
}

pub fn upper(expr: impl Into<Expression<Text>>) -> Expression<Text> {
    call("UPPER", vec![expr.into().into_expr()])
}

/// `CURRENT_TIMESTAMP`
pub fn now() -> Expression<TimestampTz> {
    Expression::from_expr(Expr::Keyword("CURRENT_TIMESTAMP"))
}

pub fn exists(select: &SelectStatement) -> Expression<Bool> {
    Expression::from_expr(Expr::Exists {
        select: Arc::new(select.clone()),
        negated: false,
    })
}

pub fn not_exists(select: &SelectStatement) -> Expression<Bool> {
    Expression::from_expr(Expr::Exists {
        select: Arc::new(select.clone()),
        negated: true,
    })
}

pub fn not(expr: impl Into<Expression<Bool>>) -> Expression<Bool> {
    Expression::from_expr(Expr::Not(Arc::new(expr.into().into_expr())))
}

/// Raw SQL fragment typed as `T`.
///
/// Each `?` in `sql` is replaced by the next argument; `??` emits a literal
/// `?`. A marker/argument count mismatch fails at serialization.
///
/// ```
/// use jetsql::expr::{raw, Integer};
/// let e = raw::<Integer>("extract(year from now()) - ?", [1]);
/// # let _ = e;
/// ```
pub fn raw<T: SqlType>(
    sql: impl Into<String>,
    args: impl IntoIterator<Item = impl Into<Value>>,
) -> Expression<T> {
    let sql: String = sql.into();
    Expression::from_expr(Expr::Raw {
        sql: Arc::from(sql),
        args: args.into_iter().map(Into::into).collect(),
    })
}

/// `CAST(expr AS sql_type)`, retyping the expression.
pub fn cast<T: SqlType, U: SqlType>(
    expr: impl Into<Expression<U>>,
    sql_type: &str,
) -> Expression<T> {
    Expression::from_expr(Expr::Cast {
        operand: Arc::new(expr.into().into_expr()),
        sql_type: Arc::from(sql_type),
    })
}
