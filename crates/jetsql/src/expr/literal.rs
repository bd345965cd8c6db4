//! Literal constructors.
//!
//! Each literal becomes a placeholder plus argument, or is inlined by the
//! dialect in debug SQL.

use super::types::{Bool, Bytes, Date, Float, Integer, Json, SqlType, Text, Time};
use super::types::{Timestamp, TimestampTz, Uuid};
use super::{Expr, Expression};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

fn literal<T: SqlType>(value: Value) -> Expression<T> {
    Expression::from_expr(Expr::Value(value))
}

pub fn int(v: i64) -> Expression<Integer> {
    literal(Value::Int(v))
}

pub fn float(v: f64) -> Expression<Float> {
    literal(Value::Float(v))
}

pub fn text(v: impl Into<String>) -> Expression<Text> {
    literal(Value::Text(v.into()))
}

pub fn boolean(v: bool) -> Expression<Bool> {
    literal(Value::Bool(v))
}

pub fn bytes(v: impl Into<Vec<u8>>) -> Expression<Bytes> {
    literal(Value::Bytes(v.into()))
}

pub fn date(v: NaiveDate) -> Expression<Date> {
    literal(Value::Date(v))
}

pub fn time(v: NaiveTime) -> Expression<Time> {
    literal(Value::Time(v))
}

pub fn timestamp(v: NaiveDateTime) -> Expression<Timestamp> {
    literal(Value::Timestamp(v))
}

pub fn timestamptz(v: DateTime<Utc>) -> Expression<TimestampTz> {
    literal(Value::TimestampTz(v))
}

pub fn json(v: serde_json::Value) -> Expression<Json> {
    literal(Value::Json(v))
}

pub fn uuid(v: ::uuid::Uuid) -> Expression<Uuid> {
    literal(Value::Uuid(v))
}

/// The `NULL` keyword, typed for use as an operand or SET value.
pub fn null<T: SqlType>() -> Expression<T> {
    Expression::from_expr(Expr::Keyword("NULL"))
}
