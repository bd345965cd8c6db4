//! Expression model.
//!
//! [`Expr`] is the untyped, immutable node tree the serializer walks. The
//! typed layer ([`Expression<T>`], [`TypedExpr`] and friends) sits on top and
//! only lets operands of matching SQL types be combined.

mod func;
mod literal;
mod order;
mod projection;
mod typed;
mod types;

pub use func::{
    avg, cast, coalesce, count, count_distinct, count_star, exists, lower, max, min, not,
    not_exists, now, raw, sum, upper,
};
pub use literal::{
    boolean, bytes, date, float, int, json, null, text, time, timestamp, timestamptz, uuid,
};
pub use order::{Direction, NullsOrder, OrderBy};
pub use projection::{Projectable, Projection};
pub use typed::{BoolExpr, Expression, NumericExpr, OrderedExpr, TextExpr, TypedExpr};
pub use types::{
    Bool, Bytes, Comparable, Date, Float, Integer, Json, Numeric, Raw, SqlType, Text, Time,
    Timestamp, TimestampTz, TypeTag, Uuid,
};

use crate::dialect::NullSafeEquality;
use crate::error::{BuildError, BuildResult};
use crate::serialize::{Serialize, SerializeContext};
use crate::stmt::SelectStatement;
use crate::table::ColumnRef;
use crate::value::Value;
use std::sync::Arc;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Like,
    NotLike,
    ILike,
    NotILike,
    Concat,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
            Self::Concat => "||",
        }
    }
}

/// An untyped expression node.
///
/// Nodes are never mutated after construction; children are shared through
/// `Arc`, so cloning an expression is cheap.
#[derive(Debug, Clone)]
pub enum Expr {
    Column(ColumnRef),
    /// A bound value: placeholder + argument, or inline literal in debug mode.
    Value(Value),
    /// A keyword emitted verbatim (`NULL`, `*`, `CURRENT_TIMESTAMP`).
    Keyword(&'static str),
    /// SQL fragment with `?` argument markers.
    Raw { sql: Arc<str>, args: Arc<[Value]> },
    Binary {
        op: BinaryOp,
        lhs: Arc<Expr>,
        rhs: Arc<Expr>,
    },
    Not(Arc<Expr>),
    IsNull { operand: Arc<Expr>, negated: bool },
    DistinctFrom {
        lhs: Arc<Expr>,
        rhs: Arc<Expr>,
        distinct: bool,
    },
    InList {
        operand: Arc<Expr>,
        list: Arc<[Expr]>,
        negated: bool,
    },
    InSelect {
        operand: Arc<Expr>,
        select: Arc<SelectStatement>,
        negated: bool,
    },
    Between {
        operand: Arc<Expr>,
        low: Arc<Expr>,
        high: Arc<Expr>,
        negated: bool,
    },
    Exists {
        select: Arc<SelectStatement>,
        negated: bool,
    },
    SubQuery(Arc<SelectStatement>),
    Func {
        name: &'static str,
        args: Arc<[Expr]>,
        distinct: bool,
    },
    Cast { operand: Arc<Expr>, sql_type: Arc<str> },
    /// `EXCLUDED.<column>` inside `ON CONFLICT DO UPDATE`.
    Excluded(Arc<str>),
}

impl Expr {
    pub(crate) fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
        }
    }

    pub(crate) fn func(name: &'static str, args: Vec<Expr>) -> Self {
        Expr::Func {
            name,
            args: args.into(),
            distinct: false,
        }
    }

    /// Column reference, if this node is a plain column.
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::Column(column) => Some(column),
            _ => None,
        }
    }

    // `NOT x` is unambiguous for these; the rest get parenthesized.
    fn needs_parens_under_not(&self) -> bool {
        matches!(
            self,
            Expr::IsNull { .. } | Expr::InList { .. } | Expr::InSelect { .. } | Expr::Raw { .. }
        )
    }

    // Nodes that render as a single term, safe to the left of a postfix
    // predicate such as `IS NULL` or `IN (..)`.
    fn is_atomic(&self) -> bool {
        matches!(
            self,
            Expr::Column(_)
                | Expr::Value(_)
                | Expr::Keyword(_)
                | Expr::Binary { .. }
                | Expr::Between { .. }
                | Expr::SubQuery(_)
                | Expr::Func { .. }
                | Expr::Cast { .. }
                | Expr::Excluded(_)
                | Expr::DistinctFrom { distinct: false, .. }
        )
    }

    fn serialize_operand(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        if self.is_atomic() {
            return self.serialize(ctx);
        }
        ctx.write("(");
        self.serialize(ctx)?;
        ctx.write(")");
        Ok(())
    }
}

/// Type-erased access to an expression, used where heterogeneous expressions
/// are listed together (GROUP BY, projections).
pub trait AnyExpression {
    fn to_expr(&self) -> Expr;

    fn type_tag(&self) -> TypeTag;
}

impl AnyExpression for Expr {
    fn to_expr(&self) -> Expr {
        self.clone()
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Raw
    }
}

/// Number of `?` argument markers in a raw fragment (`??` is a literal `?`).
pub(crate) fn raw_markers(sql: &str) -> usize {
    let mut count = 0;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '?' {
            if chars.peek() == Some(&'?') {
                chars.next();
            } else {
                count += 1;
            }
        }
    }
    count
}

fn serialize_raw(sql: &str, args: &[Value], ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
    let markers = raw_markers(sql);
    if markers != args.len() {
        return Err(BuildError::RawArgumentMismatch {
            sql: sql.to_string(),
            markers,
            args: args.len(),
        });
    }

    let mut args = args.iter();
    let mut rest = sql;
    while let Some(pos) = rest.find('?') {
        ctx.write(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if let Some(stripped) = tail.strip_prefix('?') {
            ctx.write("?");
            rest = stripped;
        } else {
            if let Some(value) = args.next() {
                ctx.write_value(value)?;
            }
            rest = tail;
        }
    }
    ctx.write(rest);
    Ok(())
}

fn serialize_subquery(select: &SelectStatement, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
    ctx.write("(");
    select.serialize(ctx)?;
    ctx.write(")");
    Ok(())
}

impl Serialize for Expr {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        match self {
            Expr::Column(column) => column.serialize(ctx),
            Expr::Value(value) => ctx.write_value(value),
            Expr::Keyword(keyword) => {
                ctx.write(keyword);
                Ok(())
            }
            Expr::Raw { sql, args } => serialize_raw(sql, args, ctx),
            Expr::Binary { op, lhs, rhs } => {
                let dialect = ctx.dialect();
                match op {
                    BinaryOp::ILike | BinaryOp::NotILike if !dialect.supports_ilike() => {
                        return Err(BuildError::unsupported(dialect.name(), "ILIKE"));
                    }
                    BinaryOp::Concat => {
                        if let Some(operator) = dialect.concat_operator() {
                            ctx.write("(");
                            lhs.serialize(ctx)?;
                            ctx.write(" ");
                            ctx.write(operator);
                            ctx.write(" ");
                            rhs.serialize(ctx)?;
                            ctx.write(")");
                        } else {
                            ctx.write("CONCAT(");
                            lhs.serialize(ctx)?;
                            ctx.write(", ");
                            rhs.serialize(ctx)?;
                            ctx.write(")");
                        }
                        return Ok(());
                    }
                    _ => {}
                }
                ctx.write("(");
                lhs.serialize(ctx)?;
                ctx.write(" ");
                ctx.write(op.as_str());
                ctx.write(" ");
                rhs.serialize(ctx)?;
                ctx.write(")");
                Ok(())
            }
            Expr::Not(inner) => {
                if inner.needs_parens_under_not() {
                    ctx.write("NOT (");
                    inner.serialize(ctx)?;
                    ctx.write(")");
                } else {
                    ctx.write("NOT ");
                    inner.serialize(ctx)?;
                }
                Ok(())
            }
            Expr::IsNull { operand, negated } => {
                operand.serialize_operand(ctx)?;
                ctx.write(if *negated { " IS NOT NULL" } else { " IS NULL" });
                Ok(())
            }
            Expr::DistinctFrom { lhs, rhs, distinct } => {
                match ctx.dialect().null_safe_equality() {
                    NullSafeEquality::DistinctFrom => {
                        ctx.write("(");
                        lhs.serialize(ctx)?;
                        ctx.write(if *distinct {
                            " IS DISTINCT FROM "
                        } else {
                            " IS NOT DISTINCT FROM "
                        });
                        rhs.serialize(ctx)?;
                        ctx.write(")");
                    }
                    NullSafeEquality::Is => {
                        ctx.write("(");
                        lhs.serialize(ctx)?;
                        ctx.write(if *distinct { " IS NOT " } else { " IS " });
                        rhs.serialize(ctx)?;
                        ctx.write(")");
                    }
                    NullSafeEquality::Spaceship => {
                        ctx.write(if *distinct { "NOT (" } else { "(" });
                        lhs.serialize(ctx)?;
                        ctx.write(" <=> ");
                        rhs.serialize(ctx)?;
                        ctx.write(")");
                    }
                }
                Ok(())
            }
            Expr::InList {
                operand,
                list,
                negated,
            } => {
                if list.is_empty() {
                    ctx.write(if *negated { "TRUE" } else { "FALSE" });
                    return Ok(());
                }
                operand.serialize_operand(ctx)?;
                ctx.write(if *negated { " NOT IN (" } else { " IN (" });
                ctx.write_list(list, ", ")?;
                ctx.write(")");
                Ok(())
            }
            Expr::InSelect {
                operand,
                select,
                negated,
            } => {
                operand.serialize_operand(ctx)?;
                ctx.write(if *negated { " NOT IN " } else { " IN " });
                serialize_subquery(select, ctx)
            }
            Expr::Between {
                operand,
                low,
                high,
                negated,
            } => {
                ctx.write("(");
                operand.serialize(ctx)?;
                ctx.write(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                low.serialize(ctx)?;
                ctx.write(" AND ");
                high.serialize(ctx)?;
                ctx.write(")");
                Ok(())
            }
            Expr::Exists { select, negated } => {
                ctx.write(if *negated { "NOT EXISTS " } else { "EXISTS " });
                serialize_subquery(select, ctx)
            }
            Expr::SubQuery(select) => serialize_subquery(select, ctx),
            Expr::Func {
                name,
                args,
                distinct,
            } => {
                ctx.write(name);
                ctx.write("(");
                if *distinct {
                    ctx.write("DISTINCT ");
                }
                ctx.write_list(args, ", ")?;
                ctx.write(")");
                Ok(())
            }
            Expr::Cast { operand, sql_type } => {
                ctx.write("CAST(");
                operand.serialize(ctx)?;
                ctx.write(" AS ");
                ctx.write(sql_type);
                ctx.write(")");
                Ok(())
            }
            Expr::Excluded(column) => {
                ctx.write("EXCLUDED.");
                ctx.write_ident(column);
                Ok(())
            }
        }
    }
}

macro_rules! impl_expr_from_value {
    ($($t:ty),* $(,)?) => {
        $(impl From<$t> for Expr {
            fn from(v: $t) -> Self {
                Expr::Value(Value::from(v))
            }
        })*
    };
}

impl_expr_from_value!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    bool,
    f32,
    f64,
    &str,
    String,
    Vec<u8>,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    serde_json::Value,
    ::uuid::Uuid,
);

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Value(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Expr {
    fn from(v: Option<T>) -> Self {
        Expr::Value(Value::from(v))
    }
}
