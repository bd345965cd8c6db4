use super::TableSource;
use crate::error::{BuildError, BuildResult};
use crate::expr::{Bool, Expr, Expression};
use crate::serialize::{Serialize, SerializeContext};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// Two sources joined together; itself a source, so joins chain left to right.
#[derive(Debug, Clone)]
pub struct JoinTable {
    left: TableSource,
    kind: JoinKind,
    right: TableSource,
    on: Option<Expr>,
}

impl JoinTable {
    pub(crate) fn new(
        left: TableSource,
        kind: JoinKind,
        right: TableSource,
        on: Option<Expression<Bool>>,
    ) -> Self {
        Self {
            left,
            kind,
            right,
            on: on.map(Expression::into_expr),
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub(crate) fn collect_scope(&self, out: &mut Vec<Arc<str>>) {
        self.left.collect_scope(out);
        self.right.collect_scope(out);
    }
}

impl Serialize for JoinTable {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        let dialect = ctx.dialect();
        if self.kind == JoinKind::Full && !dialect.supports_full_join() {
            return Err(BuildError::unsupported(dialect.name(), "FULL JOIN"));
        }

        self.left.serialize(ctx)?;
        ctx.write(" ");
        ctx.write(self.kind.as_str());
        ctx.write(" ");
        self.right.serialize(ctx)?;
        if let Some(on) = &self.on {
            ctx.write(" ON ");
            on.serialize(ctx)?;
        }
        Ok(())
    }
}
