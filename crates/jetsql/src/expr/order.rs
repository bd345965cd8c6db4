//! ORDER BY items.

use super::Expr;
use crate::error::{BuildError, BuildResult};
use crate::serialize::{Serialize, SerializeContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// An ORDER BY item, created with `asc()` / `desc()` on an expression.
#[derive(Debug, Clone)]
pub struct OrderBy {
    expr: Expr,
    direction: Direction,
    nulls: Option<NullsOrder>,
}

impl OrderBy {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Direction::Asc,
            nulls: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Direction::Desc,
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }
}

impl Serialize for OrderBy {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        self.expr.serialize(ctx)?;
        ctx.write(match self.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        });
        if let Some(nulls) = self.nulls {
            let dialect = ctx.dialect();
            if !dialect.supports_nulls_ordering() {
                return Err(BuildError::unsupported(dialect.name(), "NULLS FIRST/LAST"));
            }
            ctx.write(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
        Ok(())
    }
}
