//! SELECT-list items.

use super::{AnyExpression, Expr, TypeTag};
use crate::error::BuildResult;
use crate::serialize::{Serialize, SerializeContext};
use std::borrow::Cow;
use std::sync::Arc;

/// One item of a projection list.
#[derive(Debug, Clone)]
pub struct Projection {
    expr: Expr,
    alias: Option<Arc<str>>,
    tag: TypeTag,
}

impl Projection {
    pub fn new(expr: Expr, tag: TypeTag) -> Self {
        Self {
            expr,
            alias: None,
            tag,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(Arc::from(alias));
        self
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// Output column name: the explicit alias, else the column's projection
    /// alias (`table.col` for base-table columns). `None` for unnamed
    /// computed expressions.
    pub fn output_name(&self) -> Option<Cow<'_, str>> {
        if let Some(alias) = &self.alias {
            return Some(Cow::Borrowed(alias));
        }
        self.expr.as_column().map(|column| column.projection_alias())
    }
}

impl Serialize for Projection {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        self.expr.serialize(ctx)?;
        if let Some(name) = self.output_name() {
            ctx.write(" AS ");
            ctx.write_quoted(&name);
        }
        Ok(())
    }
}

/// Anything that can appear in a projection list.
pub trait Projectable {
    fn projection(&self) -> Projection;
}

impl<E: AnyExpression> Projectable for E {
    fn projection(&self) -> Projection {
        Projection::new(self.to_expr(), self.type_tag())
    }
}

impl Projectable for Projection {
    fn projection(&self) -> Projection {
        self.clone()
    }
}
