//! Serialization of statement trees into SQL text plus arguments.
//!
//! A [`SerializeContext`] is created fresh for every call and threaded
//! explicitly through the tree. Nested sub-queries write into the same
//! context, so placeholder numbering always matches argument order.
//!
//! Statements also push a scope frame listing the sources they read from and
//! the common table expressions they declare. A column qualified by a name
//! that no enclosing frame knows, or a CTE reference without a matching
//! `WITH`, fails the whole serialization. Only trees rooted at a statement
//! are checked: an expression serialized on its own may hold a correlated
//! sub-query whose outer sources are not part of the tree.

use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::value::Value;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Scope {
    sources: Vec<Arc<str>>,
    ctes: Vec<Arc<str>>,
}

/// Per-call serialization state.
pub struct SerializeContext<'d> {
    dialect: &'d dyn Dialect,
    debug: bool,
    sql: String,
    args: Vec<Value>,
    scopes: Vec<Scope>,
    open_root: bool,
}

impl<'d> SerializeContext<'d> {
    pub fn new(dialect: &'d dyn Dialect, debug: bool) -> Self {
        Self {
            dialect,
            debug,
            sql: String::with_capacity(128),
            args: Vec::new(),
            scopes: Vec::new(),
            open_root: false,
        }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Literal-inlining mode.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn write(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Identifier, quoted only when needed.
    pub fn write_ident(&mut self, name: &str) {
        let ident = self.dialect.identifier(name);
        self.sql.push_str(&ident);
    }

    /// Identifier, always quoted.
    pub fn write_quoted(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Bound value: a placeholder plus an argument, or an inline literal in debug mode.
    ///
    /// Values the dialect cannot inline are rejected in both modes, so the two
    /// renderings never disagree.
    pub fn write_value(&mut self, value: &Value) -> BuildResult<()> {
        if self.debug {
            let literal = self.dialect.literal(value)?;
            self.sql.push_str(&literal);
        } else {
            self.dialect.check_value(value)?;
            self.args.push(value.clone());
            let placeholder = self.dialect.placeholder(self.args.len());
            self.sql.push_str(&placeholder);
        }
        Ok(())
    }

    /// Run `f` inside a new scope frame whose visible sources are `sources`.
    ///
    /// Frames nest, so a sub-query sees its own sources plus those of every
    /// enclosing statement.
    pub fn scoped<R>(
        &mut self,
        sources: Vec<Arc<str>>,
        f: impl FnOnce(&mut Self) -> BuildResult<R>,
    ) -> BuildResult<R> {
        if self.scopes.is_empty() {
            // Text before the first frame means the root is a bare expression.
            self.open_root = !self.sql.is_empty();
        }
        self.scopes.push(Scope {
            sources,
            ctes: Vec::new(),
        });
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn is_checked(&self) -> bool {
        !self.scopes.is_empty() && !self.open_root
    }

    /// Make the CTE `name` referenceable from the current frame on.
    pub fn declare_cte(&mut self, name: &Arc<str>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.ctes.push(name.clone());
        }
    }

    /// Fail unless `qualifier` names a source of this or an enclosing frame.
    ///
    /// Outside any statement (a bare expression) every qualifier is accepted.
    pub fn check_source(&self, qualifier: &str) -> BuildResult<()> {
        if !self.is_checked()
            || self
                .scopes
                .iter()
                .any(|scope| scope.sources.iter().any(|name| **name == *qualifier))
        {
            return Ok(());
        }
        Err(BuildError::TableNotInScope(qualifier.to_string()))
    }

    /// Fail unless a `WITH` clause in scope declares `name`.
    pub fn check_cte(&self, name: &str) -> BuildResult<()> {
        if !self.is_checked()
            || self
                .scopes
                .iter()
                .any(|scope| scope.ctes.iter().any(|cte| **cte == *name))
        {
            return Ok(());
        }
        Err(BuildError::UndeclaredCte(name.to_string()))
    }

    /// Serialize `items` separated by `sep`.
    pub fn write_list<T: Serialize>(&mut self, items: &[T], sep: &str) -> BuildResult<()> {
        self.write_list_with(items, sep, |ctx, item| item.serialize(ctx))
    }

    /// Render `items` with `f`, separated by `sep`.
    pub fn write_list_with<T>(
        &mut self,
        items: &[T],
        sep: &str,
        mut f: impl FnMut(&mut Self, &T) -> BuildResult<()>,
    ) -> BuildResult<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            f(self, item)?;
        }
        Ok(())
    }

    /// Number of arguments appended so far.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

/// A node that can render itself into a [`SerializeContext`].
pub trait Serialize {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()>;
}

impl<T: Serialize + ?Sized> Serialize for &T {
    fn serialize(&self, ctx: &mut SerializeContext<'_>) -> BuildResult<()> {
        (**self).serialize(ctx)
    }
}

/// Serialize a node (expression, clause or statement body) without a terminator.
///
/// Returns the SQL text and, unless `debug` is set, the ordered argument list.
/// Nothing is returned when any part of the tree is malformed.
pub fn serialize(
    node: &(impl Serialize + ?Sized),
    dialect: &dyn Dialect,
    debug: bool,
) -> BuildResult<(String, Vec<Value>)> {
    let mut ctx = SerializeContext::new(dialect, debug);
    node.serialize(&mut ctx)?;
    Ok(ctx.finish())
}
