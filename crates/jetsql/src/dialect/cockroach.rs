//! CockroachDB dialect.
//!
//! Wire- and syntax-compatible with Postgres for everything the builder emits,
//! except that CockroachDB has no explicit table locks.

use super::postgres::pg_literal;
use super::Dialect;
use crate::error::BuildResult;
use crate::stmt::RowLockStrength;
use crate::value::Value;
use std::borrow::Cow;

#[derive(Debug, Default, Clone, Copy)]
pub struct CockroachDb;

/// Shared instance.
pub static COCKROACH_DB: CockroachDb = CockroachDb;

impl Dialect for CockroachDb {
    fn name(&self) -> &'static str {
        "cockroachdb"
    }

    fn placeholder(&self, index: usize) -> Cow<'static, str> {
        Cow::Owned(format!("${index}"))
    }

    fn literal(&self, value: &Value) -> BuildResult<String> {
        Ok(pg_literal(self, value))
    }

    fn supports_ilike(&self) -> bool {
        true
    }

    fn supports_row_lock(&self, _strength: RowLockStrength) -> bool {
        true
    }
}
