//! # jetsql
//!
//! A type-safe SQL statement builder for Postgres, MySQL/MariaDB, SQLite and
//! CockroachDB.
//!
//! ## Features
//!
//! - **Typed expressions**: columns and literals carry their SQL type, so
//!   comparing a text column with an integer does not compile
//! - **Parameterized output**: every statement renders to placeholder SQL plus
//!   an ordered argument list, or to debug SQL with inlined literals
//! - **Derived tables**: sub-queries and CTEs expose their projections as
//!   typed columns
//! - **Safe defaults**: UPDATE and DELETE require WHERE; dialect gaps are build
//!   errors, never invalid SQL
//! - **Execution**: run statements on any [`Driver`] (tokio-postgres built in),
//!   with deadlines and process-wide [`logger`]s
//!
//! ```
//! use jetsql::prelude::*;
//!
//! let users = Table::new("users");
//! let id = users.column::<Integer>("id");
//! let name = users.column::<Text>("name");
//!
//! let stmt = users
//!     .select(&[&id, &name])
//!     .where_expr(name.like("a%").and(id.gt(10)))
//!     .order_by([id.desc()])
//!     .limit(5);
//!
//! let (sql, args) = stmt.sql(&POSTGRES)?;
//! assert_eq!(
//!     sql,
//!     r#"SELECT users.id AS "users.id", users.name AS "users.name" FROM users WHERE ((users.name LIKE $1) AND (users.id > $2)) ORDER BY users.id DESC LIMIT $3;"#
//! );
//! assert_eq!(args, vec![Value::from("a%"), Value::Int(10), Value::Int(5)]);
//! # Ok::<(), jetsql::BuildError>(())
//! ```

pub mod dialect;
pub mod error;
pub mod exec;
pub mod expr;
pub mod logger;
pub mod serialize;
pub mod stmt;
pub mod table;
pub mod value;

pub use dialect::{COCKROACH_DB, CockroachDb, Dialect, MYSQL, MySql, POSTGRES, Postgres, SQLITE, Sqlite};
pub use error::{BuildError, BuildResult, Error, ErrorKind, LoggingError, Result};
pub use exec::{Connection, Db, DbConfig, Driver, Execute, StatementCacheConfig, Transaction};
#[cfg(feature = "pool")]
pub use exec::create_pool;
pub use expr::{Expr, Expression};
pub use stmt::{
    DeleteStatement, InsertStatement, LockStatement, SelectStatement, Statement, StatementKind,
    UnlockStatement, UpdateStatement, select, unlock_tables,
};
pub use table::{Column, DerivedTable, Table};
pub use value::Value;

/// Everything needed to build and run statements.
pub mod prelude {
    pub use crate::dialect::{COCKROACH_DB, Dialect, MYSQL, POSTGRES, SQLITE};
    pub use crate::error::{BuildError, Error};
    pub use crate::exec::{Connection, Db, DbConfig, Driver, Execute};
    pub use crate::expr::{
        AnyExpression, Bool, BoolExpr, Bytes, Date, Expression, Float, Integer, Json,
        NumericExpr, OrderBy, OrderedExpr, Projectable, Raw, Text, TextExpr, Time, Timestamp,
        TimestampTz, TypedExpr, Uuid, avg, boolean, cast, coalesce, count, count_distinct, count_star,
        exists, float, int, lower, max, min, not, not_exists, now, null, raw, sum, text, upper,
    };
    pub use crate::stmt::{
        LockWait, RowLock, Statement, TableLockMode, select, unlock_tables,
    };
    pub use crate::table::{
        BoolColumn, BytesColumn, Column, DateColumn, DerivedTable, FloatColumn, IntegerColumn,
        JsonColumn, Readable, Table, TextColumn, TimeColumn, TimestampColumn, TimestampTzColumn,
        UuidColumn,
    };
    pub use crate::value::Value;
}
