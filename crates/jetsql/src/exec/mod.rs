//! Execution façade.
//!
//! Statements are serialized for the driver's dialect, handed to a [`Driver`]
//! and observed by the registered loggers. Driver errors come back unchanged.

mod db;
#[cfg(feature = "pool")]
mod pool;
#[cfg(feature = "postgres")]
mod postgres;
mod statement_cache;

pub use db::{Db, DbConfig, StatementCacheConfig};
#[cfg(feature = "pool")]
pub use pool::create_pool;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::logger::{self, Caller, LoggedStatement, QueryInfo};
use crate::stmt::{Statement, StatementKind};
use crate::value::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// A connection or transaction able to run parameterized SQL.
///
/// Implemented for `tokio_postgres::Client` and `tokio_postgres::Transaction`
/// with the `postgres` feature and for `deadpool_postgres::Client` with the
/// `pool` feature; implement it to plug in any other driver.
pub trait Driver: Send + Sync {
    type Row: Send;

    /// Server-side prepared statement handle. Drivers without prepared
    /// statements use `()` and keep the default [`Driver::prepare`].
    type Statement: Clone + Send + Sync;

    /// Dialect statements are serialized for before reaching this driver.
    fn dialect(&self) -> &'static dyn Dialect;

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, args: &[Value]) -> impl Future<Output = Result<u64>> + Send;

    /// Execute a query and return all rows.
    fn query(&self, sql: &str, args: &[Value])
    -> impl Future<Output = Result<Vec<Self::Row>>> + Send;

    /// Prepare `sql` for repeated execution.
    ///
    /// Only called by a [`Db`] with a statement cache. `Ok(None)` (the
    /// default) sends every statement as text.
    fn prepare(&self, sql: &str) -> impl Future<Output = Result<Option<Self::Statement>>> + Send {
        let _ = sql;
        std::future::ready(Ok(None))
    }

    /// Execute a statement prepared from `sql`.
    fn execute_prepared(
        &self,
        statement: &Self::Statement,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = Result<u64>> + Send {
        let _ = statement;
        self.execute(sql, args)
    }

    /// Query through a statement prepared from `sql`.
    fn query_prepared(
        &self,
        statement: &Self::Statement,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = Result<Vec<Self::Row>>> + Send {
        let _ = statement;
        self.query(sql, args)
    }

    /// Whether `err` means a cached statement is no longer valid on the
    /// server and must be prepared again.
    fn is_stale_statement(&self, err: &Error) -> bool {
        let _ = err;
        false
    }

    /// Best-effort server-side cancellation of the statement in flight.
    ///
    /// Called when a deadline elapses mid-execution. The default does nothing.
    /// The tokio-postgres and deadpool implementations send the cancel
    /// request without TLS.
    fn cancel_in_flight(&self) {}
}

/// A driver that can open transactions.
///
/// A transaction runs on its connection, so it shares the connection's
/// prepared statements.
pub trait Connection: Driver {
    type Transaction<'a>: Transaction<Statement = Self::Statement>
    where
        Self: 'a;

    fn begin(&mut self) -> impl Future<Output = Result<Self::Transaction<'_>>> + Send;
}

/// An open transaction.
pub trait Transaction: Driver {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;

    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

/// Execution methods for every [`Statement`].
///
/// Each method records its call site for [`QueryInfo::caller`], so these are
/// plain functions returning futures rather than `async fn`s.
pub trait Execute: Statement {
    /// Run the statement and return the number of affected rows.
    #[track_caller]
    fn exec<'a, D: Driver>(&'a self, driver: &'a D) -> impl Future<Output = Result<u64>> + Send + 'a {
        run_execute(self, driver, None, Caller::capture())
    }

    /// Like [`Execute::exec`], failing with `DeadlineExceeded` once `deadline` passes.
    #[track_caller]
    fn exec_with_deadline<'a, D: Driver>(
        &'a self,
        driver: &'a D,
        deadline: Instant,
    ) -> impl Future<Output = Result<u64>> + Send + 'a {
        run_execute(self, driver, Some(deadline), Caller::capture())
    }

    #[track_caller]
    fn exec_with_timeout<'a, D: Driver>(
        &'a self,
        driver: &'a D,
        timeout: Duration,
    ) -> impl Future<Output = Result<u64>> + Send + 'a {
        run_execute(self, driver, Some(Instant::now() + timeout), Caller::capture())
    }

    /// Run the statement and return all rows.
    #[track_caller]
    fn query<'a, D: Driver>(
        &'a self,
        driver: &'a D,
    ) -> impl Future<Output = Result<Vec<D::Row>>> + Send + 'a {
        run_query(self, driver, None, Caller::capture())
    }

    #[track_caller]
    fn query_with_deadline<'a, D: Driver>(
        &'a self,
        driver: &'a D,
        deadline: Instant,
    ) -> impl Future<Output = Result<Vec<D::Row>>> + Send + 'a {
        run_query(self, driver, Some(deadline), Caller::capture())
    }
}

impl<S: Statement + ?Sized> Execute for S {}

/// Serialized statement plus what the loggers need.
struct Prepared {
    kind: StatementKind,
    sql: String,
    args: Vec<Value>,
    debug_sql: String,
    caller: Caller,
}

impl Prepared {
    fn new<S: Statement + ?Sized>(stmt: &S, dialect: &dyn Dialect, caller: Caller) -> Result<Self> {
        let (sql, args) = stmt.sql(dialect)?;
        let debug_sql = if logger::is_active() {
            stmt.debug_sql(dialect)?
        } else {
            String::new()
        };
        let prepared = Self {
            kind: stmt.kind(),
            sql,
            args,
            debug_sql,
            caller,
        };

        tracing::debug!(
            target: "jetsql.sql",
            kind = %prepared.kind,
            dialect = dialect.name(),
            sql = %prepared.sql,
            args = prepared.args.len(),
            caller = %prepared.caller,
            "executing statement"
        );
        logger::notify_statement(&LoggedStatement {
            kind: prepared.kind,
            sql: &prepared.sql,
            args: &prepared.args,
            debug_sql: &prepared.debug_sql,
            caller: prepared.caller,
        });
        Ok(prepared)
    }

    fn complete(self, rows_processed: u64, duration: Duration) {
        tracing::debug!(
            target: "jetsql.sql",
            kind = %self.kind,
            rows = rows_processed,
            duration_us = duration.as_micros() as u64,
            "statement completed"
        );
        if logger::has_query_logger() {
            logger::notify_query(&QueryInfo::new(
                self.kind,
                self.sql,
                self.args,
                self.debug_sql,
                rows_processed,
                duration,
                self.caller,
            ));
        }
    }

    fn failed(&self, err: &Error) {
        tracing::debug!(
            target: "jetsql.sql",
            kind = %self.kind,
            caller = %self.caller,
            error = %err,
            "statement failed"
        );
    }
}

fn check_deadline(deadline: Option<Instant>) -> Result<()> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(Error::DeadlineExceeded(Duration::ZERO)),
        _ => Ok(()),
    }
}

/// Await `future`, cancelling through the driver when `deadline` elapses first.
pub(crate) async fn within_deadline<D, T, F>(driver: &D, deadline: Option<Instant>, future: F) -> Result<T>
where
    D: Driver + ?Sized,
    F: Future<Output = Result<T>> + Send,
{
    let Some(deadline) = deadline else {
        return future.await;
    };
    let budget = deadline.saturating_duration_since(Instant::now());

    tokio::pin!(future);
    tokio::select! {
        result = &mut future => result,
        _ = tokio::time::sleep_until(deadline) => {
            driver.cancel_in_flight();
            Err(Error::DeadlineExceeded(budget))
        }
    }
}

async fn run_execute<S, D>(
    stmt: &S,
    driver: &D,
    deadline: Option<Instant>,
    caller: Caller,
) -> Result<u64>
where
    S: Statement + ?Sized,
    D: Driver,
{
    let prepared = Prepared::new(stmt, driver.dialect(), caller)?;
    let started = Instant::now();
    let result = match check_deadline(deadline) {
        Ok(()) => {
            let future = driver.execute(&prepared.sql, &prepared.args);
            within_deadline(driver, deadline, future).await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(rows) => {
            prepared.complete(rows, started.elapsed());
            Ok(rows)
        }
        Err(err) => {
            prepared.failed(&err);
            Err(err)
        }
    }
}

async fn run_query<S, D>(
    stmt: &S,
    driver: &D,
    deadline: Option<Instant>,
    caller: Caller,
) -> Result<Vec<D::Row>>
where
    S: Statement + ?Sized,
    D: Driver,
{
    let prepared = Prepared::new(stmt, driver.dialect(), caller)?;
    let started = Instant::now();
    let result = match check_deadline(deadline) {
        Ok(()) => {
            let future = driver.query(&prepared.sql, &prepared.args);
            within_deadline(driver, deadline, future).await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(rows) => {
            prepared.complete(rows.len() as u64, started.elapsed());
            Ok(rows)
        }
        Err(err) => {
            prepared.failed(&err);
            Err(err)
        }
    }
}
