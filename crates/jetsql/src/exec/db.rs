use super::statement_cache::StatementCache;
use super::{Connection, Driver, Transaction, within_deadline};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for a [`Db`] handle.
///
/// By default there is no timeout, no slow-query reporting and no statement
/// cache.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Timeout applied to every statement. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
    /// Statements slower than this are reported with `tracing::warn!`.
    pub slow_query_threshold: Option<Duration>,
    /// Prepared statement cache (per connection).
    pub statement_cache: StatementCacheConfig,
}

/// Prepared statement cache settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementCacheConfig {
    pub enabled: bool,
    /// Most statements kept per connection; the least recently used is
    /// dropped first.
    pub capacity: usize,
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default statement timeout.
    ///
    /// Statements exceeding it are cancelled through the driver and fail with
    /// `Error::DeadlineExceeded`.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Prepare each distinct SQL text once and reuse the statement handle.
    ///
    /// Prepared statements live on one connection, so keep `capacity`
    /// modest for highly dynamic SQL. A capacity of 0 disables the cache.
    /// Drivers without prepared statements ignore this.
    pub fn with_statement_cache(mut self, capacity: usize) -> Self {
        self.statement_cache = StatementCacheConfig {
            enabled: capacity > 0,
            capacity,
        };
        self
    }

    pub fn no_statement_cache(mut self) -> Self {
        self.statement_cache.enabled = false;
        self
    }
}

/// A driver wrapped with a [`DbConfig`] and an optional dialect override.
///
/// `Db` is itself a [`Driver`], so statements run against it the same way as
/// against the raw driver:
///
/// ```no_run
/// # async fn demo(client: tokio_postgres::Client) -> jetsql::Result<()> {
/// use jetsql::prelude::*;
/// use std::time::Duration;
///
/// let db = Db::new(client)
///     .with_config(DbConfig::new().with_query_timeout(Duration::from_secs(5)))
///     .with_dialect(&COCKROACH_DB);
///
/// let users = Table::new("users");
/// let id = users.column::<Integer>("id");
/// users.delete().where_expr(id.eq(1)).exec(&db).await?;
/// # Ok(())
/// # }
/// ```
pub struct Db<D: Driver> {
    driver: D,
    dialect: &'static dyn Dialect,
    config: DbConfig,
    cache: Option<Arc<StatementCache<D::Statement>>>,
}

impl<D: Driver> Db<D> {
    pub fn new(driver: D) -> Self {
        let dialect = driver.dialect();
        Self {
            driver,
            dialect,
            config: DbConfig::default(),
            cache: None,
        }
    }

    /// Replace the configuration. Enabling the statement cache starts it
    /// empty.
    pub fn with_config(mut self, config: DbConfig) -> Self {
        let cache = config.statement_cache;
        self.cache = (cache.enabled && cache.capacity > 0)
            .then(|| Arc::new(StatementCache::new(cache.capacity)));
        self.config = config;
        self
    }

    /// Serialize for `dialect` instead of the driver's own (e.g. CockroachDB
    /// over the Postgres wire protocol).
    pub fn with_dialect(mut self, dialect: &'static dyn Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn inner(&self) -> &D {
        &self.driver
    }

    pub fn into_inner(self) -> D {
        self.driver
    }

    /// Number of prepared statements currently cached.
    pub fn cached_statements(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.query_timeout.map(|timeout| Instant::now() + timeout)
    }

    fn report(&self, sql: &str, started: Instant) {
        let elapsed = started.elapsed();
        if let Some(threshold) = self.config.slow_query_threshold {
            if elapsed > threshold {
                tracing::warn!(
                    target: "jetsql.sql",
                    duration_ms = elapsed.as_millis() as u64,
                    threshold_ms = threshold.as_millis() as u64,
                    sql = %sql,
                    "slow statement"
                );
            }
        }
    }

    async fn cached_statement(
        &self,
        cache: &StatementCache<D::Statement>,
        sql: &str,
    ) -> Result<Option<D::Statement>> {
        if let Some(statement) = cache.get(sql) {
            return Ok(Some(statement));
        }
        let Some(statement) = self.driver.prepare(sql).await? else {
            return Ok(None);
        };
        tracing::trace!(target: "jetsql.sql", sql = %sql, "prepared statement cached");
        Ok(Some(cache.insert_if_absent(sql, statement)))
    }

    /// Run through a cached statement when the cache is on and the driver
    /// prepares, otherwise as text. A stale statement is prepared again once.
    async fn run<T, F, Fut>(&self, sql: &str, send: F) -> Result<T>
    where
        F: Fn(Option<D::Statement>) -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let Some(cache) = &self.cache else {
            return send(None).await;
        };
        let statement = self.cached_statement(cache, sql).await?;
        let prepared = statement.is_some();
        match send(statement).await {
            Err(err) if prepared && self.driver.is_stale_statement(&err) => {
                tracing::debug!(target: "jetsql.sql", sql = %sql, error = %err, "re-preparing stale statement");
                cache.remove(sql);
                send(self.cached_statement(cache, sql).await?).await
            }
            result => result,
        }
    }
}

impl<D: Driver> Driver for Db<D> {
    type Row = D::Row;
    type Statement = D::Statement;

    fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        let started = Instant::now();
        let driver = &self.driver;
        let future = self.run(sql, move |statement| async move {
            match statement {
                Some(statement) => driver.execute_prepared(&statement, sql, args).await,
                None => driver.execute(sql, args).await,
            }
        });
        let result = within_deadline(driver, self.deadline(), future).await;
        self.report(sql, started);
        result
    }

    async fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Self::Row>> {
        let started = Instant::now();
        let driver = &self.driver;
        let future = self.run(sql, move |statement| async move {
            match statement {
                Some(statement) => driver.query_prepared(&statement, sql, args).await,
                None => driver.query(sql, args).await,
            }
        });
        let result = within_deadline(driver, self.deadline(), future).await;
        self.report(sql, started);
        result
    }

    async fn prepare(&self, sql: &str) -> Result<Option<D::Statement>> {
        self.driver.prepare(sql).await
    }

    async fn execute_prepared(&self, statement: &D::Statement, sql: &str, args: &[Value]) -> Result<u64> {
        self.driver.execute_prepared(statement, sql, args).await
    }

    async fn query_prepared(
        &self,
        statement: &D::Statement,
        sql: &str,
        args: &[Value],
    ) -> Result<Vec<Self::Row>> {
        self.driver.query_prepared(statement, sql, args).await
    }

    fn is_stale_statement(&self, err: &Error) -> bool {
        self.driver.is_stale_statement(err)
    }

    fn cancel_in_flight(&self) {
        self.driver.cancel_in_flight();
    }
}

impl<C: Connection> Connection for Db<C> {
    type Transaction<'a>
        = Db<C::Transaction<'a>>
    where
        Self: 'a;

    async fn begin(&mut self) -> Result<Self::Transaction<'_>> {
        let tx = self.driver.begin().await?;
        Ok(Db {
            driver: tx,
            dialect: self.dialect,
            config: self.config.clone(),
            cache: self.cache.clone(),
        })
    }
}

impl<T: Transaction> Transaction for Db<T> {
    async fn commit(self) -> Result<()> {
        self.driver.commit().await
    }

    async fn rollback(self) -> Result<()> {
        self.driver.rollback().await
    }
}
