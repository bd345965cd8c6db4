//! `Driver` for deadpool-postgres pooled clients, plus pool construction.

use super::postgres::{cancel, is_stale_statement, params};
use super::{Connection, Driver};
use crate::dialect::{Dialect, POSTGRES};
use crate::error::{Error, Result};
use crate::value::Value;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{NoTls, Row, Statement};

/// Create a `NoTls` connection pool holding at most `max_size` connections.
///
/// ```ignore
/// let pool = jetsql::create_pool("postgres://postgres@localhost/app", 16)?;
/// let client = pool.get().await.map_err(jetsql::Error::driver)?;
/// users.select(&[&users.id]).query(&client).await?;
/// ```
pub fn create_pool(database_url: &str, max_size: usize) -> Result<Pool> {
    let config: tokio_postgres::Config = database_url.parse()?;
    let manager = Manager::from_config(
        config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(Error::driver)
}

impl Driver for deadpool_postgres::Client {
    type Row = Row;
    type Statement = Statement;

    fn dialect(&self) -> &'static dyn Dialect {
        &POSTGRES
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        let client: &tokio_postgres::Client = self;
        let params = params(args);
        client.execute(sql, &params).await.map_err(Error::from)
    }

    async fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        let params = params(args);
        client.query(sql, &params).await.map_err(Error::from)
    }

    async fn prepare(&self, sql: &str) -> Result<Option<Statement>> {
        let client: &tokio_postgres::Client = self;
        client.prepare(sql).await.map(Some).map_err(Error::from)
    }

    async fn execute_prepared(&self, statement: &Statement, _sql: &str, args: &[Value]) -> Result<u64> {
        let client: &tokio_postgres::Client = self;
        let params = params(args);
        client.execute(statement, &params).await.map_err(Error::from)
    }

    async fn query_prepared(&self, statement: &Statement, _sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        let params = params(args);
        client.query(statement, &params).await.map_err(Error::from)
    }

    fn is_stale_statement(&self, err: &Error) -> bool {
        is_stale_statement(err)
    }

    fn cancel_in_flight(&self) {
        let client: &tokio_postgres::Client = self;
        cancel(client.cancel_token());
    }
}

impl Connection for deadpool_postgres::Client {
    type Transaction<'a> = tokio_postgres::Transaction<'a>;

    async fn begin(&mut self) -> Result<tokio_postgres::Transaction<'_>> {
        let client: &mut tokio_postgres::Client = self;
        client.transaction().await.map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_connection<C: Connection>() {}

    #[test]
    fn pooled_client_is_a_connection() {
        assert_connection::<deadpool_postgres::Client>();
    }

    #[test]
    fn rejects_malformed_url() {
        match create_pool("postgres://localhost:notaport/db", 4) {
            Err(err) => assert_eq!(err.kind(), crate::ErrorKind::Driver),
            Ok(_) => panic!("malformed url accepted"),
        }
    }

    #[tokio::test]
    async fn pool_builds_without_connecting() {
        let Ok(pool) = create_pool("postgres://postgres@localhost/jetsql", 2) else {
            panic!("pool construction failed");
        };
        assert_eq!(pool.status().max_size, 2);
    }
}
