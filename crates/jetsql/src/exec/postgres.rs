//! `Driver` for tokio-postgres clients and transactions.

use super::{Connection, Driver};
use crate::dialect::{Dialect, POSTGRES};
use crate::error::{Error, Result};
use crate::value::Value;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{CancelToken, Client, NoTls, Row, Statement};

pub(super) fn params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// A cached plan invalidated by a schema change, or a statement the server
/// no longer knows (e.g. after `DISCARD ALL`).
pub(super) fn is_stale_statement(err: &Error) -> bool {
    let Some(db_err) = err
        .driver_error::<tokio_postgres::Error>()
        .and_then(|e| e.as_db_error())
    else {
        return false;
    };
    match db_err.code() {
        code if *code == SqlState::FEATURE_NOT_SUPPORTED => db_err
            .message()
            .to_ascii_lowercase()
            .contains("cached plan must not change result type"),
        code => *code == SqlState::INVALID_SQL_STATEMENT_NAME,
    }
}

/// Send a cancel request for the connection behind `token`.
///
/// The request opens a separate connection without TLS, since a
/// `tokio_postgres::Client` does not keep its TLS connector. Servers that
/// reject plain connections refuse the cancel; the failure is logged and
/// the statement still ends with `DeadlineExceeded`. Implement
/// [`Driver::cancel_in_flight`] on a wrapper to cancel over TLS.
pub(super) fn cancel(token: CancelToken) {
    tokio::spawn(async move {
        if let Err(err) = token.cancel_query(NoTls).await {
            tracing::warn!(target: "jetsql.sql", error = %err, "failed to cancel statement");
        }
    });
}

impl Driver for Client {
    type Row = Row;
    type Statement = Statement;

    fn dialect(&self) -> &'static dyn Dialect {
        &POSTGRES
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        let params = params(args);
        Client::execute(self, sql, &params).await.map_err(Error::from)
    }

    async fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        let params = params(args);
        Client::query(self, sql, &params).await.map_err(Error::from)
    }

    async fn prepare(&self, sql: &str) -> Result<Option<Statement>> {
        Client::prepare(self, sql).await.map(Some).map_err(Error::from)
    }

    async fn execute_prepared(&self, statement: &Statement, _sql: &str, args: &[Value]) -> Result<u64> {
        let params = params(args);
        Client::execute(self, statement, &params)
            .await
            .map_err(Error::from)
    }

    async fn query_prepared(&self, statement: &Statement, _sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        let params = params(args);
        Client::query(self, statement, &params)
            .await
            .map_err(Error::from)
    }

    fn is_stale_statement(&self, err: &Error) -> bool {
        is_stale_statement(err)
    }

    fn cancel_in_flight(&self) {
        cancel(self.cancel_token());
    }
}

impl Connection for Client {
    type Transaction<'a> = tokio_postgres::Transaction<'a>;

    async fn begin(&mut self) -> Result<tokio_postgres::Transaction<'_>> {
        self.transaction().await.map_err(Error::from)
    }
}

impl Driver for tokio_postgres::Transaction<'_> {
    type Row = Row;
    type Statement = Statement;

    fn dialect(&self) -> &'static dyn Dialect {
        &POSTGRES
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        let params = params(args);
        tokio_postgres::Transaction::execute(self, sql, &params)
            .await
            .map_err(Error::from)
    }

    async fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        let params = params(args);
        tokio_postgres::Transaction::query(self, sql, &params)
            .await
            .map_err(Error::from)
    }

    async fn prepare(&self, sql: &str) -> Result<Option<Statement>> {
        tokio_postgres::Transaction::prepare(self, sql)
            .await
            .map(Some)
            .map_err(Error::from)
    }

    async fn execute_prepared(&self, statement: &Statement, _sql: &str, args: &[Value]) -> Result<u64> {
        let params = params(args);
        tokio_postgres::Transaction::execute(self, statement, &params)
            .await
            .map_err(Error::from)
    }

    async fn query_prepared(&self, statement: &Statement, _sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        let params = params(args);
        tokio_postgres::Transaction::query(self, statement, &params)
            .await
            .map_err(Error::from)
    }

    fn is_stale_statement(&self, err: &Error) -> bool {
        is_stale_statement(err)
    }

    fn cancel_in_flight(&self) {
        cancel(self.cancel_token());
    }
}

impl super::Transaction for tokio_postgres::Transaction<'_> {
    async fn commit(self) -> Result<()> {
        tokio_postgres::Transaction::commit(self)
            .await
            .map_err(Error::from)
    }

    async fn rollback(self) -> Result<()> {
        tokio_postgres::Transaction::rollback(self)
            .await
            .map_err(Error::from)
    }
}
