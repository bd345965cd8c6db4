//! Process-wide statement and query loggers.
//!
//! Two observers can be registered:
//!
//! - a [`StatementLogger`], told about every statement right before it is sent
//!   to the driver, whether or not it later succeeds;
//! - a [`QueryLogger`], given a [`QueryInfo`] for every statement that
//!   completed successfully.
//!
//! Registration is meant for application start-up (or test set-up). Loggers
//! are observers only: an error returned by a logger, or a panic inside one,
//! is reported with `tracing::warn!` and never fails the statement.
//!
//! ```
//! use jetsql::LoggingError;
//! use jetsql::logger::{self, QueryInfo};
//!
//! logger::set_query_logger(|info: &QueryInfo| -> Result<(), LoggingError> {
//!     println!("{} rows from {} ({})", info.rows_processed(), info.debug_sql(), info.caller());
//!     Ok(())
//! });
//! # logger::clear_loggers();
//! ```

mod stats;
mod tracing_logger;

pub use stats::{StatementStats, StatsLogger};
pub use tracing_logger::TracingLogger;

use crate::error::LoggingError;
use crate::stmt::StatementKind;
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Source location of the code that executed a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl Caller {
    #[track_caller]
    pub fn capture() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A statement about to be executed.
#[derive(Debug, Clone, Copy)]
pub struct LoggedStatement<'a> {
    pub kind: StatementKind,
    pub sql: &'a str,
    pub args: &'a [Value],
    /// SQL with arguments inlined as literals.
    pub debug_sql: &'a str,
    pub caller: Caller,
}

/// Record of a successfully executed statement.
///
/// Implements `serde::Serialize` for shipping to structured log sinks.
#[derive(Debug, Clone, Serialize)]
pub struct QueryInfo {
    kind: StatementKind,
    sql: String,
    args: Vec<Value>,
    debug_sql: String,
    rows_processed: u64,
    duration: Duration,
    caller: Caller,
}

impl QueryInfo {
    pub(crate) fn new(
        kind: StatementKind,
        sql: String,
        args: Vec<Value>,
        debug_sql: String,
        rows_processed: u64,
        duration: Duration,
        caller: Caller,
    ) -> Self {
        Self {
            kind,
            sql,
            args,
            debug_sql,
            rows_processed,
            duration,
            caller,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// SQL with placeholders, exactly as sent to the driver.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// SQL with arguments inlined as literals. For logs only.
    pub fn debug_sql(&self) -> &str {
        &self.debug_sql
    }

    /// Affected rows for `exec`, returned rows for `query`.
    pub fn rows_processed(&self) -> u64 {
        self.rows_processed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn caller(&self) -> Caller {
        self.caller
    }
}

/// Observer called before every statement reaches the driver.
pub trait StatementLogger: Send + Sync {
    fn log_statement(&self, statement: &LoggedStatement<'_>) -> Result<(), LoggingError>;
}

impl<F> StatementLogger for F
where
    F: Fn(&LoggedStatement<'_>) -> Result<(), LoggingError> + Send + Sync,
{
    fn log_statement(&self, statement: &LoggedStatement<'_>) -> Result<(), LoggingError> {
        self(statement)
    }
}

/// Observer called after every successful statement.
pub trait QueryLogger: Send + Sync {
    fn log_query(&self, info: &QueryInfo) -> Result<(), LoggingError>;
}

impl<F> QueryLogger for F
where
    F: Fn(&QueryInfo) -> Result<(), LoggingError> + Send + Sync,
{
    fn log_query(&self, info: &QueryInfo) -> Result<(), LoggingError> {
        self(info)
    }
}

struct Registry {
    statement: Option<Arc<dyn StatementLogger>>,
    query: Option<Arc<dyn QueryLogger>>,
}

static REGISTRY: RwLock<Registry> = RwLock::new(Registry {
    statement: None,
    query: None,
});

// A panic while holding the lock cannot leave `Registry` half-written, so a
// poisoned lock is still usable.
fn read_registry() -> std::sync::RwLockReadGuard<'static, Registry> {
    REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_registry() -> std::sync::RwLockWriteGuard<'static, Registry> {
    REGISTRY.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Register the statement logger, replacing any previous one.
pub fn set_statement_logger<L: StatementLogger + 'static>(logger: L) {
    set_statement_logger_arc(Arc::new(logger));
}

pub fn set_statement_logger_arc(logger: Arc<dyn StatementLogger>) {
    write_registry().statement = Some(logger);
}

/// Register the query logger, replacing any previous one.
pub fn set_query_logger<L: QueryLogger + 'static>(logger: L) {
    set_query_logger_arc(Arc::new(logger));
}

/// Register a shared query logger, e.g. a [`StatsLogger`] that is read
/// elsewhere.
pub fn set_query_logger_arc(logger: Arc<dyn QueryLogger>) {
    write_registry().query = Some(logger);
}

pub fn clear_statement_logger() {
    write_registry().statement = None;
}

pub fn clear_query_logger() {
    write_registry().query = None;
}

pub fn clear_loggers() {
    let mut registry = write_registry();
    registry.statement = None;
    registry.query = None;
}

pub(crate) fn is_active() -> bool {
    let registry = read_registry();
    registry.statement.is_some() || registry.query.is_some()
}

pub(crate) fn has_query_logger() -> bool {
    read_registry().query.is_some()
}

fn report(which: &'static str, outcome: std::thread::Result<Result<(), LoggingError>>) {
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::warn!(target: "jetsql.sql", logger = which, error = %err, "logger failed");
        }
        Err(_) => {
            tracing::warn!(target: "jetsql.sql", logger = which, "logger panicked");
        }
    }
}

pub(crate) fn notify_statement(statement: &LoggedStatement<'_>) {
    // Clone out of the lock so a logger may (re)register loggers.
    let Some(logger) = read_registry().statement.clone() else {
        return;
    };
    let outcome = catch_unwind(AssertUnwindSafe(|| logger.log_statement(statement)));
    report("statement", outcome);
}

pub(crate) fn notify_query(info: &QueryInfo) {
    let Some(logger) = read_registry().query.clone() else {
        return;
    };
    let outcome = catch_unwind(AssertUnwindSafe(|| logger.log_query(info)));
    report("query", outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_points_at_call_site() {
        let line = line!() + 1;
        let caller = Caller::capture();
        assert_eq!(caller.file, file!());
        assert_eq!(caller.line, line);
        assert_eq!(caller.to_string(), format!("{}:{}:{}", file!(), line, caller.column));
    }

    #[test]
    fn query_info_getters() {
        let info = QueryInfo::new(
            StatementKind::Select,
            "SELECT $1;".into(),
            vec![Value::Int(1)],
            "SELECT 1;".into(),
            3,
            Duration::from_millis(5),
            Caller::capture(),
        );
        assert_eq!(info.kind(), StatementKind::Select);
        assert_eq!(info.sql(), "SELECT $1;");
        assert_eq!(info.args(), &[Value::Int(1)]);
        assert_eq!(info.debug_sql(), "SELECT 1;");
        assert_eq!(info.rows_processed(), 3);
        assert_eq!(info.duration(), Duration::from_millis(5));
    }

    #[test]
    fn query_info_serializes_to_json() {
        let caller = Caller {
            file: "src/main.rs",
            line: 10,
            column: 5,
        };
        let info = QueryInfo::new(
            StatementKind::Delete,
            "DELETE FROM t WHERE (t.id = $1);".into(),
            vec![Value::Int(7), Value::Null],
            "DELETE FROM t WHERE (t.id = 7);".into(),
            1,
            Duration::from_millis(2),
            caller,
        );
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["kind"], "DELETE");
        assert_eq!(json["args"], serde_json::json!([7, null]));
        assert_eq!(json["rows_processed"], 1);
        assert_eq!(
            json["caller"],
            serde_json::json!({"file": "src/main.rs", "line": 10, "column": 5})
        );
    }

    #[test]
    fn loggers_can_be_swapped_while_statements_run() {
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::thread;

        const WORKERS: usize = 4;
        const ROUNDS: usize = 500;

        let statements = Arc::new(AtomicUsize::new(0));
        let queries = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicBool::new(false));
        let info = QueryInfo::new(
            StatementKind::Select,
            "SELECT $1;".into(),
            vec![Value::Int(1)],
            "SELECT 1;".into(),
            1,
            Duration::ZERO,
            Caller::capture(),
        );

        let swapper = {
            let statements = statements.clone();
            let queries = queries.clone();
            let done = done.clone();
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let seen = statements.clone();
                    set_statement_logger(move |_: &LoggedStatement<'_>| -> Result<(), LoggingError> {
                        seen.fetch_add(1, Ordering::Relaxed);
                        Ok(())
                    });
                    let seen = queries.clone();
                    set_query_logger(move |_: &QueryInfo| -> Result<(), LoggingError> {
                        seen.fetch_add(1, Ordering::Relaxed);
                        Ok(())
                    });
                    thread::yield_now();
                    clear_loggers();
                }
            })
        };

        let workers: Vec<_> = (0..WORKERS)
            .map(|_| {
                let info = info.clone();
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        notify_statement(&LoggedStatement {
                            kind: info.kind(),
                            sql: info.sql(),
                            args: info.args(),
                            debug_sql: info.debug_sql(),
                            caller: info.caller(),
                        });
                        notify_query(&info);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
        swapper.join().unwrap();

        // Every call reached at most one logger.
        assert!(statements.load(Ordering::Relaxed) <= WORKERS * ROUNDS);
        assert!(queries.load(Ordering::Relaxed) <= WORKERS * ROUNDS);
        assert!(!is_active());

        let before = queries.load(Ordering::Relaxed);
        let seen = queries.clone();
        set_query_logger(move |_: &QueryInfo| -> Result<(), LoggingError> {
            seen.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        notify_query(&info);
        clear_loggers();
        notify_query(&info);
        assert_eq!(queries.load(Ordering::Relaxed), before + 1);
    }
}
