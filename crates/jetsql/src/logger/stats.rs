use super::{LoggedStatement, QueryInfo, QueryLogger, StatementLogger};
use crate::error::LoggingError;
use crate::stmt::StatementKind;
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Snapshot of the counters kept by [`StatsLogger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementStats {
    /// Statements handed to a driver (only counted when registered as the
    /// statement logger).
    pub started: u64,
    /// Statements that completed successfully.
    pub completed: u64,
    pub select_count: u64,
    pub insert_count: u64,
    pub update_count: u64,
    pub delete_count: u64,
    /// LOCK and UNLOCK statements.
    pub lock_count: u64,
    /// Sum of affected/returned rows.
    pub rows_processed: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
    /// Placeholder SQL of the slowest completed statement.
    pub slowest_sql: Option<String>,
}

impl StatementStats {
    /// Statements that were started but did not complete successfully.
    pub fn failed(&self) -> u64 {
        self.started.saturating_sub(self.completed)
    }

    pub fn average_duration(&self) -> Option<Duration> {
        u32::try_from(self.completed)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| self.total_duration / n)
    }
}

/// Aggregates statement statistics in memory.
///
/// Register one shared instance as the query logger, and optionally as the
/// statement logger too so failures are counted:
///
/// ```
/// use jetsql::logger::{self, StatsLogger};
/// use std::sync::Arc;
///
/// let stats = Arc::new(StatsLogger::new());
/// logger::set_query_logger_arc(stats.clone());
/// logger::set_statement_logger_arc(stats.clone());
///
/// assert_eq!(stats.stats().completed, 0);
/// # logger::clear_loggers();
/// ```
#[derive(Debug, Default)]
pub struct StatsLogger {
    started: AtomicU64,
    completed: AtomicU64,
    select_count: AtomicU64,
    insert_count: AtomicU64,
    update_count: AtomicU64,
    delete_count: AtomicU64,
    lock_count: AtomicU64,
    rows_processed: AtomicU64,
    total_duration_nanos: AtomicU64,
    max_duration_nanos: AtomicU64,
    slowest_sql: Mutex<Option<String>>,
}

fn saturating_add(counter: &AtomicU64, n: u64) {
    let prev = counter.fetch_add(n, Ordering::Relaxed);
    if prev.checked_add(n).is_none() {
        counter.store(u64::MAX, Ordering::Relaxed);
    }
}

impl StatsLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> StatementStats {
        StatementStats {
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            select_count: self.select_count.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            lock_count: self.lock_count.load(Ordering::Relaxed),
            rows_processed: self.rows_processed.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_sql: self
                .slowest_sql
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.started,
            &self.completed,
            &self.select_count,
            &self.insert_count,
            &self.update_count,
            &self.delete_count,
            &self.lock_count,
            &self.rows_processed,
            &self.total_duration_nanos,
            &self.max_duration_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        *self
            .slowest_sql
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn kind_counter(&self, kind: StatementKind) -> &AtomicU64 {
        match kind {
            StatementKind::Select => &self.select_count,
            StatementKind::Insert => &self.insert_count,
            StatementKind::Update => &self.update_count,
            StatementKind::Delete => &self.delete_count,
            StatementKind::Lock | StatementKind::Unlock => &self.lock_count,
        }
    }
}

impl StatementLogger for StatsLogger {
    fn log_statement(&self, _statement: &LoggedStatement<'_>) -> Result<(), LoggingError> {
        self.started.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl QueryLogger for StatsLogger {
    fn log_query(&self, info: &QueryInfo) -> Result<(), LoggingError> {
        let nanos = u64::try_from(info.duration().as_nanos()).unwrap_or(u64::MAX);

        self.completed.fetch_add(1, Ordering::Relaxed);
        self.kind_counter(info.kind()).fetch_add(1, Ordering::Relaxed);
        saturating_add(&self.rows_processed, info.rows_processed());
        saturating_add(&self.total_duration_nanos, nanos);

        let mut current_max = self.max_duration_nanos.load(Ordering::Relaxed);
        while nanos > current_max {
            match self.max_duration_nanos.compare_exchange_weak(
                current_max,
                nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    let mut slowest = self
                        .slowest_sql
                        .lock()
                        .map_err(|_| LoggingError::new("slowest statement lock poisoned"))?;
                    *slowest = Some(info.sql().to_string());
                    break;
                }
                Err(updated) => current_max = updated,
            }
        }
        Ok(())
    }
}
