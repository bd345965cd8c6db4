use super::{LoggedStatement, QueryInfo, QueryLogger, StatementLogger};
use crate::error::LoggingError;
use tracing::Level;

/// Emits statements and completed queries as `tracing` events under the
/// `jetsql.sql` target.
///
/// ```
/// use jetsql::logger::{self, TracingLogger};
///
/// logger::set_statement_logger(TracingLogger::new().level(tracing::Level::INFO));
/// logger::set_query_logger(TracingLogger::new().no_truncate());
/// # logger::clear_loggers();
/// ```
#[derive(Debug, Clone)]
pub struct TracingLogger {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

/// Cut `sql` to at most `max_bytes`, on a char boundary.
fn truncate_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn truncate(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl StatementLogger for TracingLogger {
    fn log_statement(&self, statement: &LoggedStatement<'_>) -> Result<(), LoggingError> {
        let sql = self.truncate(statement.sql);
        emit_at_level!(
            self.level,
            target: "jetsql.sql",
            kind = %statement.kind,
            args = statement.args.len(),
            caller = %statement.caller,
            sql = %sql,
            "statement"
        );
        Ok(())
    }
}

impl QueryLogger for TracingLogger {
    fn log_query(&self, info: &QueryInfo) -> Result<(), LoggingError> {
        let sql = self.truncate(info.debug_sql());
        emit_at_level!(
            self.level,
            target: "jetsql.sql",
            kind = %info.kind(),
            rows = info.rows_processed(),
            duration_us = info.duration().as_micros() as u64,
            caller = %info.caller(),
            sql = %sql,
            "query"
        );
        Ok(())
    }
}
