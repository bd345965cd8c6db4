//! Error types for jetsql

use std::time::Duration;
use thiserror::Error;

/// Result type alias for statement execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for statement construction and serialization.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Boxed error produced by a driver collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A malformed or incomplete statement tree.
///
/// Raised either while composing the tree (e.g. resolving a column against a
/// derived table) or while serializing it. No SQL is ever returned alongside
/// a `BuildError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A column was requested from a derived table that does not project it.
    #[error("column '{column}' not found in '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// A projection has neither an explicit alias nor a column name.
    #[error("projection #{position} of '{table}' has no name; add an alias")]
    UnnamedProjection { table: String, position: usize },

    /// Two projections of a derived table resolve to the same alias.
    #[error("duplicate column alias '{alias}' in '{table}'")]
    DuplicateAlias { table: String, alias: String },

    /// SELECT with no projections.
    #[error("SELECT statement has an empty projection list")]
    EmptyProjection,

    /// A clause that requires at least one element is empty.
    #[error("{statement}: {clause} clause is empty")]
    EmptyClause {
        statement: &'static str,
        clause: &'static str,
    },

    /// UPDATE/DELETE without a WHERE condition.
    #[error("{0}: WHERE clause not set")]
    MissingWhere(&'static str),

    /// A VALUES row does not match the INSERT column list.
    #[error("INSERT row #{row} has {got} values, expected {expected}")]
    ValueCountMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A clause or lock mode the active dialect cannot express.
    #[error("{dialect} does not support {feature}")]
    DialectUnsupported {
        dialect: &'static str,
        feature: String,
    },

    /// Number of `?` markers in a raw fragment differs from its arguments.
    #[error("raw SQL '{sql}' has {markers} argument markers but {args} arguments")]
    RawArgumentMismatch {
        sql: String,
        markers: usize,
        args: usize,
    },

    /// A column is qualified by a table that is not a FROM source of its
    /// statement or of any enclosing statement.
    #[error("'{0}' is not a source of the statement or any enclosing statement")]
    TableNotInScope(String),

    /// A common table expression is read without being declared by `WITH`.
    #[error("common table expression '{0}' is not declared by any WITH clause in scope")]
    UndeclaredCte(String),

    /// An identifier is empty or contains a NUL character.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

impl BuildError {
    /// Create a dialect-unsupported error.
    pub fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Self::DialectUnsupported {
            dialect,
            feature: feature.into(),
        }
    }
}

/// Failure reported by a registered logger callback.
///
/// Never returned to the caller of a statement: the execution path reports it
/// through `tracing` and continues.
#[derive(Debug, Error)]
#[error("logger failed: {0}")]
pub struct LoggingError(pub String);

impl LoggingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Broad error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed statement; fix the statement.
    Build,
    /// Connection, execution or cancellation failure from the driver layer.
    Driver,
}

/// Errors returned by statement execution.
#[derive(Debug, Error)]
pub enum Error {
    /// Statement could not be built or serialized.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Error returned by the driver collaborator, unchanged.
    #[error("driver error: {0}")]
    Driver(#[source] BoxError),

    /// The caller-supplied deadline elapsed before or during execution.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

impl Error {
    /// Wrap a driver error without reinterpreting it.
    pub fn driver(err: impl Into<BoxError>) -> Self {
        Self::Driver(err.into())
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Build(_) => ErrorKind::Build,
            Self::Driver(_) | Self::DeadlineExceeded(_) => ErrorKind::Driver,
        }
    }

    /// Check if this is a build error.
    pub fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    /// Check if this is a deadline/cancellation error.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded(_))
    }

    /// Downcast the driver error to its concrete type.
    pub fn driver_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Driver(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Render the error chain one cause per line.
    pub fn trace(&self) -> String {
        let mut out = String::from("Error trace:");
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(err) = current {
            out.push_str("\n - ");
            out.push_str(&err.to_string());
            current = err.source();
        }
        out
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Driver(Box::new(err))
    }
}
