//! SQL type markers for typed expressions.

use std::fmt;

/// Runtime tag carried by projections and derived-table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Integer,
    Float,
    Text,
    Bytes,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Uuid,
    /// Untyped raw fragment.
    Raw,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::Json => "json",
            Self::Uuid => "uuid",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker trait implemented by the zero-sized SQL type markers.
pub trait SqlType: Send + Sync + 'static {
    const TAG: TypeTag;
}

/// Types with a total order: `<`, `<=`, `>`, `>=`, `BETWEEN`, `MIN`, `MAX`.
pub trait Comparable: SqlType {}

/// Types supporting arithmetic, `SUM` and `AVG`.
pub trait Numeric: Comparable {}

macro_rules! sql_types {
    ($($(#[$meta:meta])* $name:ident => $tag:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name;

            impl SqlType for $name {
                const TAG: TypeTag = TypeTag::$tag;
            }
        )*
    };
}

sql_types! {
    Bool => Bool,
    Integer => Integer,
    Float => Float,
    Text => Text,
    Bytes => Bytes,
    Date => Date,
    Time => Time,
    Timestamp => Timestamp,
    /// Timestamp with time zone.
    TimestampTz => TimestampTz,
    Json => Json,
    Uuid => Uuid,
    /// Escape hatch for fragments whose type the builder cannot know.
    Raw => Raw,
}

impl Comparable for Integer {}
impl Comparable for Float {}
impl Comparable for Text {}
impl Comparable for Bytes {}
impl Comparable for Date {}
impl Comparable for Time {}
impl Comparable for Timestamp {}
impl Comparable for TimestampTz {}
impl Comparable for Uuid {}
impl Comparable for Raw {}

impl Numeric for Integer {}
impl Numeric for Float {}
impl Numeric for Raw {}
