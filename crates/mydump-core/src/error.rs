use std::fmt;

use thiserror::Error;

/// Kind of object an introspection query was scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Database,
    Table,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Database => f.write_str("database"),
            ObjectKind::Table => f.write_str("table"),
        }
    }
}

/// Core error type shared across mydump crates.
///
/// Every variant is fatal for a dump: the assembler propagates the first one it
/// sees and never returns a partially built document.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying query or row scan failed.
    #[error("query error: {0}")]
    Query(String),
    /// An introspection query answered for a different object than requested.
    #[error("{kind} not found: requested `{requested}`, server returned `{returned}`")]
    NotFound {
        kind: ObjectKind,
        requested: String,
        returned: String,
    },
    /// A table scan reported no columns, so no value tuples can be built.
    #[error("no columns in table {0}")]
    NoColumns(String),
    /// Dump options were rejected before any query ran.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl Error {
    pub fn query(err: impl fmt::Display) -> Self {
        Error::Query(err.to_string())
    }
}

/// Convenience alias for results returned by mydump crates.
pub type Result<T> = std::result::Result<T, Error>;
