use std::num::NonZeroUsize;

use mydump_core::{DEFAULT_BATCH_SIZE, Error, LiteralMode, Result};

/// Options that control how a dump is extracted.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Maximum number of value tuples per `INSERT` statement.
    pub batch_size: usize,
    pub literal_mode: LiteralMode,
    /// Restrict the dump to these tables. Enumeration order is kept.
    pub tables: Option<Vec<String>>,
}

/// Reject a zero batch size.
pub fn checked_batch_size(batch_size: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(batch_size)
        .ok_or_else(|| Error::InvalidOptions("batch size must be at least 1".to_string()))
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            literal_mode: LiteralMode::Raw,
            tables: None,
        }
    }
}

impl DumpOptions {
    pub fn validate(&self) -> Result<()> {
        checked_batch_size(self.batch_size).map(|_| ())
    }

    pub(crate) fn includes(&self, table: &str) -> bool {
        self.tables
            .as_ref()
            .is_none_or(|tables| tables.iter().any(|name| name == table))
    }
}
