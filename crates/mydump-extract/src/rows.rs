//! Table scans and value batching.

use std::num::NonZeroUsize;

use tracing::debug;

use mydump_core::{Error, LiteralMode, Result, value_tuple};

use crate::executor::QueryExecutor;
use crate::options::checked_batch_size;
use crate::queries;

/// Scan `table` and return its rows as `INSERT` value batches.
///
/// Rows keep the server's scan order. Every batch holds at most `batch_size`
/// tuples; an empty table yields a single empty batch.
pub async fn extract_batches<E>(
    executor: &E,
    table: &str,
    batch_size: usize,
    mode: LiteralMode,
) -> Result<Vec<String>>
where
    E: QueryExecutor + ?Sized,
{
    let batch_size = checked_batch_size(batch_size)?;

    let result = executor.fetch_rows(&queries::select_all(table)).await?;
    if result.columns.is_empty() {
        return Err(Error::NoColumns(table.to_string()));
    }

    let tuples: Vec<String> = result
        .rows
        .iter()
        .map(|row| value_tuple(row.iter().map(|value| value.as_deref()), mode))
        .collect();
    debug!(table = %table, rows = tuples.len(), "scanned table");

    Ok(batch_tuples(tuples, batch_size))
}

/// Join tuples into comma-separated groups of at most `batch_size`.
///
/// The last group holds the remainder and is emitted even when empty.
pub fn batch_tuples(tuples: Vec<String>, batch_size: NonZeroUsize) -> Vec<String> {
    if tuples.is_empty() {
        return vec![String::new()];
    }
    tuples
        .chunks(batch_size.get())
        .map(|chunk| chunk.join(","))
        .collect()
}
