use async_trait::async_trait;

use mydump_core::Result;

/// Result set with every value read as nullable text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Query runner the dump pipeline is driven through.
///
/// Implementations report every driver or decoding failure as
/// [`mydump_core::Error::Query`]. Calls are issued one at a time and each
/// result is fully read before the next query starts.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// First column of the single row returned by `sql`.
    async fn fetch_scalar(&self, sql: &str) -> Result<Option<String>>;

    /// First two columns of the single row returned by `sql`.
    async fn fetch_pair(&self, sql: &str) -> Result<(Option<String>, Option<String>)>;

    /// First column of every row returned by `sql`.
    async fn fetch_column(&self, sql: &str) -> Result<Vec<Option<String>>>;

    /// Column names and all rows returned by `sql`.
    async fn fetch_rows(&self, sql: &str) -> Result<TextResult>;
}
