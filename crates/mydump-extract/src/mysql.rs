//! MySQL/MariaDB executors backed by `sqlx`.
//!
//! Statements are sent through the text protocol, so every column value
//! arrives as text regardless of its declared type.

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlPool, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::{Column, Executor, Row};
use tokio::sync::Mutex;
use tracing::debug;

use mydump_core::{Error, Result};

use crate::executor::{QueryExecutor, TextResult};

/// Executor that runs each query on any connection of a pool.
#[derive(Debug, Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    /// Create a new executor using a pre-configured pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryExecutor for MySqlExecutor {
    async fn fetch_scalar(&self, sql: &str) -> Result<Option<String>> {
        let row = fetch_one(&self.pool, sql).await?;
        text_at(&row, 0)
    }

    async fn fetch_pair(&self, sql: &str) -> Result<(Option<String>, Option<String>)> {
        let row = fetch_one(&self.pool, sql).await?;
        Ok((text_at(&row, 0)?, text_at(&row, 1)?))
    }

    async fn fetch_column(&self, sql: &str) -> Result<Vec<Option<String>>> {
        let rows = fetch_all(&self.pool, sql).await?;
        rows.iter().map(|row| text_at(row, 0)).collect()
    }

    async fn fetch_rows(&self, sql: &str) -> Result<TextResult> {
        let rows = fetch_all(&self.pool, sql).await?;
        let columns = if rows.is_empty() {
            describe_columns(&self.pool, sql).await?
        } else {
            column_names(&rows[0])
        };
        into_text_result(columns, rows)
    }
}

/// Executor pinned to a single connection.
///
/// Lets a whole dump run inside one consistent-snapshot transaction.
pub struct MySqlConnExecutor {
    conn: Mutex<PoolConnection<MySql>>,
}

impl MySqlConnExecutor {
    pub fn new(conn: PoolConnection<MySql>) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Acquire a dedicated connection from `pool`.
    pub async fn acquire(pool: &MySqlPool) -> Result<Self> {
        let conn = pool.acquire().await.map_err(Error::query)?;
        Ok(Self::new(conn))
    }

    /// Open a repeatable-read transaction with a consistent snapshot.
    pub async fn begin_snapshot(&self) -> Result<()> {
        let mut conn = self.conn.lock().await;
        execute(&mut **conn, "SET SESSION TRANSACTION ISOLATION LEVEL REPEATABLE READ").await?;
        execute(&mut **conn, "START TRANSACTION WITH CONSISTENT SNAPSHOT").await
    }

    /// Close the snapshot transaction. Nothing was written, so it is rolled back.
    pub async fn end_snapshot(&self) -> Result<()> {
        let mut conn = self.conn.lock().await;
        execute(&mut **conn, "ROLLBACK").await
    }
}

#[async_trait]
impl QueryExecutor for MySqlConnExecutor {
    async fn fetch_scalar(&self, sql: &str) -> Result<Option<String>> {
        let mut conn = self.conn.lock().await;
        let row = fetch_one(&mut **conn, sql).await?;
        text_at(&row, 0)
    }

    async fn fetch_pair(&self, sql: &str) -> Result<(Option<String>, Option<String>)> {
        let mut conn = self.conn.lock().await;
        let row = fetch_one(&mut **conn, sql).await?;
        Ok((text_at(&row, 0)?, text_at(&row, 1)?))
    }

    async fn fetch_column(&self, sql: &str) -> Result<Vec<Option<String>>> {
        let mut conn = self.conn.lock().await;
        let rows = fetch_all(&mut **conn, sql).await?;
        rows.iter().map(|row| text_at(row, 0)).collect()
    }

    async fn fetch_rows(&self, sql: &str) -> Result<TextResult> {
        let mut conn = self.conn.lock().await;
        let rows = fetch_all(&mut **conn, sql).await?;
        let columns = if rows.is_empty() {
            describe_columns(&mut **conn, sql).await?
        } else {
            column_names(&rows[0])
        };
        into_text_result(columns, rows)
    }
}

async fn execute<'c, X>(executor: X, sql: &'c str) -> Result<()>
where
    X: Executor<'c, Database = MySql>,
{
    debug!(sql = %sql, "executing statement");
    sqlx::raw_sql(sql)
        .execute(executor)
        .await
        .map_err(Error::query)?;
    Ok(())
}

async fn fetch_one<'c, X>(executor: X, sql: &'c str) -> Result<MySqlRow>
where
    X: Executor<'c, Database = MySql>,
{
    debug!(sql = %sql, "executing query");
    executor
        .fetch_optional(sqlx::raw_sql(sql))
        .await
        .map_err(Error::query)?
        .ok_or_else(|| Error::Query(format!("no rows returned by `{sql}`")))
}

async fn fetch_all<'c, X>(executor: X, sql: &'c str) -> Result<Vec<MySqlRow>>
where
    X: Executor<'c, Database = MySql>,
{
    debug!(sql = %sql, "executing query");
    executor
        .fetch_all(sqlx::raw_sql(sql))
        .await
        .map_err(Error::query)
}

async fn describe_columns<'c, X>(executor: X, sql: &'c str) -> Result<Vec<String>>
where
    X: Executor<'c, Database = MySql>,
{
    let described = executor.describe(sql).await.map_err(Error::query)?;
    Ok(described
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect())
}

fn column_names(row: &MySqlRow) -> Vec<String> {
    row.columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

fn into_text_result(columns: Vec<String>, rows: Vec<MySqlRow>) -> Result<TextResult> {
    let width = columns.len();
    let rows = rows
        .iter()
        .map(|row| (0..width).map(|idx| text_at(row, idx)).collect())
        .collect::<Result<Vec<_>>>()?;
    Ok(TextResult { columns, rows })
}

/// Read column `idx` as nullable text. Non UTF-8 bytes are replaced.
fn text_at(row: &MySqlRow, idx: usize) -> Result<Option<String>> {
    let bytes: Option<Vec<u8>> = row.try_get_unchecked(idx).map_err(Error::query)?;
    Ok(bytes.map(|bytes| match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }))
}
