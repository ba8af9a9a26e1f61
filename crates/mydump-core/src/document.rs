use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything needed to render one database dump.
///
/// Built once per dump by the assembler and never mutated afterwards.
/// Identifiers are stored unquoted; quoting is applied by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpDocument {
    /// Version of the tool that produced the dump.
    pub tool_version: String,
    /// Server version string as reported by `SELECT version()`.
    pub server_version: String,
    /// Name of the dumped database.
    pub database: String,
    /// `CREATE DATABASE` statement, without a trailing semicolon.
    pub database_sql: String,
    /// Tables in the order the server enumerated them.
    pub tables: Vec<TableDump>,
    /// Set after the last table has been extracted.
    pub completed_at: DateTime<Utc>,
}

impl DumpDocument {
    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableDump> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Number of `INSERT` statements the document renders to.
    pub fn insert_count(&self) -> usize {
        self.tables
            .iter()
            .map(|table| table.insert_batches().count())
            .sum()
    }
}

/// One table's schema and data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDump {
    pub name: String,
    /// `CREATE TABLE` statement, without a trailing semicolon.
    pub create_sql: String,
    /// Comma-joined value tuples, one entry per `INSERT`. The trailing entry may
    /// be empty.
    pub batches: Vec<String>,
}

impl TableDump {
    /// Batches that produce an `INSERT` statement.
    pub fn insert_batches(&self) -> impl Iterator<Item = &str> {
        self.batches
            .iter()
            .map(String::as_str)
            .filter(|batch| !batch.is_empty())
    }
}
