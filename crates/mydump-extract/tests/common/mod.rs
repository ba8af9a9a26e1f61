#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mydump_core::{Clock, Error, Result};
use mydump_extract::{QueryExecutor, TextResult};

#[derive(Debug, Clone)]
pub struct FakeTable {
    pub name: String,
    pub reported_name: String,
    pub create_sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl FakeTable {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            reported_name: name.to_string(),
            create_sql: format!("CREATE TABLE `{name}` ({})", columns.join(", ")),
            columns: columns.iter().map(|col| col.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, values: &[Option<&str>]) -> Self {
        self.rows
            .push(values.iter().map(|value| value.map(str::to_string)).collect());
        self
    }

    pub fn with_rows(mut self, count: usize) -> Self {
        for idx in 0..count {
            self.rows.push(vec![Some(idx.to_string())]);
        }
        self
    }

    pub fn reporting_as(mut self, name: &str) -> Self {
        self.reported_name = name.to_string();
        self
    }
}

/// In-memory executor answering the statements the dump pipeline issues.
#[derive(Debug)]
pub struct FakeExecutor {
    pub server_version: Option<String>,
    pub database: String,
    pub reported_database: String,
    pub tables: Vec<FakeTable>,
    pub fail_on: Option<String>,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl FakeExecutor {
    pub fn new(database: &str) -> Self {
        Self {
            server_version: Some("8.0.36".to_string()),
            database: database.to_string(),
            reported_database: database.to_string(),
            tables: Vec::new(),
            fail_on: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn table(mut self, table: FakeTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn failing_on(mut self, sql: &str) -> Self {
        self.fail_on = Some(sql.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, sql: &str) -> Result<()> {
        self.log.lock().unwrap().push(sql.to_string());
        if self.fail_on.as_deref() == Some(sql) {
            return Err(Error::Query(format!("injected failure for `{sql}`")));
        }
        Ok(())
    }

    fn find(&self, quoted: &str) -> Result<&FakeTable> {
        let name = quoted.trim_matches('`');
        self.tables
            .iter()
            .find(|table| table.name == name)
            .ok_or_else(|| Error::Query(format!("Table '{name}' doesn't exist")))
    }
}

/// Clock that notes how many queries had been issued when it was read.
#[derive(Debug)]
pub struct QueryCountingClock {
    pub at: DateTime<Utc>,
    pub log: Arc<Mutex<Vec<String>>>,
    pub reads: Mutex<Vec<usize>>,
}

impl QueryCountingClock {
    pub fn new(at: DateTime<Utc>, executor: &FakeExecutor) -> Self {
        Self {
            at,
            log: Arc::clone(&executor.log),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn reads(&self) -> Vec<usize> {
        self.reads.lock().unwrap().clone()
    }
}

impl Clock for QueryCountingClock {
    fn now(&self) -> DateTime<Utc> {
        let issued = self.log.lock().unwrap().len();
        self.reads.lock().unwrap().push(issued);
        self.at
    }
}

#[async_trait]
impl QueryExecutor for FakeExecutor {
    async fn fetch_scalar(&self, sql: &str) -> Result<Option<String>> {
        self.record(sql)?;
        match sql {
            "SELECT version()" => Ok(self.server_version.clone()),
            other => Err(Error::Query(format!("unexpected scalar query `{other}`"))),
        }
    }

    async fn fetch_pair(&self, sql: &str) -> Result<(Option<String>, Option<String>)> {
        self.record(sql)?;
        if let Some(name) = sql.strip_prefix("SHOW CREATE DATABASE ") {
            if name.trim_matches('`') != self.database {
                return Err(Error::Query(format!("Unknown database '{name}'")));
            }
            return Ok((
                Some(self.reported_database.clone()),
                Some(format!("CREATE DATABASE {name}")),
            ));
        }
        if let Some(name) = sql.strip_prefix("SHOW CREATE TABLE ") {
            let table = self.find(name)?;
            return Ok((
                Some(table.reported_name.clone()),
                Some(table.create_sql.clone()),
            ));
        }
        Err(Error::Query(format!("unexpected pair query `{sql}`")))
    }

    async fn fetch_column(&self, sql: &str) -> Result<Vec<Option<String>>> {
        self.record(sql)?;
        match sql {
            "SHOW TABLES" => Ok(self
                .tables
                .iter()
                .map(|table| Some(table.name.clone()))
                .collect()),
            other => Err(Error::Query(format!("unexpected column query `{other}`"))),
        }
    }

    async fn fetch_rows(&self, sql: &str) -> Result<TextResult> {
        self.record(sql)?;
        let Some(name) = sql.strip_prefix("SELECT * FROM ") else {
            return Err(Error::Query(format!("unexpected scan `{sql}`")));
        };
        let table = self.find(name)?;
        Ok(TextResult {
            columns: table.columns.clone(),
            rows: table.rows.clone(),
        })
    }
}
