//! Dump assembly across all tables of a database.

use std::time::Instant;

use tracing::{info, warn};

use mydump_core::{Clock, DumpDocument, Result, SystemClock, TOOL_VERSION, TableDump};

use crate::executor::QueryExecutor;
use crate::metadata;
use crate::options::DumpOptions;
use crate::rows;

/// Build a dump document for `database` using wall-clock time.
pub async fn build_dump<E>(executor: &E, database: &str, opts: &DumpOptions) -> Result<DumpDocument>
where
    E: QueryExecutor + ?Sized,
{
    build_dump_with_clock(executor, database, opts, &SystemClock).await
}

/// Build a dump document for `database`, stamping completion time from `clock`.
///
/// The first failing query aborts the dump and its error is returned as is.
pub async fn build_dump_with_clock<E, C>(
    executor: &E,
    database: &str,
    opts: &DumpOptions,
    clock: &C,
) -> Result<DumpDocument>
where
    E: QueryExecutor + ?Sized,
    C: Clock + ?Sized,
{
    opts.validate()?;
    let timer = Instant::now();

    let server_version = metadata::server_version(executor).await?;
    let database_sql = metadata::database_definition(executor, database).await?;
    let names = metadata::table_names(executor).await?;

    if let Some(wanted) = &opts.tables {
        for name in wanted.iter().filter(|name| !names.contains(*name)) {
            warn!(table = %name, "requested table not found, skipping");
        }
    }

    let mut tables = Vec::new();
    for name in names.into_iter().filter(|name| opts.includes(name)) {
        let table = dump_table(executor, name, opts).await?;
        tables.push(table);
    }

    let completed_at = clock.now();
    info!(
        database = %database,
        tables = tables.len(),
        duration_ms = timer.elapsed().as_millis() as u64,
        "dump assembled"
    );

    Ok(DumpDocument {
        tool_version: TOOL_VERSION.to_string(),
        server_version,
        database: database.to_string(),
        database_sql,
        tables,
        completed_at,
    })
}

async fn dump_table<E>(executor: &E, name: String, opts: &DumpOptions) -> Result<TableDump>
where
    E: QueryExecutor + ?Sized,
{
    let create_sql = metadata::table_definition(executor, &name).await?;
    let batches =
        rows::extract_batches(executor, &name, opts.batch_size, opts.literal_mode).await?;
    info!(table = %name, batches = batches.len(), "table extracted");

    Ok(TableDump {
        name,
        create_sql,
        batches,
    })
}

/// Produces dumps through a borrowed executor.
pub struct Dumper<'a, E: ?Sized, C = SystemClock> {
    executor: &'a E,
    options: DumpOptions,
    clock: C,
}

impl<'a, E> Dumper<'a, E, SystemClock>
where
    E: QueryExecutor + ?Sized,
{
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            options: DumpOptions::default(),
            clock: SystemClock,
        }
    }
}

impl<'a, E, C> Dumper<'a, E, C>
where
    E: QueryExecutor + ?Sized,
    C: Clock,
{
    pub fn with_options(mut self, options: DumpOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> Dumper<'a, E, C2> {
        Dumper {
            executor: self.executor,
            options: self.options,
            clock,
        }
    }

    /// Assemble the dump document for `database`.
    pub async fn dump(&self, database: &str) -> Result<DumpDocument> {
        build_dump_with_clock(self.executor, database, &self.options, &self.clock).await
    }

    /// Assemble and render the dump for `database`.
    pub async fn dump_sql(&self, database: &str) -> Result<String> {
        let doc = self.dump(database).await?;
        Ok(mydump_core::render(&doc))
    }
}
