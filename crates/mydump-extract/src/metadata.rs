//! Server, database and table introspection.

use tracing::debug;

use mydump_core::{Error, ObjectKind, Result};

use crate::executor::QueryExecutor;
use crate::queries;

/// Server version as reported by the server.
pub async fn server_version<E>(executor: &E) -> Result<String>
where
    E: QueryExecutor + ?Sized,
{
    let version = executor.fetch_scalar(queries::SERVER_VERSION).await?;
    Ok(version.unwrap_or_default())
}

/// `CREATE DATABASE` statement for `name`.
pub async fn database_definition<E>(executor: &E, name: &str) -> Result<String>
where
    E: QueryExecutor + ?Sized,
{
    let sql = queries::show_create_database(name);
    definition(executor, &sql, ObjectKind::Database, name).await
}

/// Tables of the current database, in the order the server lists them.
pub async fn table_names<E>(executor: &E) -> Result<Vec<String>>
where
    E: QueryExecutor + ?Sized,
{
    let names = executor.fetch_column(queries::SHOW_TABLES).await?;
    debug!(count = names.len(), "listed tables");
    Ok(names.into_iter().map(Option::unwrap_or_default).collect())
}

/// `CREATE TABLE` statement for `name`.
pub async fn table_definition<E>(executor: &E, name: &str) -> Result<String>
where
    E: QueryExecutor + ?Sized,
{
    let sql = queries::show_create_table(name);
    definition(executor, &sql, ObjectKind::Table, name).await
}

async fn definition<E>(executor: &E, sql: &str, kind: ObjectKind, name: &str) -> Result<String>
where
    E: QueryExecutor + ?Sized,
{
    let (returned, statement) = executor.fetch_pair(sql).await?;
    let returned = returned.unwrap_or_default();
    if returned != name {
        return Err(Error::NotFound {
            kind,
            requested: name.to_string(),
            returned,
        });
    }
    Ok(statement.unwrap_or_default())
}
