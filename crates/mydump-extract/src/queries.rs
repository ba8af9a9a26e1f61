//! Introspection and scan statements.

use mydump_core::quote_identifier;

pub const SERVER_VERSION: &str = "SELECT version()";

pub const SHOW_TABLES: &str = "SHOW TABLES";

pub fn show_create_database(name: &str) -> String {
    format!("SHOW CREATE DATABASE {}", quote_identifier(name))
}

pub fn show_create_table(name: &str) -> String {
    format!("SHOW CREATE TABLE {}", quote_identifier(name))
}

pub fn select_all(table: &str) -> String {
    format!("SELECT * FROM {}", quote_identifier(table))
}
