//! Dump extraction: metadata reads, table scans and document assembly.

pub mod assemble;
pub mod executor;
pub mod metadata;
pub mod mysql;
pub mod options;
pub mod queries;
pub mod rows;

pub use assemble::{Dumper, build_dump, build_dump_with_clock};
pub use executor::{QueryExecutor, TextResult};
pub use mysql::{MySqlConnExecutor, MySqlExecutor};
pub use options::{DumpOptions, checked_batch_size};
pub use rows::{batch_tuples, extract_batches};

pub use mydump_core::DumpDocument;
