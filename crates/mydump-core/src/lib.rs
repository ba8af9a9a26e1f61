//! Core contracts for mydump.
//!
//! This crate defines the dump document model, the error type shared by the
//! extraction pipeline, and the renderer that turns a document into SQL text.

pub mod clock;
pub mod document;
pub mod error;
pub mod render;
pub mod sql;

pub use clock::{Clock, FixedClock, SystemClock};
pub use document::{DumpDocument, TableDump};
pub use error::{Error, ObjectKind, Result};
pub use render::{COMPLETED_AT_FORMAT, render, render_to};
pub use sql::{LiteralMode, NULL_LITERAL, quote_identifier, value_literal, value_tuple};

/// Version string written into dump headers.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of value tuples per `INSERT` unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;
