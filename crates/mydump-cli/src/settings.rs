use std::path::Path;

use serde::Deserialize;

use mydump_core::{DEFAULT_BATCH_SIZE, LiteralMode};
use mydump_extract::DumpOptions;

use crate::CliError;

/// Settings loaded from an optional TOML file. Command-line flags win.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DumpSettings {
    pub batch_size: usize,
    pub escape_literals: bool,
    pub tables: Vec<String>,
    pub single_transaction: bool,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DumpSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            escape_literals: false,
            tables: Vec::new(),
            single_transaction: false,
            max_connections: 2,
            acquire_timeout_secs: 10,
        }
    }
}

impl DumpSettings {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            batch_size: self.batch_size,
            literal_mode: if self.escape_literals {
                LiteralMode::Escaped
            } else {
                LiteralMode::Raw
            },
            tables: if self.tables.is_empty() {
                None
            } else {
                Some(self.tables.clone())
            },
        }
    }
}
