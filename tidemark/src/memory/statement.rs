use serde::{Deserialize, Serialize};

use crate::common::Value;
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::schema::SchemaCommand;

/// Statement understood by a [`MemoryConnection`](super::MemoryConnection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemoryStatement {
    Schema(SchemaCommand),
    TableExists {
        table: String,
    },
    Select {
        table: String,
        column: String,
    },
    Insert {
        table: String,
        column: String,
        value: Value,
    },
    Delete {
        table: String,
        column: String,
        value: Value,
    },
}

impl MemoryStatement {
    pub fn encode(&self) -> TidemarkResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(statement: &str) -> TidemarkResult<Self> {
        serde_json::from_str(statement).map_err(|err| {
            TidemarkError::new(
                &format!("Unrecognized memory statement {}: {}", statement, err),
                ErrorKind::ProviderError,
            )
        })
    }
}
