//! Serialization layer. JSON via serde_json.
//!
//! Implement [`Serializer`] to swap the codec; the table only ever hands it a
//! record slice and gets back a parsed value to validate.

use crate::error::{Error, Result};
use crate::record::Record;
use serde_json::Value;

/// Converts record lists to/from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode the records to bytes.
    fn serialize(&self, records: &[Record]) -> Result<Vec<u8>>;

    /// Parse bytes into an unvalidated value.
    fn deserialize(&self, bytes: &[u8]) -> Result<Value>;
}

/// JSON serializer with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with indentation, easier to read by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Whether output is indented.
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, records: &[Record]) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        };
        bytes.map_err(Error::from)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}
