//! Unified error type for all table operations.

use thiserror::Error;

/// Things that can go wrong when using a table.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// File system problem (read, write, rename, fsync).
    #[error("i/o error: {0}")]
    Io(String),
    /// Failed to serialize the records to bytes.
    #[error("serialization error: {0}")]
    Serialize(String),
    /// Failed to parse the backing file as JSON.
    #[error("deserialization error: {0}")]
    Deserialize(String),
    /// Parsed content is not a list of JSON objects.
    #[error("table validation failed: {0}")]
    Validation(String),
    /// Something other than a JSON object was handed to `add`.
    #[error("only JSON objects can be added to a table, got {0}")]
    InvalidRecord(String),
    /// Two records would share a value for a unique index.
    #[error("duplicate value {value} for indexed field `{field}`")]
    DuplicateKey {
        /// Indexed field.
        field: String,
        /// Offending value, rendered as JSON.
        value: String,
    },
    /// An indexed lookup named a field that has no index.
    #[error("index not found on `{field}`")]
    IndexNotFound {
        /// Field that was looked up.
        field: String,
    },
    /// A record lacks a field that a strict index requires.
    #[error("record is missing indexed field `{field}`")]
    MissingField {
        /// Indexed field.
        field: String,
    },
    /// Arrays and objects cannot be index keys.
    #[error("value of indexed field `{field}` must be a scalar")]
    UnindexableValue {
        /// Indexed field.
        field: String,
    },
    /// Pattern operand is not a string or does not compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    /// Comparator name is not one of `>`, `<`, `>=`, `<=`, `==`.
    #[error("unknown comparator `{0}`")]
    UnknownComparator(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else if err.is_syntax() || err.is_eof() {
            Error::Deserialize(err.to_string())
        } else {
            Error::Serialize(err.to_string())
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidPattern(err.to_string())
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
