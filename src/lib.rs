//! Flat-file JSON document table.
//!
//! A table is a list of JSON objects kept in memory and backed by one file
//! holding a JSON array. Query with predicates or unique indexes, mutate in
//! memory, then [`sync`](JsonTable::sync) to overwrite the file.
//!
//! ```rust,no_run
//! use json_table::{Condition, JsonTable, Predicate};
//! use serde_json::json;
//!
//! let mut users = JsonTable::open_with_indexes("users.json", ["id"]).unwrap();
//! users.add(json!({"id": 1, "name": "Hana", "age": 31})).unwrap();
//! users.update(json!({"age": 32}), Condition::indexed("id", 1)).unwrap();
//!
//! let adults = Predicate::compare("age", ">=", json!(18)).unwrap();
//! assert_eq!(users.get(adults).unwrap().len(), 1);
//! users.sync().unwrap();
//! ```
//!
//! **Single-process only.** Two tables over the same file clobber each
//! other; the last sync wins.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod condition;
pub mod error;
pub mod index;
pub mod persist;
pub mod predicate;
pub mod record;
pub mod serializer;
pub mod table;

pub use condition::Condition;
pub use error::{Error, Result};
pub use index::IndexMode;
pub use predicate::{Comparator, IntoPredicates, Predicate};
pub use record::Record;
pub use table::{JsonTable, JsonTableBuilder, UpdateOutcome};
