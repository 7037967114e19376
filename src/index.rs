//! Unique in-memory indexes.
//!
//! An index maps a field's value to the position of the single record that
//! holds it. Indexes are a cache over the record list: they are rebuilt by a
//! full scan on open and after any removal, and kept current on append and
//! update.

use crate::error::{Error, Result};
use crate::record::{Num, Record};
use serde_json::Value;
use std::collections::HashMap;

/// What an index does with records that lack its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// Every record must carry the field; a missing one is an error.
    #[default]
    Strict,
    /// Records without the field are left out of the index.
    Sparse,
}

/// Hashable form of a scalar JSON value.
///
/// Numbers use the same normalization as `==`, so two values share a key
/// exactly when they compare equal: `1` and `1.0` collide, while
/// `9007199254740993` and `9007199254740992.0` do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer, or integral float that fits an `i128`.
    Int(i128),
    /// Any other number, by bit pattern.
    Float(u64),
    /// String value.
    Str(String),
}

impl IndexKey {
    /// Key for `value`, or `None` for arrays and objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => IndexKey::Null,
            Value::Bool(b) => IndexKey::Bool(*b),
            Value::String(s) => IndexKey::Str(s.clone()),
            Value::Number(n) => match Num::of(n)? {
                Num::Int(i) => IndexKey::Int(i),
                Num::Float(f) => IndexKey::Float(f.to_bits()),
            },
            Value::Array(_) | Value::Object(_) => return None,
        })
    }
}

/// Unique index over one field.
#[derive(Debug, Clone)]
pub struct Index {
    field: String,
    mode: IndexMode,
    positions: HashMap<IndexKey, usize>,
}

impl Index {
    /// Empty index.
    pub fn new(field: impl Into<String>, mode: IndexMode) -> Self {
        Self {
            field: field.into(),
            mode,
            positions: HashMap::new(),
        }
    }

    /// Full scan over `records`. Fails on the first duplicate value or, for a
    /// strict index, the first record lacking the field.
    pub fn build(field: impl Into<String>, mode: IndexMode, records: &[Record]) -> Result<Self> {
        let mut index = Self::new(field, mode);
        index.rebuild(records)?;
        Ok(index)
    }

    /// Drop every entry and rescan `records`.
    pub fn rebuild(&mut self, records: &[Record]) -> Result<()> {
        self.positions.clear();
        for (pos, record) in records.iter().enumerate() {
            if let Some(key) = self.key_for(record)? {
                if self.positions.insert(key, pos).is_some() {
                    return Err(self.duplicate(record));
                }
            }
        }
        Ok(())
    }

    /// Indexed field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Strict or sparse.
    #[must_use]
    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `true` when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of the record whose field equals `value`.
    #[must_use]
    pub fn lookup(&self, value: &Value) -> Option<usize> {
        IndexKey::from_value(value).and_then(|k| self.positions.get(&k).copied())
    }

    /// Key `record` would be stored under. `None` means a sparse index skips
    /// the record.
    pub fn key_for(&self, record: &Record) -> Result<Option<IndexKey>> {
        match record.get(&self.field) {
            Some(value) => IndexKey::from_value(value)
                .map(Some)
                .ok_or_else(|| Error::UnindexableValue {
                    field: self.field.clone(),
                }),
            None => match self.mode {
                IndexMode::Strict => Err(Error::MissingField {
                    field: self.field.clone(),
                }),
                IndexMode::Sparse => Ok(None),
            },
        }
    }

    /// Check that `record` could be placed at `pos` without breaking
    /// uniqueness. A record may keep the key it already owns.
    pub fn check(&self, record: &Record, pos: usize) -> Result<Option<IndexKey>> {
        match record.get(&self.field) {
            Some(value) => self.check_value(value, pos).map(Some),
            None => self.key_for(record),
        }
    }

    /// Same as [`check`](Self::check) for a bare field value.
    pub fn check_value(&self, value: &Value, pos: usize) -> Result<IndexKey> {
        let key = IndexKey::from_value(value).ok_or_else(|| Error::UnindexableValue {
            field: self.field.clone(),
        })?;
        match self.positions.get(&key) {
            Some(&owner) if owner != pos => Err(Error::DuplicateKey {
                field: self.field.clone(),
                value: value.to_string(),
            }),
            _ => Ok(key),
        }
    }

    /// Point `key` at `pos`, dropping whatever key `pos` held before.
    pub fn set(&mut self, previous: Option<&IndexKey>, key: Option<IndexKey>, pos: usize) {
        if let Some(old) = previous {
            if self.positions.get(old) == Some(&pos) {
                self.positions.remove(old);
            }
        }
        if let Some(k) = key {
            self.positions.insert(k, pos);
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    fn duplicate(&self, record: &Record) -> Error {
        Error::DuplicateKey {
            field: self.field.clone(),
            value: record
                .get(&self.field)
                .map(Value::to_string)
                .unwrap_or_default(),
        }
    }
}
