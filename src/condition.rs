//! Query conditions accepted by `get`, `update` and `delete`.

use crate::predicate::{IntoPredicates, Predicate};
use crate::record::Record;
use serde_json::Value;

/// Which records an operation targets.
#[derive(Debug, Clone, Default)]
pub enum Condition {
    /// Every record.
    #[default]
    All,
    /// O(1) lookup through the index on `field`. The field must be indexed.
    IndexedEquals {
        /// Indexed field name.
        field: String,
        /// Value to look up.
        value: Value,
    },
    /// Records the predicate accepts.
    Predicate(Predicate),
    /// Records accepted by at least one of the predicates.
    AnyOf(Vec<Predicate>),
}

impl Condition {
    /// Indexed equality lookup.
    pub fn indexed(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::IndexedEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Scan condition from one predicate or several.
    pub fn any_of(predicates: impl IntoPredicates) -> Self {
        Condition::AnyOf(predicates.into_predicates())
    }

    /// Evaluate a scan condition against one record. Indexed conditions are
    /// resolved by the table, never here.
    pub(crate) fn accepts(&self, record: &Record) -> bool {
        match self {
            Condition::All => true,
            Condition::IndexedEquals { .. } => false,
            Condition::Predicate(p) => p.matches(record),
            Condition::AnyOf(ps) => ps.iter().any(|p| p.matches(record)),
        }
    }
}

impl From<Predicate> for Condition {
    fn from(p: Predicate) -> Self {
        Condition::Predicate(p)
    }
}

impl From<Vec<Predicate>> for Condition {
    fn from(ps: Vec<Predicate>) -> Self {
        Condition::AnyOf(ps)
    }
}

impl<const N: usize> From<[Predicate; N]> for Condition {
    fn from(ps: [Predicate; N]) -> Self {
        Condition::any_of(ps)
    }
}

impl<F: Into<String>> From<(F, Value)> for Condition {
    fn from((field, value): (F, Value)) -> Self {
        Condition::indexed(field, value)
    }
}

impl From<Option<Condition>> for Condition {
    fn from(c: Option<Condition>) -> Self {
        c.unwrap_or_default()
    }
}
