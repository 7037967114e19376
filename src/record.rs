//! Records and the JSON value rules the rest of the crate leans on.

use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;
use std::cmp::Ordering;

/// One entry in a table: an insertion-ordered JSON object.
pub type Record = serde_json::Map<String, Value>;

/// Checks that `value` is a list of JSON objects and hands back the records.
pub fn validate(value: Value) -> Result<Vec<Record>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Error::Validation(format!(
                "expected a list of objects, found {}",
                kind(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (pos, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(record) => records.push(record),
            other => {
                return Err(Error::Validation(format!(
                    "element {pos} is {}, not an object",
                    kind(&other)
                )))
            }
        }
    }
    Ok(records)
}

/// Short name of a value's JSON type, for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Orders two JSON values when the pair is comparable.
///
/// Numbers compare numerically regardless of integer/float representation,
/// strings lexicographically, booleans with `false < true`, arrays element by
/// element. Null and objects only compare equal to an equal value. Mixed
/// types are incomparable.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Array(xs), Value::Array(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                match compare(x, y)? {
                    Ordering::Equal => continue,
                    ord => return Some(ord),
                }
            }
            Some(xs.len().cmp(&ys.len()))
        }
        (Value::Object(_), Value::Object(_)) => values_equal(a, b).then_some(Ordering::Equal),
        _ => None,
    }
}

/// Equality with exact numeric promotion, so `1 == 1.0` but
/// `9007199254740993 != 9007199254740992.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => compare(a, b) == Some(Ordering::Equal),
    }
}

/// 2^127, the first magnitude an `i128` cannot hold.
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Exact view of a JSON number. Integers keep full precision and integral
/// floats that fit become integers, so `1`, `1.0` and `1e0` are one value.
/// Both numeric ordering and index keys go through this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Num {
    Int(i128),
    Float(f64),
}

impl Num {
    pub(crate) fn of(n: &serde_json::Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            return Some(Num::Int(i.into()));
        }
        if let Some(u) = n.as_u64() {
            return Some(Num::Int(u.into()));
        }
        let f = n.as_f64()?;
        if f.fract() == 0.0 && f.abs() < I128_LIMIT {
            Some(Num::Int(f as i128))
        } else {
            Some(Num::Float(f))
        }
    }
}

fn compare_numbers(x: &serde_json::Number, y: &serde_json::Number) -> Option<Ordering> {
    match (Num::of(x)?, Num::of(y)?) {
        (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
        (Num::Float(a), Num::Float(b)) => a.partial_cmp(&b),
        (Num::Int(a), Num::Float(b)) => compare_int_float(a, b),
        (Num::Float(a), Num::Int(b)) => compare_int_float(b, a).map(Ordering::reverse),
    }
}

// `f` is never integral inside the i128 range here, so it never equals `i`
fn compare_int_float(i: i128, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f.abs() >= I128_LIMIT {
        return Some(if f > 0.0 { Ordering::Less } else { Ordering::Greater });
    }
    Some(if i <= f.floor() as i128 {
        Ordering::Less
    } else {
        Ordering::Greater
    })
}

/// Serializes a value with every object's keys in sorted order.
pub(crate) struct Sorted<'a>(pub &'a Value);

/// Sorted-key view of a whole record list.
pub(crate) struct SortedRecords<'a>(pub &'a [Record]);

struct SortedObject<'a>(&'a Record);

impl Serialize for Sorted<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => SortedObject(map).serialize(serializer),
            Value::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(&Sorted(item))?;
                }
                out.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

impl Serialize for SortedObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut out = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
            out.serialize_entry(k, &Sorted(v))?;
        }
        out.end()
    }
}

impl Serialize for SortedRecords<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_seq(Some(self.0.len()))?;
        for record in self.0 {
            out.serialize_element(&SortedObject(record))?;
        }
        out.end()
    }
}
