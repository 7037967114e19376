//! Record predicates.
//!
//! A [`Predicate`] is a reusable `&Record -> bool` test. Build one from a
//! field, a [`Comparator`] and an operand, or wrap any closure with
//! [`Predicate::from_fn`], then combine with [`and`](Predicate::and),
//! [`or`](Predicate::or) and [`not`](Predicate::not).
//!
//! A record that lacks the tested field never matches a field predicate.

use crate::error::{Error, Result};
use crate::record::{compare, values_equal, Record};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Two-argument test used by custom comparators.
pub type CompareFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// How a field value is tested against the operand.
#[derive(Clone)]
pub enum Comparator {
    /// `field > operand`
    Gt,
    /// `field < operand`
    Lt,
    /// `field >= operand`
    Ge,
    /// `field <= operand`
    Le,
    /// `field == operand`
    Eq,
    /// Operand is a regex that must match at the start of the field.
    Match,
    /// Operand is a regex that may match anywhere in the field.
    Search,
    /// Plain two-argument test, called as `(field, operand)`.
    Custom(CompareFn),
    /// Pattern-style test, always called as `(operand, field)`.
    Pattern(CompareFn),
}

impl Comparator {
    /// Wrap a plain comparison function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        Comparator::Custom(Arc::new(f))
    }

    /// Wrap a pattern-style function. It receives the pattern first and the
    /// field value second.
    pub fn pattern<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        Comparator::Pattern(Arc::new(f))
    }

    fn is_pattern(&self) -> bool {
        matches!(
            self,
            Comparator::Match | Comparator::Search | Comparator::Pattern(_)
        )
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            ">" => Ok(Comparator::Gt),
            "<" => Ok(Comparator::Lt),
            ">=" => Ok(Comparator::Ge),
            "<=" => Ok(Comparator::Le),
            "==" => Ok(Comparator::Eq),
            other => Err(Error::UnknownComparator(other.to_string())),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Eq => "==",
            Comparator::Match => "match",
            Comparator::Search => "search",
            Comparator::Custom(_) => "custom",
            Comparator::Pattern(_) => "pattern",
        };
        f.write_str(name)
    }
}

/// Comparator with everything resolved up front: regexes compiled,
/// argument order fixed.
enum Test {
    Ordering(fn(Ordering) -> bool),
    Equal,
    Regex(Regex),
    Fn(CompareFn),
}

impl Test {
    fn eval(&self, left: &Value, right: &Value) -> bool {
        match self {
            Test::Ordering(accept) => compare(left, right).is_some_and(*accept),
            Test::Equal => values_equal(left, right),
            // the regex stands in for the pattern side, `right` is the subject
            Test::Regex(re) => right.as_str().is_some_and(|s| re.is_match(s)),
            Test::Fn(f) => f(left, right),
        }
    }
}

/// A reusable test over a single record.
#[derive(Clone)]
pub struct Predicate {
    test: Arc<dyn Fn(&Record) -> bool + Send + Sync>,
}

impl Predicate {
    /// Build a field predicate.
    ///
    /// The comparator is called as `(record[key], value)`. Pattern-style
    /// comparators ([`Comparator::Match`], [`Comparator::Search`],
    /// [`Comparator::Pattern`]) and `reversed = true` flip that to
    /// `(value, record[key])`.
    ///
    /// Fails with [`Error::InvalidPattern`] when a regex comparator gets a
    /// non-string or uncompilable operand.
    pub fn build(
        key: impl Into<String>,
        comparator: Comparator,
        value: Value,
        reversed: bool,
    ) -> Result<Self> {
        let flip = comparator.is_pattern() || reversed;
        let test = match comparator {
            Comparator::Gt => Test::Ordering(Ordering::is_gt),
            Comparator::Lt => Test::Ordering(Ordering::is_lt),
            Comparator::Ge => Test::Ordering(Ordering::is_ge),
            Comparator::Le => Test::Ordering(Ordering::is_le),
            Comparator::Eq => Test::Equal,
            Comparator::Match => Test::Regex(Regex::new(&format!("^(?:{})", pattern_of(&value)?))?),
            Comparator::Search => Test::Regex(Regex::new(pattern_of(&value)?)?),
            Comparator::Custom(f) | Comparator::Pattern(f) => Test::Fn(f),
        };

        let key = key.into();
        Ok(Self::from_fn(move |record| match record.get(&key) {
            None => false,
            Some(field) if flip => test.eval(&value, field),
            Some(field) => test.eval(field, &value),
        }))
    }

    /// Shorthand for [`build`](Self::build) with an operator name such as
    /// `">="`, never reversed.
    pub fn compare(key: impl Into<String>, op: &str, value: Value) -> Result<Self> {
        Self::build(key, op.parse()?, value, false)
    }

    /// Wrap an arbitrary closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        Self { test: Arc::new(f) }
    }

    /// Run the test.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        (self.test)(record)
    }

    /// Both predicates must hold.
    pub fn and(self, other: Predicate) -> Self {
        Self::from_fn(move |r| self.matches(r) && other.matches(r))
    }

    /// Either predicate may hold.
    pub fn or(self, other: Predicate) -> Self {
        Self::from_fn(move |r| self.matches(r) || other.matches(r))
    }

    /// Negate.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::from_fn(move |r| !self.matches(r))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

fn pattern_of(value: &Value) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| Error::InvalidPattern(format!("expected a string pattern, got {value}")))
}

/// One predicate or several. Lets multi-predicate APIs take either.
pub trait IntoPredicates {
    /// Normalize into a list.
    fn into_predicates(self) -> Vec<Predicate>;
}

impl IntoPredicates for Predicate {
    fn into_predicates(self) -> Vec<Predicate> {
        vec![self]
    }
}

impl IntoPredicates for Vec<Predicate> {
    fn into_predicates(self) -> Vec<Predicate> {
        self
    }
}

impl<const N: usize> IntoPredicates for [Predicate; N] {
    fn into_predicates(self) -> Vec<Predicate> {
        self.into()
    }
}

impl IntoPredicates for &[Predicate] {
    fn into_predicates(self) -> Vec<Predicate> {
        self.to_vec()
    }
}
