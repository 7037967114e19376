//! Core table type and builder.

use crate::condition::Condition;
use crate::error::{Error, Result};
use crate::index::{Index, IndexKey, IndexMode};
use crate::persist::{atomic_write, load};
use crate::record::{kind, Record, SortedRecords};
use crate::serializer::{JsonSerializer, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// What an update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Fields were merged into this many existing records.
    Updated(usize),
    /// Nothing matched, so the fields were appended as a new record at this
    /// position.
    Inserted(usize),
}

/// Flat-file JSON table.
///
/// The table is an insertion-ordered list of JSON objects plus optional
/// unique indexes, backed by one file holding a JSON array. Every operation
/// works on memory only; nothing reaches disk until [`sync`](Self::sync).
///
/// One owner per file. Two tables over the same path, or an outside writer,
/// race and the last sync wins.
pub struct JsonTable {
    records: Vec<Record>,
    path: PathBuf,
    indexes: Vec<Index>,
    serializer: JsonSerializer,
}

impl JsonTable {
    /// Open (or start) a table at `path` with no indexes and compact JSON.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Open with strict indexes on `fields`. Shorthand for
    /// `builder(path).index(f1).index(f2)...build()`.
    pub fn open_with_indexes<I, S>(path: impl AsRef<Path>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        fields
            .into_iter()
            .fold(Self::builder(path), |b, f| b.index(f))
            .build()
    }

    /// Start configuring a table. Call [`.build()`](JsonTableBuilder::build)
    /// when ready.
    pub fn builder(path: impl AsRef<Path>) -> JsonTableBuilder {
        JsonTableBuilder::new(path)
    }

    /// Open the table at `path`, run `f`, and sync if `f` succeeds. See
    /// [`JsonTableBuilder::session`].
    pub fn session<T, E, F>(path: impl AsRef<Path>, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut JsonTable) -> std::result::Result<T, E>,
        E: From<Error> + fmt::Display,
    {
        Self::builder(path).session(f)
    }

    // ---- reads ----

    /// All records, in stored order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records selected by `condition`.
    ///
    /// [`Condition::IndexedEquals`] is an index lookup returning zero or one
    /// record; it fails with [`Error::IndexNotFound`] if the field has no
    /// index, never for an absent value. Every other condition is a scan in
    /// stored order.
    pub fn get(&self, condition: impl Into<Condition>) -> Result<Vec<&Record>> {
        match condition.into() {
            Condition::IndexedEquals { field, value } => Ok(self
                .index_for(&field)?
                .lookup(&value)
                .map(|pos| &self.records[pos])
                .into_iter()
                .collect()),
            scan => Ok(self.records.iter().filter(|r| scan.accepts(r)).collect()),
        }
    }

    /// First record selected by `condition`, if any.
    pub fn get_one(&self, condition: impl Into<Condition>) -> Result<Option<&Record>> {
        Ok(self.get(condition)?.into_iter().next())
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the indexed fields, in declaration order.
    pub fn indexed_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.indexes.iter().map(Index::field)
    }

    /// The index on `field`, if one is maintained.
    #[must_use]
    pub fn index(&self, field: &str) -> Option<&Index> {
        self.indexes.iter().find(|ix| ix.field() == field)
    }

    /// Single-line JSON rendering of the records.
    pub fn to_compact_string(&self) -> Result<String> {
        serde_json::to_string(&self.records).map_err(Error::from)
    }

    // ---- writes ----

    /// Append a record and return its position.
    ///
    /// Fails with [`Error::InvalidRecord`] unless `record` is a JSON object.
    /// Index rules apply as on open: a strict index needs the field, and an
    /// indexed value already present fails with [`Error::DuplicateKey`]. The
    /// table is untouched on failure.
    pub fn add(&mut self, record: Value) -> Result<usize> {
        self.add_record(into_record(record)?)
    }

    /// Same as [`add`](Self::add).
    pub fn append(&mut self, record: Value) -> Result<usize> {
        self.add(record)
    }

    /// [`add`](Self::add) for a value that is already a [`Record`].
    pub fn add_record(&mut self, record: Record) -> Result<usize> {
        let pos = self.records.len();
        let keys = self
            .indexes
            .iter()
            .map(|ix| ix.check(&record, pos))
            .collect::<Result<Vec<_>>>()?;
        self.records.push(record);
        for (index, key) in self.indexes.iter_mut().zip(keys) {
            index.set(None, key, pos);
        }
        Ok(pos)
    }

    /// Bulk append. Either every record goes in or none does.
    pub fn extend<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Value>,
    {
        let batch = records
            .into_iter()
            .map(into_record)
            .collect::<Result<Vec<_>>>()?;
        let before = self.records.len();
        for record in batch {
            if let Err(err) = self.add_record(record) {
                self.records.truncate(before);
                self.rebuild_indexes()?;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Merge `fields` into the first record matching `condition`, or append
    /// `fields` as a new record when nothing matches.
    pub fn update(
        &mut self,
        fields: Value,
        condition: impl Into<Condition>,
    ) -> Result<UpdateOutcome> {
        self.update_with(fields, condition, true)
    }

    /// Like [`update`](Self::update) but merges into every match.
    pub fn update_many(
        &mut self,
        fields: Value,
        condition: impl Into<Condition>,
    ) -> Result<UpdateOutcome> {
        self.update_with(fields, condition, false)
    }

    /// Merge `fields` (existing keys overwritten, new keys added) into the
    /// records `condition` selects.
    ///
    /// - [`Condition::IndexedEquals`]: the indexed record, if the value is
    ///   indexed. Fails with [`Error::IndexNotFound`] without an index.
    /// - [`Condition::All`]: every record. Never inserts.
    /// - scans: matching records in order, stopping after the first when
    ///   `first_only` is set.
    ///
    /// When an indexed or scan condition selects nothing, `fields` is added
    /// as a new record (upsert). The condition's own key is not copied in.
    ///
    /// A merge that would give two records the same indexed value fails with
    /// [`Error::DuplicateKey`] before anything changes.
    pub fn update_with(
        &mut self,
        fields: Value,
        condition: impl Into<Condition>,
        first_only: bool,
    ) -> Result<UpdateOutcome> {
        let fields = into_record(fields)?;
        let condition = condition.into();

        let targets: Vec<usize> = match &condition {
            Condition::IndexedEquals { field, value } => {
                self.index_for(field)?.lookup(value).into_iter().collect()
            }
            Condition::All => (0..self.records.len()).collect(),
            scan => {
                let hits = self
                    .records
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| scan.accepts(r))
                    .map(|(pos, _)| pos);
                if first_only {
                    hits.take(1).collect()
                } else {
                    hits.collect()
                }
            }
        };

        if targets.is_empty() && !matches!(condition, Condition::All) {
            return self.add_record(fields).map(UpdateOutcome::Inserted);
        }
        self.merge(&targets, &fields)?;
        Ok(UpdateOutcome::Updated(targets.len()))
    }

    /// Remove the records `condition` selects and return how many went.
    /// Indexes are rebuilt afterwards since positions shift.
    pub fn delete(&mut self, condition: impl Into<Condition>) -> Result<usize> {
        let before = self.records.len();
        match condition.into() {
            Condition::IndexedEquals { field, value } => {
                let hit = self.index_for(&field)?.lookup(&value);
                if let Some(pos) = hit {
                    self.records.remove(pos);
                }
            }
            Condition::All => self.records.clear(),
            scan => self.records.retain(|r| !scan.accepts(r)),
        }
        let removed = before - self.records.len();
        if removed > 0 {
            self.rebuild_indexes()?;
        }
        Ok(removed)
    }

    /// Drop every record. Indexes stay declared but empty.
    pub fn delete_all(&mut self) {
        self.records.clear();
        for index in &mut self.indexes {
            index.clear();
        }
    }

    // ---- persistence ----

    /// Overwrite the backing file with the current records.
    ///
    /// Always writes, whether or not anything changed. The list-of-objects
    /// shape is guaranteed by the record type, so the snapshot is valid by
    /// construction. The write is temp-file + fsync + rename.
    pub fn sync(&self) -> Result<()> {
        let bytes = self.serializer.serialize(&self.records)?;
        atomic_write(&self.path, &bytes)?;
        debug!(
            path = %self.path.display(),
            records = self.records.len(),
            bytes = bytes.len(),
            "table synced"
        );
        Ok(())
    }

    // ---- internal ----

    fn index_for(&self, field: &str) -> Result<&Index> {
        self.index(field).ok_or_else(|| Error::IndexNotFound {
            field: field.to_string(),
        })
    }

    fn rebuild_indexes(&mut self) -> Result<()> {
        for index in &mut self.indexes {
            index.rebuild(&self.records)?;
        }
        Ok(())
    }

    fn merge(&mut self, targets: &[usize], fields: &Record) -> Result<()> {
        // validate every touched index before mutating anything
        let mut rekeys: Vec<(usize, IndexKey)> = Vec::new();
        for (i, index) in self.indexes.iter().enumerate() {
            let Some(value) = fields.get(index.field()) else {
                continue;
            };
            match targets {
                [] => {}
                [pos] => rekeys.push((i, index.check_value(value, *pos)?)),
                _ => {
                    return Err(Error::DuplicateKey {
                        field: index.field().to_string(),
                        value: value.to_string(),
                    })
                }
            }
        }

        for &pos in targets {
            let record = &mut self.records[pos];
            for (i, key) in &rekeys {
                let index = &mut self.indexes[*i];
                let old = record.get(index.field()).and_then(IndexKey::from_value);
                index.set(old.as_ref(), Some(key.clone()), pos);
            }
            for (k, v) in fields {
                record.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }
}

fn into_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(Error::InvalidRecord(kind(&other).to_string())),
    }
}

/// Pretty-printed JSON, keys sorted, two-space indent.
impl fmt::Display for JsonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text =
            serde_json::to_string_pretty(&SortedRecords(&self.records)).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Debug for JsonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonTable")
            .field("path", &self.path)
            .field("records", &self.records.len())
            .field("indexes", &self.indexed_fields().collect::<Vec<_>>())
            .field("pretty", &self.serializer.is_pretty())
            .finish()
    }
}

impl<'a> IntoIterator for &'a JsonTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`JsonTable`].
///
/// ```rust,no_run
/// use json_table::JsonTable;
///
/// let table = JsonTable::builder("users.json")
///     .index("id")
///     .sparse_index("email")
///     .pretty(true)
///     .build()
///     .unwrap();
/// ```
pub struct JsonTableBuilder {
    path: PathBuf,
    indexes: Vec<(String, IndexMode)>,
    pretty: bool,
}

impl JsonTableBuilder {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            indexes: Vec::new(),
            pretty: false,
        }
    }

    /// Maintain a strict unique index on `field`. Every record must carry it.
    pub fn index(self, field: impl Into<String>) -> Self {
        self.with_index(field.into(), IndexMode::Strict)
    }

    /// Maintain a unique index on `field` that skips records without it.
    pub fn sparse_index(self, field: impl Into<String>) -> Self {
        self.with_index(field.into(), IndexMode::Sparse)
    }

    /// Write human-readable JSON with indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Load the file (if any), validate it, and build the indexes.
    pub fn build(self) -> Result<JsonTable> {
        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };

        let records = load(&self.path, &serializer)?;

        let mut indexes = Vec::with_capacity(self.indexes.len());
        for (field, mode) in self.indexes {
            let index = Index::build(field, mode, &records)?;
            debug!(field = index.field(), entries = index.len(), "index built");
            indexes.push(index);
        }

        debug!(
            path = %self.path.display(),
            records = records.len(),
            indexes = indexes.len(),
            "table opened"
        );

        Ok(JsonTable {
            records,
            path: self.path,
            indexes,
            serializer,
        })
    }

    /// Open the table, hand it to `f`, and sync if `f` returns `Ok`.
    ///
    /// If `f` fails the error is logged and returned as-is and the file is
    /// left exactly as it was before the last sync.
    pub fn session<T, E, F>(self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut JsonTable) -> std::result::Result<T, E>,
        E: From<Error> + fmt::Display,
    {
        let mut table = self.build()?;
        match f(&mut table) {
            Ok(value) => {
                table.sync()?;
                Ok(value)
            }
            Err(err) => {
                error!(
                    path = %table.path.display(),
                    error = %err,
                    "table session failed, changes not synced"
                );
                Err(err)
            }
        }
    }

    fn with_index(mut self, field: String, mode: IndexMode) -> Self {
        match self.indexes.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = mode,
            None => self.indexes.push((field, mode)),
        }
        self
    }
}

impl fmt::Debug for JsonTableBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonTableBuilder")
            .field("path", &self.path)
            .field("indexes", &self.indexes)
            .field("pretty", &self.pretty)
            .finish()
    }
}
