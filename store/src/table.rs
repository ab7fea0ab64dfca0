//! The key-value table abstraction the ledger core is written against.
//!
//! The core depends only on these four primitive shapes — point read, two
//! descending queries, and an atomic guarded multi-write — never on a
//! specific store's query language. [`crate::rocks::RocksTable`] is the
//! production implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::Record;
use crate::error::{Result, StoreError};

/// Composite primary key of a row: partition groups related rows, sort
/// orders them within the partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// Partition key, e.g. `USER#<id>`.
    pub partition: String,
    /// Sort key, e.g. `TX#<createdAt>#<txId>` or a fixed sentinel.
    pub sort: String,
}

impl ItemKey {
    /// Create a composite key.
    #[must_use]
    pub fn new(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: sort.into(),
        }
    }
}

/// Alternate key projecting a row into the global secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalIndexKey {
    /// Fixed partition value grouping all indexed rows.
    pub partition: String,
    /// Sort value, the creation timestamp.
    pub sort: String,
}

/// A stored row: primary key, optional index projection, and the entity
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Composite primary key.
    pub key: ItemKey,
    /// Index attributes, when the row participates in the global index.
    pub global_index: Option<GlobalIndexKey>,
    /// The tagged entity payload.
    pub record: Record,
}

/// A single write in an atomic multi-write.
#[derive(Debug, Clone)]
pub struct WriteItem {
    /// The row to write.
    pub item: Item,
    /// When set, the write only succeeds if no row exists at the key.
    pub require_absent: bool,
}

impl WriteItem {
    /// Unconditional put.
    #[must_use]
    pub fn put(item: Item) -> Self {
        Self {
            item,
            require_absent: false,
        }
    }

    /// Put guarded by an existence check at the item's key.
    #[must_use]
    pub fn put_if_absent(item: Item) -> Self {
        Self {
            item,
            require_absent: true,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct QueryPage {
    /// Matching rows, newest first.
    pub items: Vec<Item>,
    /// Continuation token when more results may exist. Absent at end of
    /// stream.
    pub next: Option<Cursor>,
}

/// Opaque pagination cursor.
///
/// Produced and consumed only by the store client; callers pass it back
/// verbatim and never construct or inspect one. The string form is a hex
/// encoding of the native resume position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cursor(Vec<u8>);

impl Cursor {
    pub(crate) fn new(position: Vec<u8>) -> Self {
        Self(position)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl FromStr for Cursor {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| StoreError::InvalidCursor)?;
        if bytes.is_empty() {
            return Err(StoreError::InvalidCursor);
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Cursor {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.to_string()
    }
}

/// The storage primitives the ledger core consumes.
///
/// All queries scan newest first; every access pattern in this system is
/// reverse-chronological. Implementations must make `transact_write` an
/// all-or-nothing unit: either every row is durably written or none are,
/// and existence guards are evaluated atomically with the write.
pub trait Table: Send + Sync {
    /// Point read of a row by its composite key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or decoding fails.
    fn get(&self, key: &ItemKey) -> Result<Option<Item>>;

    /// Query a partition for rows whose sort key starts with `sort_prefix`,
    /// descending, bounded by `limit`. `start` resumes a prior page.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or decoding fails.
    fn query(
        &self,
        partition: &str,
        sort_prefix: &str,
        limit: usize,
        start: Option<&Cursor>,
    ) -> Result<QueryPage>;

    /// Query the global secondary index for a partition, descending by
    /// index sort value, bounded by `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation or decoding fails.
    fn query_global_index(
        &self,
        partition: &str,
        limit: usize,
        start: Option<&Cursor>,
    ) -> Result<QueryPage>;

    /// Apply all writes as a single atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConditionFailed`] if any `require_absent`
    /// guard is violated; nothing is written in that case.
    fn transact_write(&self, writes: Vec<WriteItem>) -> Result<()>;
}
