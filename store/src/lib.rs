//! Single-table storage layer for the ledger.
//!
//! One logical table holds every entity — transactions (in two linked
//! representations), idempotency guards, and notifications — distinguished
//! by partition-key prefix and an entity-type tag, with one secondary index
//! for the global reverse-chronological view.
//!
//! # Architecture
//!
//! - [`Table`]: the four storage primitives the core consumes (point read,
//!   two descending queries, atomic guarded multi-write)
//! - [`RocksTable`]: the `RocksDB` implementation
//! - [`keys`] / [`codec`]: deterministic mapping between domain entities
//!   and stored rows
//! - [`TransactionStore`]: the three read access patterns and the
//!   idempotent create algorithm
//! - [`NotificationStore`]: the user-scoped notification listing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ledger_core::{NewTransaction, UserId};
//! use ledger_store::{RocksTable, TransactionStore};
//! use rust_decimal::Decimal;
//!
//! let table = Arc::new(RocksTable::open("/tmp/ledger-db").unwrap());
//! let store = TransactionStore::new(table);
//!
//! let user = UserId::new("user-1").unwrap();
//! let tx = store
//!     .create(&user, NewTransaction::new(Decimal::from(100)), None)
//!     .unwrap();
//! assert_eq!(store.get(&tx.tx_id).unwrap().unwrap(), tx);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod codec;
pub mod error;
pub mod keys;
pub mod notifications;
pub mod rocks;
pub mod schema;
pub mod table;
pub mod transactions;

pub use clock::{Clock, SystemClock};
pub use codec::Record;
pub use error::{Result, StoreError};
pub use notifications::NotificationStore;
pub use rocks::RocksTable;
pub use table::{Cursor, GlobalIndexKey, Item, ItemKey, QueryPage, Table, WriteItem};
pub use transactions::{
    Page, TransactionStore, DEFAULT_GLOBAL_LIMIT, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
