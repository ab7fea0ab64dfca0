//! Entity codec: maps domain entities to and from stored rows.
//!
//! Rows are heterogeneous; the `entity_type` tag discriminates the payload
//! and must be inspected before interpreting type-specific attributes. A
//! transaction is encoded into exactly two rows — user-scoped and canonical
//! lookup — that carry the identical record payload and the same global
//! index attributes.

use serde::{Deserialize, Serialize};

use ledger_core::{IdempotencyRecord, Notification, Transaction};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::table::{Item, ItemKey};

/// The tagged entity payload of a stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Record {
    /// A financial transaction.
    Transaction(Transaction),
    /// An idempotency guard.
    Idempotency(IdempotencyRecord),
    /// A user notification.
    Notification(Notification),
}

/// The user-scoped representation of a transaction, supporting "list this
/// user's transactions newest-first".
#[must_use]
pub fn user_item(tx: &Transaction) -> Item {
    Item {
        key: ItemKey::new(
            keys::user_partition(&tx.user_id),
            keys::tx_sort_key(tx.created_at, &tx.tx_id),
        ),
        global_index: Some(keys::global_index_key(tx.created_at)),
        record: Record::Transaction(tx.clone()),
    }
}

/// The canonical lookup representation of a transaction, supporting O(1)
/// fetch by id.
#[must_use]
pub fn lookup_item(tx: &Transaction) -> Item {
    Item {
        key: ItemKey::new(keys::lookup_partition(&tx.tx_id), keys::METADATA),
        global_index: Some(keys::global_index_key(tx.created_at)),
        record: Record::Transaction(tx.clone()),
    }
}

/// The guard row claiming an idempotency token.
#[must_use]
pub fn guard_item(record: &IdempotencyRecord) -> Item {
    Item {
        key: ItemKey::new(keys::idempotency_partition(&record.key), keys::METADATA),
        global_index: None,
        record: Record::Idempotency(record.clone()),
    }
}

/// The stored representation of a notification.
#[must_use]
pub fn notification_item(notification: &Notification) -> Item {
    Item {
        key: ItemKey::new(
            keys::user_partition(&notification.user_id),
            keys::notification_sort_key(notification.created_at, &notification.notification_id),
        ),
        global_index: None,
        record: Record::Notification(notification.clone()),
    }
}

/// Decode a row expected to hold a transaction.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if the row holds a different
/// entity type.
pub fn as_transaction(item: Item) -> Result<Transaction> {
    match item.record {
        Record::Transaction(tx) => Ok(tx),
        _ => Err(unexpected_entity(&item.key, "TRANSACTION")),
    }
}

/// Decode a row expected to hold an idempotency guard.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if the row holds a different
/// entity type.
pub fn as_idempotency(item: Item) -> Result<IdempotencyRecord> {
    match item.record {
        Record::Idempotency(guard) => Ok(guard),
        _ => Err(unexpected_entity(&item.key, "IDEMPOTENCY")),
    }
}

/// Decode a row expected to hold a notification.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if the row holds a different
/// entity type.
pub fn as_notification(item: Item) -> Result<Notification> {
    match item.record {
        Record::Notification(notification) => Ok(notification),
        _ => Err(unexpected_entity(&item.key, "NOTIFICATION")),
    }
}

fn unexpected_entity(key: &ItemKey, expected: &str) -> StoreError {
    StoreError::Serialization(format!(
        "row {}/{} does not hold a {expected} record",
        key.partition, key.sort
    ))
}
