//! Key construction for the single logical table.
//!
//! Pure functions over well-formed inputs; the id types already reject the
//! empty strings that would produce degenerate keys. Timestamps are encoded
//! with millisecond precision so lexicographic order on sort keys equals
//! chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use ledger_core::{IdempotencyKey, NotificationId, TxId, UserId};

use crate::table::GlobalIndexKey;

/// Fixed sort-key sentinel for single-row partitions.
pub const METADATA: &str = "METADATA";

/// Fixed partition value grouping every transaction in the global index.
pub const GLOBAL_TX_PARTITION: &str = "GLOBAL_TX";

/// Sort-key prefix of user-scoped transaction rows.
pub const TX_SORT_PREFIX: &str = "TX#";

/// Sort-key prefix of notification rows.
pub const NOTIFICATION_SORT_PREFIX: &str = "NOTIF#";

/// Partition key of a user's rows: `USER#<userId>`.
#[must_use]
pub fn user_partition(user_id: &UserId) -> String {
    format!("USER#{user_id}")
}

/// Sort key of a user-scoped transaction row: `TX#<createdAt>#<txId>`.
///
/// Timestamp first keeps a user's transactions totally ordered by creation
/// time; the id suffix keeps keys collision-free when timestamps coincide.
#[must_use]
pub fn tx_sort_key(created_at: DateTime<Utc>, tx_id: &TxId) -> String {
    format!("{TX_SORT_PREFIX}{}#{tx_id}", iso_timestamp(created_at))
}

/// Partition key of the canonical lookup row: `TX#<txId>`, one row per
/// transaction under the [`METADATA`] sort sentinel.
#[must_use]
pub fn lookup_partition(tx_id: &TxId) -> String {
    format!("TX#{tx_id}")
}

/// Partition key of an idempotency guard row: `IDE#<token>`.
#[must_use]
pub fn idempotency_partition(key: &IdempotencyKey) -> String {
    format!("IDE#{key}")
}

/// Sort key of a notification row: `NOTIF#<createdAt>#<notificationId>`.
#[must_use]
pub fn notification_sort_key(created_at: DateTime<Utc>, id: &NotificationId) -> String {
    format!("{NOTIFICATION_SORT_PREFIX}{}#{id}", iso_timestamp(created_at))
}

/// Global index attributes attached to both transaction representations.
#[must_use]
pub fn global_index_key(created_at: DateTime<Utc>) -> GlobalIndexKey {
    GlobalIndexKey {
        partition: GLOBAL_TX_PARTITION.to_string(),
        sort: iso_timestamp(created_at),
    }
}

/// ISO-8601 UTC timestamp with millisecond precision and `Z` suffix.
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
