//! Transaction types for the ledger.
//!
//! This module defines the transaction record and the idempotency guard that
//! protects its creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{IdempotencyKey, TxId, UserId};

/// Currency applied when the caller does not supply one.
pub const DEFAULT_CURRENCY: &str = "ARS";

/// A recorded financial transaction.
///
/// Transactions are created exactly once and never updated or deleted. The
/// store keeps two representations of every transaction (user-scoped and
/// canonical lookup); both carry this exact payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction id, generated at creation.
    pub tx_id: TxId,

    /// The owning user.
    pub user_id: UserId,

    /// Caller-supplied amount.
    pub amount: Decimal,

    /// ISO currency code (defaults to [`DEFAULT_CURRENCY`]).
    pub currency: String,

    /// Processing status. Always [`TxStatus::Pending`] at creation.
    pub status: TxStatus,

    /// When the transaction was created. Immutable.
    pub created_at: DateTime<Utc>,

    /// Opaque structured payload supplied by the caller.
    pub data: serde_json::Value,
}

/// Processing status of a transaction.
///
/// Transactions are created `PENDING`; later transitions happen outside this
/// service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    /// Recorded but not yet settled.
    Pending,
    /// Settled.
    Completed,
    /// Terminally failed.
    Failed,
}

/// Caller-supplied fields for a new transaction.
///
/// Identity fields (`tx_id`, `created_at`, `status`) are generated by the
/// store at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Amount to record. Required.
    pub amount: Decimal,

    /// ISO currency code.
    pub currency: String,

    /// Opaque structured payload.
    pub data: serde_json::Value,
}

impl NewTransaction {
    /// Create a new transaction payload with the default currency and an
    /// empty data object.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            data: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// A guard row marking that an idempotency token has already produced a
/// transaction.
///
/// At most one of these may ever exist per token; it is written atomically
/// with the transaction it protects and is never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// The caller-supplied token.
    pub key: IdempotencyKey,

    /// The transaction the token resolved to.
    pub tx_id: TxId,

    /// The user who issued the original request.
    pub user_id: UserId,

    /// When the guard (and its transaction) was written.
    pub created_at: DateTime<Utc>,
}
