//! Core types for the ledger service.
//!
//! This crate provides the foundational types used throughout the ledger:
//!
//! - **Identifiers**: [`UserId`], [`TxId`], [`NotificationId`],
//!   [`IdempotencyKey`]
//! - **Transactions**: [`Transaction`], [`NewTransaction`], [`TxStatus`],
//!   [`IdempotencyRecord`]
//! - **Notifications**: [`Notification`]
//!
//! Amounts are [`rust_decimal::Decimal`] to keep money exact; floats never
//! appear in the data model.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod notification;
pub mod transaction;

pub use ids::{IdError, IdempotencyKey, NotificationId, TxId, UserId};
pub use notification::Notification;
pub use transaction::{
    IdempotencyRecord, NewTransaction, Transaction, TxStatus, DEFAULT_CURRENCY,
};
