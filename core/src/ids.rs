//! Identifier types for the ledger.
//!
//! This module provides strongly-typed identifiers for users, transactions,
//! notifications, and idempotency tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A user identifier.
///
/// User IDs come from the identity provider's `sub` claim and are treated as
/// opaque strings; the ledger never inspects their structure.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a `UserId` from a subject string.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is empty.
    pub fn new(subject: impl Into<String>) -> Result<Self, IdError> {
        let subject = subject.into();
        if subject.is_empty() {
            return Err(IdError::EmptyUserId);
        }
        Ok(Self(subject))
    }

    /// Return the subject string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// A transaction identifier.
///
/// Rendered as `tx-<uuid>`. The id itself carries no ordering; chronological
/// order comes from the creation timestamp in the storage sort key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxId(Uuid);

impl TxId {
    /// Prefix used in the string form.
    const PREFIX: &'static str = "tx-";

    /// Generate a new random `TxId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TxId` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for TxId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(Self::PREFIX).ok_or(IdError::InvalidTxId)?;
        let uuid = Uuid::parse_str(raw).map_err(|_| IdError::InvalidTxId)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({}{})", Self::PREFIX, self.0)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl TryFrom<String> for TxId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TxId> for String {
    fn from(id: TxId) -> Self {
        id.to_string()
    }
}

/// A notification identifier, rendered as `ntf-<uuid>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NotificationId(Uuid);

impl NotificationId {
    const PREFIX: &'static str = "ntf-";

    /// Generate a new random `NotificationId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for NotificationId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(Self::PREFIX)
            .ok_or(IdError::InvalidNotificationId)?;
        let uuid = Uuid::parse_str(raw).map_err(|_| IdError::InvalidNotificationId)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotificationId({}{})", Self::PREFIX, self.0)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl TryFrom<String> for NotificationId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NotificationId> for String {
    fn from(id: NotificationId) -> Self {
        id.to_string()
    }
}

/// A caller-supplied idempotency token.
///
/// Opaque to the ledger; equality is the only operation that matters. At most
/// one transaction is ever recorded per token.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Create an `IdempotencyKey` from a caller-supplied token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, IdError> {
        let token = token.into();
        if token.is_empty() {
            return Err(IdError::EmptyIdempotencyKey);
        }
        Ok(Self(token))
    }

    /// Return the token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for IdempotencyKey {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdempotencyKey({})", self.0)
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdempotencyKey> for String {
    fn from(key: IdempotencyKey) -> Self {
        key.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// User id must be a non-empty subject string.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// The input is not a valid transaction id.
    #[error("invalid transaction id format")]
    InvalidTxId,

    /// The input is not a valid notification id.
    #[error("invalid notification id format")]
    InvalidNotificationId,

    /// Idempotency tokens must be non-empty.
    #[error("idempotency key must not be empty")]
    EmptyIdempotencyKey,
}
