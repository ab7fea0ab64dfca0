//! Notification types.
//!
//! Notifications share the user-scoped keying convention of transactions but
//! only their read path lives in this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{NotificationId, UserId};

/// A notification addressed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification id.
    pub notification_id: NotificationId,

    /// The user the notification is addressed to.
    pub user_id: UserId,

    /// Human-readable message.
    pub message: String,

    /// Whether the user has seen the notification.
    pub read: bool,

    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}
