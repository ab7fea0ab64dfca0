//! Notification read façade.
//!
//! Notifications share the user partition and reverse-chronological keying
//! of transactions under their own type prefix. Only the read path lives in
//! this service; rows are written elsewhere.

use std::sync::Arc;

use ledger_core::{Notification, UserId};

use crate::codec;
use crate::error::Result;
use crate::keys;
use crate::table::{Cursor, Table};
use crate::transactions::{Page, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// Serves user-scoped notification listings.
#[derive(Clone)]
pub struct NotificationStore {
    table: Arc<dyn Table>,
}

impl NotificationStore {
    /// Create a store over the shared table.
    #[must_use]
    pub fn new(table: Arc<dyn Table>) -> Self {
        Self { table }
    }

    /// List a user's notifications, newest first. Same shape and semantics
    /// as the transaction listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the table operation fails.
    pub fn list_by_user(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Notification>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let page = self.table.query(
            &keys::user_partition(user_id),
            keys::NOTIFICATION_SORT_PREFIX,
            limit,
            cursor,
        )?;

        let items = page
            .items
            .into_iter()
            .map(codec::as_notification)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            next_cursor: page.next,
        })
    }
}
