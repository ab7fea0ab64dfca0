//! Application state.

use std::sync::Arc;

use ledger_store::{NotificationStore, RocksTable, TransactionStore};

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Transaction operations.
    pub transactions: TransactionStore,

    /// Notification listings.
    pub notifications: NotificationStore,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over the shared table.
    #[must_use]
    pub fn new(table: Arc<RocksTable>, config: ServiceConfig) -> Self {
        Self {
            transactions: TransactionStore::new(table.clone()),
            notifications: NotificationStore::new(table),
            config,
        }
    }
}
