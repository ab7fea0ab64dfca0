//! Notification handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use ledger_core::Notification;
use ledger_store::{keys, Cursor};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Notification response.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    /// Notification id.
    pub notification_id: String,
    /// Human-readable message.
    pub message: String,
    /// Whether the user has seen the notification.
    pub read: bool,
    /// Creation timestamp (ISO-8601).
    pub created_at: String,
}

impl From<&Notification> for NotificationResponse {
    fn from(notification: &Notification) -> Self {
        Self {
            notification_id: notification.notification_id.to_string(),
            message: notification.message.clone(),
            read: notification.read,
            created_at: keys::iso_timestamp(notification.created_at),
        }
    }
}

/// Notification list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    /// Maximum number of notifications to return (default: 20, max: 100).
    pub limit: Option<usize>,
    /// Continuation cursor from a previous page, passed back verbatim.
    pub cursor: Option<Cursor>,
}

/// List notifications response.
#[derive(Debug, Serialize)]
pub struct ListNotificationsResponse {
    /// Notifications, newest first.
    pub items: Vec<NotificationResponse>,
    /// Cursor for the next page; absent at end of stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// List the authenticated user's notifications, newest first.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<ListNotificationsResponse>, ApiError> {
    let page = state
        .notifications
        .list_by_user(&auth.user_id, query.limit, query.cursor.as_ref())?;

    Ok(Json(ListNotificationsResponse {
        items: page.items.iter().map(NotificationResponse::from).collect(),
        next_cursor: page.next_cursor.map(|cursor| cursor.to_string()),
    }))
}
