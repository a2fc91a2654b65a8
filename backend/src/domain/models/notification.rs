use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::NotificationKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainNotification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Dedup key together with `user_id` and `kind`
    pub reference: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification about to be emitted; id and timestamp are assigned on insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference: Option<String>,
}
