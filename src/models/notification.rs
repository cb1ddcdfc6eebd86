use super::types::NotificationKind;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationFeed {
    pub unread_count: usize,
    pub today: Vec<Notification>,
    pub earlier: Vec<Notification>,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResult {
    pub updated: usize,
}
