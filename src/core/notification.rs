//! Notification list shared by every view
//!
//! [`NotificationCenter`] is an explicit handle passed to whatever needs to
//! post or acknowledge notifications. Entries are kept most-recent-first.

use crate::core::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A single notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
            read: false,
        }
    }
}

/// Process-wide notification list, injected by handle
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    entries: Arc<RwLock<Vec<Notification>>>,
    max_retained: Option<usize>,
}

impl NotificationCenter {
    /// Unbounded center
    pub fn new() -> Self {
        Self::default()
    }

    /// Center that evicts the oldest entries beyond `max`
    pub fn with_capacity_limit(max: usize) -> Self {
        Self {
            entries: Arc::default(),
            max_retained: Some(max),
        }
    }

    /// Seed with existing notifications, newest first
    pub fn with_seed(self, seed: Vec<Notification>) -> Self {
        {
            let mut entries = self.write();
            *entries = seed;
            if let Some(max) = self.max_retained {
                entries.truncate(max);
            }
        }
        self
    }

    /// Append a notification at the head of the list
    pub fn add(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Notification {
        let notification = Notification::new(kind, title, message);
        let mut entries = self.write();
        entries.insert(0, notification.clone());
        if let Some(max) = self.max_retained {
            entries.truncate(max);
        }
        tracing::debug!(id = %notification.id, kind = ?kind, "notification added");
        notification
    }

    /// Surface an engine error as an error notification
    pub fn report(&self, error: &EngineError) -> Notification {
        tracing::warn!(code = error.error_code(), "{}", error);
        self.add(NotificationKind::Error, error.title(), error.to_string())
    }

    /// Mark one notification as read; false if the id is unknown
    pub fn mark_read(&self, id: Uuid) -> bool {
        let mut entries = self.write();
        match entries.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&self) {
        for notification in self.write().iter_mut() {
            notification.read = true;
        }
    }

    /// Remove one notification; false if the id is unknown
    pub fn remove(&self, id: Uuid) -> bool {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// All notifications, most recent first
    pub fn list(&self) -> Vec<Notification> {
        self.read().clone()
    }

    pub fn unread_count(&self) -> usize {
        self.read().iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Notification>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Notification>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
