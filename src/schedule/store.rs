//! Local notification store seam.
//!
//! The host platform owns the real pending-notification queue. The engine
//! talks to it through [`NotificationStore`]; [`InMemoryNotificationStore`]
//! is a complete implementation for hosts without a native queue and for
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

use crate::error::{ReminderError, Result};
use crate::schedule::category::{NotificationCategory, SoundSpec};
use crate::schedule::entry::Trigger;

/// Ownership tag carried by every stored notification.
///
/// The reconciliation clear step removes only [`Namespace::Reconciled`]
/// entries; ad-hoc reminders survive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Written by the reconciliation engine.
    Reconciled,
    /// Written directly by the host.
    AdHoc,
}

/// Displayed content of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: SoundSpec,
    pub namespace: Namespace,
    /// `None` for ad-hoc notifications.
    pub category: Option<NotificationCategory>,
}

/// A request to schedule one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub trigger: Trigger,
    pub content: NotificationContent,
}

/// Opaque identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(String);

impl NotificationHandle {
    /// Wrap a store-specific identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A notification waiting in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
    pub handle: NotificationHandle,
    pub trigger: Trigger,
    pub content: NotificationContent,
}

impl PendingNotification {
    /// Category plus trigger; the identity used to compare store contents.
    pub fn key(&self) -> Option<(NotificationCategory, Trigger)> {
        self.content.category.map(|c| (c, self.trigger))
    }
}

/// Host-provided queue of pending local notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Whether the host currently allows posting notifications.
    async fn permission_granted(&self) -> bool;

    /// Add one notification.
    ///
    /// # Errors
    ///
    /// [`ReminderError::StoreWrite`] if the host rejects the write.
    async fn schedule(&self, request: NotificationRequest) -> Result<NotificationHandle>;

    /// Every pending notification, in any namespace.
    async fn list(&self) -> Result<Vec<PendingNotification>>;

    /// Remove one notification.
    ///
    /// # Errors
    ///
    /// [`ReminderError::UnknownHandle`] if nothing is pending under `handle`.
    async fn cancel_one(&self, handle: &NotificationHandle) -> Result<()>;

    /// Remove every pending notification.
    async fn cancel_all(&self) -> Result<()>;
}

/// Process-local [`NotificationStore`].
#[derive(Debug)]
pub struct InMemoryNotificationStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    granted: bool,
    pending: Vec<PendingNotification>,
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNotificationStore {
    /// Empty store with permission granted.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                granted: true,
                pending: Vec::new(),
            }),
        }
    }

    /// Grant or revoke posting permission.
    pub fn set_permission_granted(&self, granted: bool) {
        self.lock().granted = granted;
    }

    /// Number of pending notifications.
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending notifications in one namespace.
    pub fn pending_in(&self, namespace: Namespace) -> Vec<PendingNotification> {
        self.lock()
            .pending
            .iter()
            .filter(|p| p.content.namespace == namespace)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // The state has no invariants a panicking writer could break.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn permission_granted(&self) -> bool {
        self.lock().granted
    }

    async fn schedule(&self, request: NotificationRequest) -> Result<NotificationHandle> {
        let handle = NotificationHandle::new(uuid::Uuid::new_v4().to_string());
        self.lock().pending.push(PendingNotification {
            handle: handle.clone(),
            trigger: request.trigger,
            content: request.content,
        });
        Ok(handle)
    }

    async fn list(&self) -> Result<Vec<PendingNotification>> {
        Ok(self.lock().pending.clone())
    }

    async fn cancel_one(&self, handle: &NotificationHandle) -> Result<()> {
        let mut state = self.lock();
        let before = state.pending.len();
        state.pending.retain(|p| &p.handle != handle);
        if state.pending.len() == before {
            return Err(ReminderError::UnknownHandle(handle.to_string()));
        }
        Ok(())
    }

    async fn cancel_all(&self) -> Result<()> {
        self.lock().pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::{TimeZone, Utc};

    fn request(namespace: Namespace) -> NotificationRequest {
        NotificationRequest {
            trigger: Trigger::at(Utc.with_ymd_and_hms(2025, 3, 1, 4, 30, 0).unwrap()),
            content: NotificationContent {
                title: "t".into(),
                body: "b".into(),
                sound: SoundSpec {
                    sound: None,
                    channel_id: None,
                },
                namespace,
                category: None,
            },
        }
    }

    #[tokio::test]
    async fn schedule_assigns_distinct_handles() {
        let store = InMemoryNotificationStore::new();
        let a = store.schedule(request(Namespace::AdHoc)).await.unwrap();
        let b = store.schedule(request(Namespace::AdHoc)).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn cancel_one_removes_only_that_handle() {
        let store = InMemoryNotificationStore::new();
        let a = store.schedule(request(Namespace::AdHoc)).await.unwrap();
        store.schedule(request(Namespace::Reconciled)).await.unwrap();

        store.cancel_one(&a).await.unwrap();
        let left = store.list().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].content.namespace, Namespace::Reconciled);
    }

    #[tokio::test]
    async fn cancel_unknown_handle_errors() {
        let store = InMemoryNotificationStore::new();
        let err = store
            .cancel_one(&NotificationHandle::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReminderError::UnknownHandle(id) if id == "missing"));
    }

    #[tokio::test]
    async fn permission_toggle() {
        let store = InMemoryNotificationStore::new();
        assert!(store.permission_granted().await);
        store.set_permission_granted(false);
        assert!(!store.permission_granted().await);
    }

    #[tokio::test]
    async fn cancel_all_empties_store() {
        let store = InMemoryNotificationStore::new();
        store.schedule(request(Namespace::AdHoc)).await.unwrap();
        store.cancel_all().await.unwrap();
        assert!(store.is_empty());
    }
}
