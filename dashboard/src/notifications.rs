use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::error::Res;
use tokio::time::Instant;

use api_client::ApiClient;
use api_client::dtos::dashboard::Notification;

use crate::polling::{Poller, spawn_poller};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn notifications(&self) -> Res<Vec<Notification>>;
    async fn mark_read(&self, notification_id: &str) -> Res<Notification>;
}

#[async_trait]
impl NotificationApi for ApiClient {
    async fn notifications(&self) -> Res<Vec<Notification>> {
        self.get_notifications().await
    }

    async fn mark_read(&self, notification_id: &str) -> Res<Notification> {
        self.mark_notification_read(notification_id).await
    }
}

struct Toast {
    notification: Notification,
    shown_at: Instant,
}

/// Notification dropdown backing state: a polled unread list plus a toast
/// queue whose entries hide themselves after a fixed display time.
pub struct NotificationCenter<A: NotificationApi + 'static> {
    api: Arc<A>,
    toasts: Vec<Toast>,
    auto_hide: Duration,
}

impl<A: NotificationApi + 'static> NotificationCenter<A> {
    pub fn new(api: Arc<A>) -> Self {
        NotificationCenter {
            api,
            toasts: Vec::new(),
            auto_hide: Duration::from_secs(5),
        }
    }

    pub fn with_auto_hide(mut self, auto_hide: Duration) -> Self {
        self.auto_hide = auto_hide;
        self
    }

    pub fn subscribe(&self, every: Duration) -> Poller<Vec<Notification>> {
        let api = self.api.clone();
        spawn_poller("notifications", every, move || {
            let api = api.clone();
            async move { api.notifications().await }
        })
    }

    /// Queues unseen notifications from a poll snapshot as toasts.
    pub fn push_snapshot(&mut self, snapshot: Vec<Notification>) {
        let now = Instant::now();
        for notification in snapshot {
            if notification.read {
                continue;
            }
            let already_queued = self
                .toasts
                .iter()
                .any(|t| t.notification.id == notification.id);
            if !already_queued {
                self.toasts.push(Toast {
                    notification,
                    shown_at: now,
                });
            }
        }
    }

    /// Drops toasts older than the auto-hide window and returns what is
    /// still visible.
    pub fn visible(&mut self) -> Vec<&Notification> {
        let cutoff = self.auto_hide;
        let now = Instant::now();
        self.toasts.retain(|t| now - t.shown_at < cutoff);
        self.toasts.iter().map(|t| &t.notification).collect()
    }

    pub async fn mark_read(&mut self, notification_id: &str) -> Res<Notification> {
        let updated = self.api.mark_read(notification_id).await?;
        self.toasts.retain(|t| t.notification.id != notification_id);
        Ok(updated)
    }
}
