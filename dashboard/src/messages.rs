use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::error::{AppError, Res};

use api_client::ApiClient;
use api_client::dtos::dashboard::Message;

use crate::polling::{Poller, spawn_poller};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn messages(&self) -> Res<Vec<Message>>;
    async fn send(&self, body: &str) -> Res<Message>;
}

#[async_trait]
impl MessagingApi for ApiClient {
    async fn messages(&self) -> Res<Vec<Message>> {
        self.get_messages().await
    }

    async fn send(&self, body: &str) -> Res<Message> {
        self.send_message(body).await
    }
}

/// Live message list for the messaging panel. "Live" means polling: the
/// feed re-fetches on an interval and pushes each snapshot to the
/// subscriber.
pub struct MessageFeed<A: MessagingApi + 'static> {
    api: Arc<A>,
}

impl<A: MessagingApi + 'static> MessageFeed<A> {
    pub fn new(api: Arc<A>) -> Self {
        MessageFeed { api }
    }

    pub fn subscribe(&self, every: Duration) -> Poller<Vec<Message>> {
        let api = self.api.clone();
        spawn_poller("messages", every, move || {
            let api = api.clone();
            async move { api.messages().await }
        })
    }

    pub async fn send(&self, body: &str) -> Res<Message> {
        if body.trim().is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }
        self.api.send(body.trim()).await
    }
}
