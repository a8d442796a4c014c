use common::error::Res;

use crate::client::ApiClient;
use crate::dtos::dashboard::{
    ClientAccount, ClientCreateRequest, ContentItem, Message, Notification, SendMessageRequest,
    Task, TaskCreateRequest, TaskStatus,
};

impl ApiClient {
    // --- clients (admin) ---

    pub async fn get_clients(&self) -> Res<Vec<ClientAccount>> {
        self.get_list("clients/").await
    }

    pub async fn create_client(&self, req: &ClientCreateRequest) -> Res<ClientAccount> {
        self.post("clients/", req).await
    }

    pub async fn set_client_active(&self, client_id: &str, active: bool) -> Res<ClientAccount> {
        self.patch(
            &format!("clients/{}/", client_id),
            &serde_json::json!({ "active": active }),
        )
        .await
    }

    // --- content approval ---

    pub async fn get_content(&self) -> Res<Vec<ContentItem>> {
        self.get_list("content/").await
    }

    pub async fn approve_content(&self, content_id: &str) -> Res<ContentItem> {
        self.post(
            &format!("content/{}/approve/", content_id),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn reject_content(&self, content_id: &str, reason: Option<String>) -> Res<ContentItem> {
        self.post(
            &format!("content/{}/reject/", content_id),
            &serde_json::json!({ "reason": reason }),
        )
        .await
    }

    // --- tasks ---

    pub async fn get_tasks(&self) -> Res<Vec<Task>> {
        self.get_list("tasks/").await
    }

    pub async fn create_task(&self, req: &TaskCreateRequest) -> Res<Task> {
        self.post("tasks/", req).await
    }

    pub async fn set_task_status(&self, task_id: &str, status: TaskStatus) -> Res<Task> {
        self.patch(
            &format!("tasks/{}/", task_id),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    // --- messaging ---

    pub async fn get_messages(&self) -> Res<Vec<Message>> {
        self.get_list("messages/").await
    }

    pub async fn send_message(&self, body: &str) -> Res<Message> {
        self.post(
            "messages/",
            &SendMessageRequest {
                body: body.to_string(),
            },
        )
        .await
    }

    // --- notifications ---

    pub async fn get_notifications(&self) -> Res<Vec<Notification>> {
        self.get_list("notifications/").await
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Res<Notification> {
        self.post(
            &format!("notifications/{}/read/", notification_id),
            &serde_json::json!({}),
        )
        .await
    }
}
