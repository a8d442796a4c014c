use std::sync::Arc;

use async_trait::async_trait;
use common::error::Res;
use futures::try_join;

use api_client::ApiClient;
use api_client::dtos::dashboard::{
    ClientAccount, ClientCreateRequest, ContentItem, Task, TaskCreateRequest, TaskStatus,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn clients(&self) -> Res<Vec<ClientAccount>>;
    async fn create_client(&self, req: ClientCreateRequest) -> Res<ClientAccount>;
    async fn set_client_active(&self, client_id: &str, active: bool) -> Res<ClientAccount>;
    async fn content(&self) -> Res<Vec<ContentItem>>;
    async fn approve_content(&self, content_id: &str) -> Res<ContentItem>;
    async fn reject_content(&self, content_id: &str, reason: Option<String>) -> Res<ContentItem>;
    async fn tasks(&self) -> Res<Vec<Task>>;
    async fn create_task(&self, req: TaskCreateRequest) -> Res<Task>;
    async fn set_task_status(&self, task_id: &str, status: TaskStatus) -> Res<Task>;
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn clients(&self) -> Res<Vec<ClientAccount>> {
        self.get_clients().await
    }

    async fn create_client(&self, req: ClientCreateRequest) -> Res<ClientAccount> {
        ApiClient::create_client(self, &req).await
    }

    async fn set_client_active(&self, client_id: &str, active: bool) -> Res<ClientAccount> {
        ApiClient::set_client_active(self, client_id, active).await
    }

    async fn content(&self) -> Res<Vec<ContentItem>> {
        self.get_content().await
    }

    async fn approve_content(&self, content_id: &str) -> Res<ContentItem> {
        ApiClient::approve_content(self, content_id).await
    }

    async fn reject_content(&self, content_id: &str, reason: Option<String>) -> Res<ContentItem> {
        ApiClient::reject_content(self, content_id, reason).await
    }

    async fn tasks(&self) -> Res<Vec<Task>> {
        self.get_tasks().await
    }

    async fn create_task(&self, req: TaskCreateRequest) -> Res<Task> {
        ApiClient::create_task(self, &req).await
    }

    async fn set_task_status(&self, task_id: &str, status: TaskStatus) -> Res<Task> {
        ApiClient::set_task_status(self, task_id, status).await
    }
}

/// Backing state for the admin/client dashboard screens: plain lists fetched
/// together, mutated only by replacing entries with server-returned records.
pub struct DashboardService<A: DashboardApi> {
    api: Arc<A>,
    clients: Vec<ClientAccount>,
    content: Vec<ContentItem>,
    tasks: Vec<Task>,
}

impl<A: DashboardApi> DashboardService<A> {
    pub fn new(api: Arc<A>) -> Self {
        DashboardService {
            api,
            clients: Vec::new(),
            content: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Res<()> {
        let (clients, content, tasks) =
            try_join!(self.api.clients(), self.api.content(), self.api.tasks())?;
        self.clients = clients;
        self.content = content;
        self.tasks = tasks;
        Ok(())
    }

    pub fn clients(&self) -> &[ClientAccount] {
        &self.clients
    }

    pub fn content(&self) -> &[ContentItem] {
        &self.content
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub async fn add_client(&mut self, req: ClientCreateRequest) -> Res<&ClientAccount> {
        let created = self.api.create_client(req).await?;
        self.clients.push(created);
        Ok(self.clients.last().expect("just pushed"))
    }

    pub async fn set_client_active(&mut self, client_id: &str, active: bool) -> Res<()> {
        let updated = self.api.set_client_active(client_id, active).await?;
        self.replace_client(updated);
        Ok(())
    }

    /// Approval is server-confirmed: the local item takes whatever status
    /// the server returns.
    pub async fn approve_content(&mut self, content_id: &str) -> Res<()> {
        let updated = self.api.approve_content(content_id).await?;
        self.replace_content(updated);
        Ok(())
    }

    pub async fn reject_content(&mut self, content_id: &str, reason: Option<String>) -> Res<()> {
        let updated = self.api.reject_content(content_id, reason).await?;
        self.replace_content(updated);
        Ok(())
    }

    pub async fn add_task(&mut self, req: TaskCreateRequest) -> Res<&Task> {
        let created = self.api.create_task(req).await?;
        self.tasks.push(created);
        Ok(self.tasks.last().expect("just pushed"))
    }

    pub async fn set_task_status(&mut self, task_id: &str, status: TaskStatus) -> Res<()> {
        let updated = self.api.set_task_status(task_id, status).await?;
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
            *slot = updated;
        }
        Ok(())
    }

    fn replace_client(&mut self, updated: ClientAccount) {
        if let Some(slot) = self.clients.iter_mut().find(|c| c.id == updated.id) {
            *slot = updated;
        }
    }

    fn replace_content(&mut self, updated: ContentItem) {
        if let Some(slot) = self.content.iter_mut().find(|c| c.id == updated.id) {
            *slot = updated;
        }
    }
}
