use async_trait::async_trait;
use common::error::Res;

use api_client::ApiClient;
use api_client::dtos::billing::{
    CancelOutcome, CreateSubscriptionRequest, CurrentSubscription, Invoice, PaypalOrderData,
    PaypalSubscriptionData, Plan,
};

/// The slice of the backend the billing flow depends on. A trait seam so the
/// flow can be driven against mocks in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn plans(&self) -> Res<Vec<Plan>>;
    async fn current_subscription(&self) -> Res<Option<CurrentSubscription>>;
    async fn invoices(&self) -> Res<Vec<Invoice>>;
    async fn create_subscription(
        &self,
        req: CreateSubscriptionRequest,
    ) -> Res<PaypalSubscriptionData>;
    async fn pay_invoice(&self, invoice_id: &str) -> Res<PaypalOrderData>;
    async fn cancel_subscription(&self, reason: Option<String>) -> Res<CancelOutcome>;
}

#[async_trait]
impl BillingApi for ApiClient {
    async fn plans(&self) -> Res<Vec<Plan>> {
        self.get_available_plans().await
    }

    async fn current_subscription(&self) -> Res<Option<CurrentSubscription>> {
        self.get_current_subscription().await
    }

    async fn invoices(&self) -> Res<Vec<Invoice>> {
        self.get_invoices().await
    }

    async fn create_subscription(
        &self,
        req: CreateSubscriptionRequest,
    ) -> Res<PaypalSubscriptionData> {
        ApiClient::create_subscription(self, &req).await
    }

    async fn pay_invoice(&self, invoice_id: &str) -> Res<PaypalOrderData> {
        ApiClient::pay_invoice(self, invoice_id).await
    }

    async fn cancel_subscription(&self, reason: Option<String>) -> Res<CancelOutcome> {
        ApiClient::cancel_subscription(self, reason).await
    }
}
