use common::error::Res;

use crate::client::ApiClient;
use crate::dtos::billing::{
    CancelOutcome, CancelSubscriptionRequest, CreateSubscriptionRequest, CurrentSubscription,
    Invoice, PaypalOrderData, PaypalSubscriptionData, Plan,
};

impl ApiClient {
    pub async fn get_available_plans(&self) -> Res<Vec<Plan>> {
        self.get_list("billing/plans/").await
    }

    /// `None` covers both "no subscription row" and an explicit
    /// `status: none` record; callers treat them identically.
    pub async fn get_current_subscription(&self) -> Res<Option<CurrentSubscription>> {
        self.get("billing/subscription/").await
    }

    pub async fn get_invoices(&self) -> Res<Vec<Invoice>> {
        self.get_list("billing/invoices/").await
    }

    /// Asks the server to create the PayPal subscription and returns the
    /// approval handle. The subscription is not active until the user
    /// approves it and the server confirms the approval.
    pub async fn create_subscription(
        &self,
        req: &CreateSubscriptionRequest,
    ) -> Res<PaypalSubscriptionData> {
        self.post("billing/create-subscription/", req).await
    }

    /// Obtains a one-time PayPal order handle for a pending invoice.
    pub async fn pay_invoice(&self, invoice_id: &str) -> Res<PaypalOrderData> {
        self.post(
            &format!("billing/invoices/{}/pay/", invoice_id),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn cancel_subscription(&self, reason: Option<String>) -> Res<CancelOutcome> {
        self.post(
            "billing/cancel-subscription/",
            &CancelSubscriptionRequest { reason },
        )
        .await
    }
}
