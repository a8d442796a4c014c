use serde::{Deserialize, Serialize};

/// A named pricing tier. Fetched, never mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Monthly price in whole dollars, server-asserted.
    pub price: i64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    PastDue,
    #[default]
    None,
}

/// Read-mostly mirror of the server's subscription record. Only re-fetch
/// after a confirmed subscribe/cancel changes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentSubscription {
    pub plan: String,
    pub plan_id: String,
    pub price: i64,
    pub billing_cycle: String,
    pub next_billing_date: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub can_cancel: bool,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Paid,
    Pending,
    Overdue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    /// Amount in whole dollars, server-asserted.
    pub amount: i64,
    pub due_date: String,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSubscriptionRequest {
    pub price_id: String,
    pub plan_name: String,
}

/// Server-issued approval handle for a subscription. Used once to drive the
/// PayPal button, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaypalSubscriptionData {
    pub subscription_id: String,
    pub approval_url: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
}

/// Server-issued approval handle for a one-time invoice payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaypalOrderData {
    pub order_id: String,
    pub approval_url: String,
    pub amount: i64,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelSubscriptionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelOutcome {
    pub message: String,
    pub cancelled_immediately: bool,
}
