use std::sync::Arc;
use std::time::Duration;

use common::error::{AppError, Res};
use futures::try_join;

use api_client::dtos::billing::{
    CreateSubscriptionRequest, CurrentSubscription, Invoice, InvoiceStatus, PaypalOrderData,
    PaypalSubscriptionData, Plan, SubscriptionStatus,
};

use crate::api::BillingApi;

/// Screens of the checkout flow. Transitions only exist where a method
/// defines them; anything else is rejected.
#[derive(Debug, Clone)]
pub enum BillingState {
    Overview,
    PlanSelection,
    PlanDetails {
        plan: Plan,
    },
    Payment {
        plan: Plan,
        subscription: PaypalSubscriptionData,
    },
    Success,
}

impl BillingState {
    fn name(&self) -> &'static str {
        match self {
            BillingState::Overview => "overview",
            BillingState::PlanSelection => "plan-selection",
            BillingState::PlanDetails { .. } => "plan-details",
            BillingState::Payment { .. } => "payment",
            BillingState::Success => "success",
        }
    }
}

/// One-time invoice payment runs beside the subscription states, modal
/// style: present only while the payment modal is open.
#[derive(Debug, Clone)]
pub struct InvoicePayment {
    pub invoice_id: String,
    pub order: PaypalOrderData,
}

pub struct BillingFlow<A: BillingApi> {
    api: Arc<A>,
    state: BillingState,
    plans: Vec<Plan>,
    invoices: Vec<Invoice>,
    subscription: Option<CurrentSubscription>,
    error: Option<String>,
    invoice_payment: Option<InvoicePayment>,
    success_hold: Duration,
}

impl<A: BillingApi> BillingFlow<A> {
    pub fn new(api: Arc<A>) -> Self {
        BillingFlow {
            api,
            state: BillingState::Overview,
            plans: Vec::new(),
            invoices: Vec::new(),
            subscription: None,
            error: None,
            invoice_payment: None,
            success_hold: Duration::from_secs(2),
        }
    }

    pub fn with_success_hold(mut self, hold: Duration) -> Self {
        self.success_hold = hold;
        self
    }

    /// Initial load: invoices, subscription and plans fetched concurrently.
    /// Users without a usable subscription land directly on plan selection.
    pub async fn load(&mut self) -> Res<()> {
        let (invoices, subscription, plans) = try_join!(
            self.api.invoices(),
            self.api.current_subscription(),
            self.api.plans()
        )?;
        self.invoices = invoices;
        self.subscription = subscription;
        self.plans = plans;
        self.route();
        Ok(())
    }

    /// `status: none` is routed exactly like a missing subscription.
    fn has_subscription(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|sub| sub.status != SubscriptionStatus::None)
    }

    fn route(&mut self) {
        self.state = if self.has_subscription() {
            BillingState::Overview
        } else {
            BillingState::PlanSelection
        };
    }

    pub fn select_plan(&mut self, plan_id: &str) -> Res<()> {
        if !matches!(self.state, BillingState::PlanSelection) {
            return Err(self.invalid_transition("select a plan"));
        }
        let plan = self
            .plans
            .iter()
            .find(|p| p.id == plan_id)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("Unknown plan: {}", plan_id)))?;
        self.state = BillingState::PlanDetails { plan };
        self.error = None;
        Ok(())
    }

    /// "Continue to PayPal": asks the server for the approval handle. On
    /// failure the user stays on plan details with an inline error.
    pub async fn continue_to_paypal(&mut self) -> Res<()> {
        let plan = match &self.state {
            BillingState::PlanDetails { plan } => plan.clone(),
            _ => return Err(self.invalid_transition("continue to PayPal")),
        };

        let req = CreateSubscriptionRequest {
            price_id: format!("price_{}_monthly", plan.id),
            plan_name: plan.name.clone(),
        };
        match self.api.create_subscription(req).await {
            Ok(subscription) => {
                log::info!(
                    "subscription approval handle issued: {}",
                    subscription.subscription_id
                );
                self.state = BillingState::Payment { plan, subscription };
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Driven by the checkout adapter's success callback.
    pub fn complete_payment(&mut self) -> Res<()> {
        if !matches!(self.state, BillingState::Payment { .. }) {
            return Err(self.invalid_transition("complete payment"));
        }
        self.state = BillingState::Success;
        Ok(())
    }

    /// Checkout failure keeps the user on the payment screen with the
    /// message inline.
    pub fn payment_failed(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    /// Holds the success screen for the configured delay, then re-fetches
    /// billing data and routes back to the overview.
    pub async fn settle_success(&mut self) -> Res<()> {
        if !matches!(self.state, BillingState::Success) {
            return Err(self.invalid_transition("settle"));
        }
        tokio::time::sleep(self.success_hold).await;
        self.load().await
    }

    pub fn back(&mut self) -> Res<()> {
        self.state = match &self.state {
            BillingState::PlanDetails { .. } => BillingState::PlanSelection,
            BillingState::Payment { plan, .. } => BillingState::PlanDetails { plan: plan.clone() },
            BillingState::PlanSelection | BillingState::Success | BillingState::Overview => {
                BillingState::Overview
            }
        };
        self.error = None;
        Ok(())
    }

    // --- invoice payment sub-flow ---

    /// "Pay with PayPal" on an unpaid invoice: obtains the one-time order
    /// handle. The payment modal only opens once the handle is stored.
    pub async fn start_invoice_payment(&mut self, invoice_id: &str) -> Res<()> {
        let invoice = self
            .invoices
            .iter()
            .find(|inv| inv.id == invoice_id)
            .ok_or_else(|| AppError::NotFound(format!("Invoice {}", invoice_id)))?;
        if invoice.status == InvoiceStatus::Paid {
            return Err(AppError::Validation(format!(
                "Invoice {} is already paid",
                invoice.invoice_number
            )));
        }

        let order = self.api.pay_invoice(invoice_id).await?;
        self.invoice_payment = Some(InvoicePayment {
            invoice_id: invoice_id.to_string(),
            order,
        });
        Ok(())
    }

    pub fn invoice_modal_open(&self) -> bool {
        self.invoice_payment.is_some()
    }

    pub fn invoice_payment(&self) -> Option<&InvoicePayment> {
        self.invoice_payment.as_ref()
    }

    /// Capture succeeded: close the modal and re-fetch invoices so the paid
    /// status is the server's, not ours.
    pub async fn complete_invoice_payment(&mut self) -> Res<()> {
        if self.invoice_payment.take().is_none() {
            return Err(self.invalid_transition("complete invoice payment"));
        }
        self.invoices = self.api.invoices().await?;
        Ok(())
    }

    pub fn dismiss_invoice_payment(&mut self) {
        self.invoice_payment = None;
    }

    // --- cancellation ---

    /// Cancels the current subscription with an optional reason and
    /// refreshes. Errors surface inline and leave the screen usable.
    pub async fn cancel_subscription(&mut self, reason: Option<String>) -> Res<String> {
        match self.api.cancel_subscription(reason).await {
            Ok(outcome) => {
                log::info!(
                    "subscription cancelled (immediately: {})",
                    outcome.cancelled_immediately
                );
                self.load().await?;
                Ok(outcome.message)
            }
            Err(e) => {
                let message = e.user_message();
                self.error = Some(message.clone());
                Err(e)
            }
        }
    }

    // --- accessors ---

    pub fn state(&self) -> &BillingState {
        &self.state
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Empty plan list is an empty state, never an error.
    pub fn has_plans(&self) -> bool {
        !self.plans.is_empty()
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn subscription(&self) -> Option<&CurrentSubscription> {
        self.subscription.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn invalid_transition(&self, action: &str) -> AppError {
        AppError::Validation(format!(
            "Cannot {} from the {} screen",
            action,
            self.state.name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBillingApi;
    use api_client::dtos::billing::CancelOutcome;
    use mockall::predicate::eq;

    fn plan(id: &str, name: &str, price: i64) -> Plan {
        Plan {
            id: id.to_string(),
            name: name.to_string(),
            price,
            features: vec!["Posts".to_string(), "Reports".to_string()],
            is_current: false,
            recommended: false,
        }
    }

    fn pending_invoice(id: &str, number: &str, amount: i64) -> Invoice {
        Invoice {
            id: id.to_string(),
            invoice_number: number.to_string(),
            amount,
            due_date: "2026-09-15".to_string(),
            status: InvoiceStatus::Pending,
            paid_at: None,
            description: None,
            created_at: "2026-08-15T00:00:00Z".to_string(),
        }
    }

    fn active_subscription() -> CurrentSubscription {
        CurrentSubscription {
            plan: "Growth".to_string(),
            plan_id: "growth".to_string(),
            price: 3000,
            billing_cycle: "monthly".to_string(),
            next_billing_date: Some("2026-09-30".to_string()),
            features: vec![],
            status: SubscriptionStatus::Active,
            subscription_id: Some("sub_123".to_string()),
            can_cancel: true,
            cancel_at_period_end: false,
        }
    }

    fn api_returning(
        invoices: Vec<Invoice>,
        subscription: Option<CurrentSubscription>,
        plans: Vec<Plan>,
    ) -> MockBillingApi {
        let mut api = MockBillingApi::new();
        api.expect_invoices().returning(move || Ok(invoices.clone()));
        api.expect_current_subscription()
            .returning(move || Ok(subscription.clone()));
        api.expect_plans().returning(move || Ok(plans.clone()));
        api
    }

    #[tokio::test]
    async fn no_subscription_routes_to_plan_selection() {
        let api = api_returning(vec![], None, vec![plan("starter", "Starter", 1000)]);
        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        assert!(matches!(flow.state(), BillingState::PlanSelection));
    }

    #[tokio::test]
    async fn status_none_routes_to_plan_selection() {
        let sub = CurrentSubscription {
            status: SubscriptionStatus::None,
            ..active_subscription()
        };
        let api = api_returning(vec![], Some(sub), vec![]);
        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        assert!(matches!(flow.state(), BillingState::PlanSelection));
        assert!(!flow.has_plans());
    }

    #[tokio::test]
    async fn active_subscription_routes_to_overview() {
        let api = api_returning(vec![], Some(active_subscription()), vec![]);
        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        assert!(matches!(flow.state(), BillingState::Overview));
    }

    #[tokio::test]
    async fn continue_sends_derived_price_id_and_plan_name() {
        let mut api = api_returning(vec![], None, vec![plan("starter", "Starter", 1000)]);
        api.expect_create_subscription()
            .with(eq(CreateSubscriptionRequest {
                price_id: "price_starter_monthly".to_string(),
                plan_name: "Starter".to_string(),
            }))
            .times(1)
            .returning(|_| {
                Ok(PaypalSubscriptionData {
                    subscription_id: "sub_9".to_string(),
                    approval_url: "https://paypal.test/approve".to_string(),
                    status: None,
                    plan_name: None,
                    amount: None,
                })
            });

        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        flow.select_plan("starter").unwrap();
        flow.continue_to_paypal().await.unwrap();
        assert!(matches!(flow.state(), BillingState::Payment { .. }));
    }

    #[tokio::test]
    async fn create_subscription_failure_stays_on_plan_details() {
        let mut api = api_returning(vec![], None, vec![plan("starter", "Starter", 1000)]);
        api.expect_create_subscription().returning(|_| {
            Err(AppError::Api {
                status: 400,
                message: "Plan unavailable".to_string(),
            })
        });

        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        flow.select_plan("starter").unwrap();
        assert!(flow.continue_to_paypal().await.is_err());
        assert!(matches!(flow.state(), BillingState::PlanDetails { .. }));
        assert_eq!(flow.error(), Some("Plan unavailable"));
    }

    #[tokio::test]
    async fn selecting_unknown_plan_is_rejected_in_place() {
        let api = api_returning(vec![], None, vec![plan("starter", "Starter", 1000)]);
        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        assert!(flow.select_plan("enterprise").is_err());
        assert!(matches!(flow.state(), BillingState::PlanSelection));
    }

    #[tokio::test]
    async fn plan_selection_cannot_be_skipped() {
        let api = api_returning(vec![], Some(active_subscription()), vec![]);
        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        // overview -> payment directly is not a defined transition
        assert!(flow.continue_to_paypal().await.is_err());
        assert!(flow.complete_payment().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn growth_plan_end_to_end() {
        let mut api = api_returning(vec![], None, vec![plan("growth", "Growth", 3000)]);
        api.expect_create_subscription()
            .with(eq(CreateSubscriptionRequest {
                price_id: "price_growth_monthly".to_string(),
                plan_name: "Growth".to_string(),
            }))
            .times(1)
            .returning(|_| {
                Ok(PaypalSubscriptionData {
                    subscription_id: "sub_123".to_string(),
                    approval_url: "https://paypal.test/approve".to_string(),
                    status: None,
                    plan_name: Some("Growth".to_string()),
                    amount: Some(3000),
                })
            });

        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        assert!(matches!(flow.state(), BillingState::PlanSelection));

        flow.select_plan("growth").unwrap();
        match flow.state() {
            BillingState::PlanDetails { plan } => {
                assert_eq!(plan.price, 3000);
                assert_eq!(plan.name, "Growth");
            }
            other => panic!("unexpected state: {other:?}"),
        }

        flow.continue_to_paypal().await.unwrap();
        match flow.state() {
            BillingState::Payment { subscription, .. } => {
                assert_eq!(subscription.subscription_id, "sub_123");
                assert_eq!(
                    subscription.approval_url,
                    "https://paypal.test/approve"
                );
            }
            other => panic!("unexpected state: {other:?}"),
        }

        flow.complete_payment().unwrap();
        assert!(matches!(flow.state(), BillingState::Success));

        // the success screen holds for the redirect delay, then re-fetches
        flow.settle_success().await.unwrap();
        assert!(matches!(flow.state(), BillingState::PlanSelection));
    }

    #[tokio::test(start_paused = true)]
    async fn settle_success_waits_the_configured_hold() {
        let mut api = api_returning(vec![], None, vec![plan("starter", "Starter", 1000)]);
        api.expect_create_subscription().returning(|_| {
            Ok(PaypalSubscriptionData {
                subscription_id: "sub_1".to_string(),
                approval_url: "https://paypal.test/approve".to_string(),
                status: None,
                plan_name: None,
                amount: None,
            })
        });

        let mut flow =
            BillingFlow::new(Arc::new(api)).with_success_hold(Duration::from_secs(7));
        flow.load().await.unwrap();
        flow.select_plan("starter").unwrap();
        flow.continue_to_paypal().await.unwrap();
        flow.complete_payment().unwrap();

        let started = tokio::time::Instant::now();
        flow.settle_success().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn invoice_payment_opens_modal_only_with_order_data() {
        let paid_refetch = vec![Invoice {
            status: InvoiceStatus::Paid,
            paid_at: Some("2026-08-30T12:00:00Z".to_string()),
            ..pending_invoice("inv_1", "INV-1001", 250)
        }];
        let mut api = MockBillingApi::new();
        let initial = vec![pending_invoice("inv_1", "INV-1001", 250)];
        api.expect_invoices()
            .times(1)
            .returning(move || Ok(initial.clone()));
        api.expect_current_subscription()
            .returning(|| Ok(Some(active_subscription())));
        api.expect_plans().returning(|| Ok(vec![]));
        api.expect_pay_invoice()
            .with(eq("inv_1"))
            .times(1)
            .returning(|_| {
                Ok(PaypalOrderData {
                    order_id: "ord_7".to_string(),
                    approval_url: "https://paypal.test/order".to_string(),
                    amount: 250,
                    invoice_number: Some("INV-1001".to_string()),
                    description: None,
                })
            });
        api.expect_invoices()
            .returning(move || Ok(paid_refetch.clone()));

        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        assert!(!flow.invoice_modal_open());

        flow.start_invoice_payment("inv_1").await.unwrap();
        assert!(flow.invoice_modal_open());
        assert_eq!(flow.invoice_payment().unwrap().order.order_id, "ord_7");

        flow.complete_invoice_payment().await.unwrap();
        assert!(!flow.invoice_modal_open());
        assert_eq!(flow.invoices()[0].status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn paid_invoices_cannot_be_paid_again() {
        let paid = Invoice {
            status: InvoiceStatus::Paid,
            ..pending_invoice("inv_2", "INV-1002", 100)
        };
        let api = api_returning(vec![paid], Some(active_subscription()), vec![]);
        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        assert!(flow.start_invoice_payment("inv_2").await.is_err());
        assert!(!flow.invoice_modal_open());
    }

    #[tokio::test]
    async fn cancel_refreshes_and_reports_outcome() {
        let mut api = api_returning(vec![], Some(active_subscription()), vec![]);
        api.expect_cancel_subscription()
            .with(eq(Some("too expensive".to_string())))
            .times(1)
            .returning(|_| {
                Ok(CancelOutcome {
                    message: "Cancelled at period end".to_string(),
                    cancelled_immediately: false,
                })
            });

        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        let message = flow
            .cancel_subscription(Some("too expensive".to_string()))
            .await
            .unwrap();
        assert_eq!(message, "Cancelled at period end");
    }

    #[tokio::test]
    async fn cancel_failure_is_inline_not_fatal() {
        let mut api = api_returning(vec![], Some(active_subscription()), vec![]);
        api.expect_cancel_subscription().returning(|_| {
            Err(AppError::Api {
                status: 409,
                message: "Nothing to cancel".to_string(),
            })
        });

        let mut flow = BillingFlow::new(Arc::new(api));
        flow.load().await.unwrap();
        assert!(flow.cancel_subscription(None).await.is_err());
        assert_eq!(flow.error(), Some("Nothing to cancel"));
        assert!(matches!(flow.state(), BillingState::Overview));
    }
}
