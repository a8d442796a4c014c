use std::sync::Arc;

use async_trait::async_trait;
use common::env_config::PaypalConfig;
use common::error::{AppError, Res};
use tokio::sync::OnceCell;

use api_client::dtos::billing::{PaypalOrderData, PaypalSubscriptionData};

/// Handle to the loaded PayPal SDK. Loading happens at most once per
/// process; a failed load is terminal for that mount.
#[derive(Debug, Clone)]
pub struct SdkHandle {
    pub client_id: String,
    pub sdk_url: String,
}

pub struct SdkLoader {
    config: PaypalConfig,
    cell: OnceCell<SdkHandle>,
}

impl SdkLoader {
    pub fn new(config: PaypalConfig) -> Self {
        SdkLoader {
            config,
            cell: OnceCell::new(),
        }
    }

    pub async fn load(&self) -> Res<&SdkHandle> {
        self.cell
            .get_or_try_init(|| async {
                if self.config.client_id.is_empty() {
                    return Err(AppError::Internal(
                        "PayPal SDK failed to load: missing client id".to_string(),
                    ));
                }
                let handle = SdkHandle {
                    client_id: self.config.client_id.clone(),
                    sdk_url: format!(
                        "{}/sdk/js?client-id={}",
                        self.config.sdk_base_url.trim_end_matches('/'),
                        self.config.client_id
                    ),
                };
                log::debug!("paypal sdk loaded: {}", handle.sdk_url);
                Ok(handle)
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Backend confirmation of an approved payment. Deliberately carries its own
/// HTTP client instead of going through `ApiClient`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApprovalGateway: Send + Sync {
    async fn approve_subscription(&self, subscription_id: &str) -> Res<()>;
    async fn capture_order(&self, order_id: &str) -> Res<()>;
}

pub struct HttpApprovalGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApprovalGateway {
    pub fn new(config: &PaypalConfig) -> Self {
        HttpApprovalGateway {
            http: reqwest::Client::new(),
            base_url: config.approval_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_confirmation(&self, path: &str, body: serde_json::Value) -> Res<()> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| {
                format!("Payment confirmation failed with status {}", status.as_u16())
            });
        // The server's `error` string reaches the on_error callback untouched,
        // whatever the status. No session handling here: this path carries no
        // auth token, so a 401 is just another declined confirmation.
        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ApprovalGateway for HttpApprovalGateway {
    async fn approve_subscription(&self, subscription_id: &str) -> Res<()> {
        self.post_confirmation(
            "/api/billing/approve-subscription/",
            serde_json::json!({ "subscription_id": subscription_id }),
        )
        .await
    }

    async fn capture_order(&self, order_id: &str) -> Res<()> {
        self.post_confirmation(
            "/api/billing/capture-payment/",
            serde_json::json!({ "order_id": order_id }),
        )
        .await
    }
}

/// Exactly one payment intent drives a checkout: a one-time order or a
/// subscription, never both.
#[derive(Debug, Clone)]
pub enum CheckoutIntent {
    Order(PaypalOrderData),
    Subscription(PaypalSubscriptionData),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutStatus {
    Idle,
    Processing,
    Completed,
    /// User dismissed the PayPal window. Informational, not an error.
    Cancelled,
    Failed(String),
}

type SuccessCallback = Box<dyn Fn() + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&str) + Send + Sync>;

/// One PayPal button mount. Mirrors the PayPal Buttons lifecycle: render
/// once, relay approval to the backend, report the outcome through the
/// registered callbacks.
pub struct PaypalCheckout<G: ApprovalGateway> {
    gateway: Arc<G>,
    intent: CheckoutIntent,
    description: Option<String>,
    rendered: bool,
    status: CheckoutStatus,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl<G: ApprovalGateway> PaypalCheckout<G> {
    pub fn new(gateway: Arc<G>, intent: CheckoutIntent) -> Self {
        PaypalCheckout {
            gateway,
            intent,
            description: None,
            rendered: false,
            status: CheckoutStatus::Idle,
            on_success: None,
            on_error: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn on_success(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Mounts the button. Re-renders are swallowed so repeated calls never
    /// produce a second button instance.
    pub fn render(&mut self, sdk: &SdkHandle) -> bool {
        if self.rendered {
            log::warn!("paypal button already rendered, ignoring re-render");
            return false;
        }
        log::debug!(
            "rendering paypal button for {} (sdk client {})",
            self.intent_id(),
            sdk.client_id
        );
        self.rendered = true;
        true
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// The pre-issued server handle the button binds to; the client never
    /// creates orders or subscriptions itself.
    pub fn intent_id(&self) -> &str {
        match &self.intent {
            CheckoutIntent::Order(order) => &order.order_id,
            CheckoutIntent::Subscription(sub) => &sub.subscription_id,
        }
    }

    pub fn amount(&self) -> Option<i64> {
        match &self.intent {
            CheckoutIntent::Order(order) => Some(order.amount),
            CheckoutIntent::Subscription(sub) => sub.amount,
        }
    }

    /// The user approved in the PayPal window: relay the approval to the
    /// backend for capture/activation and report the outcome.
    pub async fn approve(&mut self) -> Res<()> {
        if !self.rendered {
            return Err(AppError::Validation(
                "Payment button is not rendered".to_string(),
            ));
        }
        self.status = CheckoutStatus::Processing;

        let result = match &self.intent {
            CheckoutIntent::Subscription(sub) => {
                self.gateway.approve_subscription(&sub.subscription_id).await
            }
            CheckoutIntent::Order(order) => self.gateway.capture_order(&order.order_id).await,
        };

        match result {
            Ok(()) => {
                self.status = CheckoutStatus::Completed;
                if let Some(callback) = &self.on_success {
                    callback();
                }
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                self.status = CheckoutStatus::Failed(message.clone());
                if let Some(callback) = &self.on_error {
                    callback(&message);
                }
                Err(e)
            }
        }
    }

    /// The user dismissed the PayPal window. Clears the processing state
    /// without reporting an error.
    pub fn cancel(&mut self) {
        self.status = CheckoutStatus::Cancelled;
        log::info!("payment cancelled by user for {}", self.intent_id());
    }

    pub fn is_processing(&self) -> bool {
        self.status == CheckoutStatus::Processing
    }

    pub fn status(&self) -> &CheckoutStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn sdk() -> SdkHandle {
        SdkHandle {
            client_id: "client-test".to_string(),
            sdk_url: "https://www.paypal.test/sdk/js?client-id=client-test".to_string(),
        }
    }

    fn subscription_intent() -> CheckoutIntent {
        CheckoutIntent::Subscription(PaypalSubscriptionData {
            subscription_id: "sub_123".to_string(),
            approval_url: "https://paypal.test/approve".to_string(),
            status: None,
            plan_name: None,
            amount: Some(3000),
        })
    }

    fn order_intent() -> CheckoutIntent {
        CheckoutIntent::Order(PaypalOrderData {
            order_id: "ord_1".to_string(),
            approval_url: "https://paypal.test/order".to_string(),
            amount: 250,
            invoice_number: Some("INV-1001".to_string()),
            description: None,
        })
    }

    #[test]
    fn render_guard_allows_a_single_button_instance() {
        let gateway = Arc::new(MockApprovalGateway::new());
        let mut checkout = PaypalCheckout::new(gateway, subscription_intent());

        assert!(checkout.render(&sdk()));
        assert!(!checkout.render(&sdk()));
        assert!(!checkout.render(&sdk()));
        assert!(checkout.is_rendered());
    }

    #[tokio::test]
    async fn subscription_approval_reports_success_once() {
        let mut gateway = MockApprovalGateway::new();
        gateway
            .expect_approve_subscription()
            .with(mockall::predicate::eq("sub_123"))
            .times(1)
            .returning(|_| Ok(()));

        let successes = Arc::new(AtomicUsize::new(0));
        let counted = successes.clone();
        let mut checkout = PaypalCheckout::new(Arc::new(gateway), subscription_intent())
            .on_success(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            })
            .on_error(|_| panic!("on_error must not fire on success"));

        checkout.render(&sdk());
        checkout.approve().await.unwrap();

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(*checkout.status(), CheckoutStatus::Completed);
    }

    #[tokio::test]
    async fn approval_error_forwards_exact_server_message() {
        let mut gateway = MockApprovalGateway::new();
        gateway.expect_approve_subscription().returning(|_| {
            Err(AppError::Api {
                status: 422,
                message: "X".to_string(),
            })
        });

        let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = errors.clone();
        let mut checkout = PaypalCheckout::new(Arc::new(gateway), subscription_intent())
            .on_success(|| panic!("on_success must not fire on failure"))
            .on_error(move |msg| {
                captured.lock().unwrap().push(msg.to_string());
            });

        checkout.render(&sdk());
        assert!(checkout.approve().await.is_err());

        assert_eq!(*errors.lock().unwrap(), vec!["X".to_string()]);
        assert_eq!(
            *checkout.status(),
            CheckoutStatus::Failed("X".to_string())
        );
    }

    #[tokio::test]
    async fn order_approval_captures_the_order() {
        let mut gateway = MockApprovalGateway::new();
        gateway
            .expect_capture_order()
            .with(mockall::predicate::eq("ord_1"))
            .times(1)
            .returning(|_| Ok(()));

        let mut checkout = PaypalCheckout::new(Arc::new(gateway), order_intent());
        checkout.render(&sdk());
        checkout.approve().await.unwrap();
        assert_eq!(*checkout.status(), CheckoutStatus::Completed);
    }

    #[test]
    fn user_cancel_is_not_an_error_and_clears_processing() {
        let gateway = Arc::new(MockApprovalGateway::new());
        let mut checkout = PaypalCheckout::new(gateway, order_intent())
            .on_error(|_| panic!("on_error must not fire on user cancel"));

        checkout.render(&sdk());
        checkout.cancel();

        assert!(!checkout.is_processing());
        assert_eq!(*checkout.status(), CheckoutStatus::Cancelled);
    }

    #[tokio::test]
    async fn approve_requires_a_rendered_button() {
        let gateway = Arc::new(MockApprovalGateway::new());
        let mut checkout = PaypalCheckout::new(gateway, order_intent());
        assert!(checkout.approve().await.is_err());
    }

    #[tokio::test]
    async fn sdk_loads_once_and_missing_client_id_is_terminal() {
        let loader = SdkLoader::new(PaypalConfig {
            client_id: "client-test".to_string(),
            sdk_base_url: "https://www.paypal.test".to_string(),
            approval_base_url: "http://localhost:8000".to_string(),
        });
        assert!(!loader.is_loaded());
        let first = loader.load().await.unwrap().sdk_url.clone();
        let second = loader.load().await.unwrap().sdk_url.clone();
        assert_eq!(first, second);
        assert!(loader.is_loaded());

        let broken = SdkLoader::new(PaypalConfig {
            client_id: String::new(),
            sdk_base_url: "https://www.paypal.test".to_string(),
            approval_base_url: "http://localhost:8000".to_string(),
        });
        assert!(broken.load().await.is_err());
    }
}
