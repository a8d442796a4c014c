use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration for the dashboard client.
///
/// Holds the backend base URL, PayPal client settings, logging preferences
/// and the timing knobs used by the billing and auth flows. Everything is
/// sourced from environment variables once at startup.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// Base URL of the agency backend API.
    pub api_base_url: String,
    /// Configuration for the PayPal JS-SDK/approval integration.
    pub paypal: PaypalConfig,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Message feed polling interval in seconds.
    pub message_poll_secs: u64,
    /// Notification polling interval in seconds.
    pub notification_poll_secs: u64,
    /// Seconds the billing flow stays on the success screen before
    /// returning to the overview.
    pub success_redirect_secs: u64,
    /// Cooldown between verification-code resends, in seconds.
    pub resend_cooldown_secs: u64,
}

#[derive(Clone, Debug)]
/// PayPal integration settings.
///
/// The client never talks to PayPal's REST API directly for money movement;
/// approval handles are server-issued and capture happens server-side. This
/// only identifies the SDK and the approval endpoints.
pub struct PaypalConfig {
    /// Client ID used when loading the PayPal SDK.
    pub client_id: String,
    /// Base URL of the SDK script host.
    pub sdk_base_url: String,
    /// Base URL of the backend endpoints that approve/capture payments.
    pub approval_base_url: String,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Required:
    /// - `ENVIRONMENT`: "development" or "production"
    /// - `API_BASE_URL`: base URL of the backend API
    ///
    /// Optional (with defaults):
    /// - `PAYPAL_CLIENT_ID` (default: empty, SDK load fails loudly later)
    /// - `PAYPAL_SDK_BASE_URL` (default: "https://www.paypal.com")
    /// - `PAYPAL_APPROVAL_BASE_URL` (default: the API base URL)
    /// - `ENABLE_CONSOLE_LOGGING` (default: true)
    /// - `MESSAGE_POLL_SECS` (default: 5)
    /// - `NOTIFICATION_POLL_SECS` (default: 30)
    /// - `SUCCESS_REDIRECT_SECS` (default: 2)
    /// - `RESEND_COOLDOWN_SECS` (default: 60)
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL").expect("API_BASE_URL must be set");

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            paypal: PaypalConfig {
                client_id: env::var("PAYPAL_CLIENT_ID").unwrap_or_default(),
                sdk_base_url: env::var("PAYPAL_SDK_BASE_URL")
                    .unwrap_or_else(|_| "https://www.paypal.com".to_string()),
                approval_base_url: env::var("PAYPAL_APPROVAL_BASE_URL")
                    .unwrap_or_else(|_| api_base_url.clone()),
            },
            api_base_url,
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            message_poll_secs: env_u64("MESSAGE_POLL_SECS", 5),
            notification_poll_secs: env_u64("NOTIFICATION_POLL_SECS", 30),
            success_redirect_secs: env_u64("SUCCESS_REDIRECT_SECS", 2),
            resend_cooldown_secs: env_u64("RESEND_COOLDOWN_SECS", 60),
        })
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
