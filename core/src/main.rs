use std::sync::Arc;
use std::time::Duration;

use billing::{BillingFlow, BillingState};
use common::env_config::Config;
use common::error::AppError;

use api_client::{ApiClient, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // get env vars
    let config = Config::from_env();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    log::info!(
        "pulseboard starting ({}) against {}",
        config.environment,
        config.api_base_url
    );

    // restore a previous session if a token was provided
    let store = Arc::new(SessionStore::new());
    let client = match store.token() {
        Some(token) => ApiClient::from_config(&config)?.with_token(token),
        None => ApiClient::from_config(&config)?,
    };

    // connectivity check: the plan catalogue is public
    let plans = client.get_available_plans().await?;
    log::info!("fetched {} available plans", plans.len());
    for plan in &plans {
        log::info!("  {}: ${}/month ({} features)", plan.name, plan.price, plan.features.len());
    }

    if client.is_authenticated() {
        let mut flow = BillingFlow::new(Arc::new(client))
            .with_success_hold(Duration::from_secs(config.success_redirect_secs));
        match flow.load().await {
            Ok(()) => match flow.state() {
                BillingState::Overview => log::info!("billing: active subscription found"),
                BillingState::PlanSelection => {
                    log::info!("billing: no subscription, plan selection")
                }
                other => log::info!("billing: {:?}", other),
            },
            Err(e) if end_session_if_expired(&store, &e) => {
                log::warn!("session expired, signed out: {}", e.user_message());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// A 401 ends the session: the stored token and user are cleared so the
/// next start launches unauthenticated at the auth screen.
fn end_session_if_expired(store: &SessionStore, err: &AppError) -> bool {
    if err.is_session_expired() {
        store.clear_session();
        return true;
    }
    false
}
