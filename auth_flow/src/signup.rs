use std::sync::Arc;

use async_trait::async_trait;
use common::error::{AppError, Res};

use api_client::ApiClient;
use api_client::dtos::auth::{AuthResponse, User};

use crate::cooldown::ResendCooldown;
use crate::validate;

/// Auth endpoints the signup flow depends on, as a seam for tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, name: &str, email: &str) -> Res<User>;
    async fn set_password(&self, email: &str, password: &str) -> Res<()>;
    async fn verify_email(&self, email: &str, code: &str) -> Res<AuthResponse>;
    async fn resend_code(&self, email: &str) -> Res<()>;
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn register(&self, name: &str, email: &str) -> Res<User> {
        ApiClient::register(self, name, email).await
    }

    async fn set_password(&self, email: &str, password: &str) -> Res<()> {
        ApiClient::set_password(self, email, password).await?;
        Ok(())
    }

    async fn verify_email(&self, email: &str, code: &str) -> Res<AuthResponse> {
        ApiClient::verify_email(self, email, code).await
    }

    async fn resend_code(&self, email: &str) -> Res<()> {
        ApiClient::resend_verification_code(self, email).await?;
        Ok(())
    }
}

/// Signup steps as a tagged union: a step only exists together with the data
/// collected before it, so jumping ahead is unrepresentable.
#[derive(Debug, Clone)]
pub enum SignupState {
    BasicInfo,
    Password { name: String, email: String },
    Verification { name: String, email: String },
    Complete { user: User },
}

pub struct SignupFlow<A: AuthApi> {
    api: Arc<A>,
    state: SignupState,
    error: Option<String>,
    cooldown: ResendCooldown,
}

impl<A: AuthApi> SignupFlow<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_cooldown_window(api, 60)
    }

    pub fn with_cooldown_window(api: Arc<A>, cooldown_secs: u32) -> Self {
        SignupFlow {
            api,
            state: SignupState::BasicInfo,
            error: None,
            cooldown: ResendCooldown::new(cooldown_secs),
        }
    }

    /// Step 1: name and email. Validation failures never reach the network.
    pub async fn submit_basic_info(&mut self, name: &str, email: &str) -> Res<()> {
        if !matches!(self.state, SignupState::BasicInfo) {
            return Err(AppError::Validation("Not on the basic-info step".to_string()));
        }
        validate::validate_required(name, "Name")?;
        validate::validate_email(email)?;

        match self.api.register(name.trim(), email.trim()).await {
            Ok(_) => {
                self.state = SignupState::Password {
                    name: name.trim().to_string(),
                    email: email.trim().to_string(),
                };
                self.error = None;
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Step 2: password with confirmation.
    pub async fn submit_password(&mut self, password: &str, confirmation: &str) -> Res<()> {
        let (name, email) = match &self.state {
            SignupState::Password { name, email } => (name.clone(), email.clone()),
            _ => return Err(AppError::Validation("Not on the password step".to_string())),
        };
        validate::validate_password(password, confirmation)?;

        match self.api.set_password(&email, password).await {
            Ok(()) => {
                self.state = SignupState::Verification { name, email };
                self.error = None;
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Step 3: the 6-digit emailed code. On success the server issues the
    /// session token, returned to the caller for storage.
    pub async fn submit_code(&mut self, code: &str) -> Res<AuthResponse> {
        let email = match &self.state {
            SignupState::Verification { email, .. } => email.clone(),
            _ => {
                return Err(AppError::Validation(
                    "Not on the verification step".to_string(),
                ));
            }
        };
        validate::validate_code(code)?;

        match self.api.verify_email(&email, code).await {
            Ok(resp) => {
                log::info!("email verified for {}", email);
                self.state = SignupState::Complete {
                    user: resp.user.clone(),
                };
                self.error = None;
                Ok(resp)
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Resends the code unless the cooldown is still running.
    pub async fn resend_code(&mut self) -> Res<()> {
        let email = match &self.state {
            SignupState::Verification { email, .. } => email.clone(),
            _ => {
                return Err(AppError::Validation(
                    "Not on the verification step".to_string(),
                ));
            }
        };
        if self.cooldown.is_active() {
            return Err(AppError::Validation(format!(
                "Please wait {} seconds before resending",
                self.cooldown.remaining()
            )));
        }

        self.api.resend_code(&email).await?;
        self.cooldown.start();
        Ok(())
    }

    /// Explicit back-navigation; the only way to revisit an earlier step.
    pub fn back(&mut self) {
        self.state = match &self.state {
            SignupState::Password { .. } => SignupState::BasicInfo,
            SignupState::Verification { name, email } => SignupState::Password {
                name: name.clone(),
                email: email.clone(),
            },
            SignupState::BasicInfo => SignupState::BasicInfo,
            SignupState::Complete { user } => SignupState::Complete { user: user.clone() },
        };
        self.error = None;
    }

    pub fn state(&self) -> &SignupState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cooldown(&mut self) -> &mut ResendCooldown {
        &mut self.cooldown
    }

    fn fail(&mut self, e: AppError) -> Res<()> {
        self.error = Some(e.user_message());
        Err(e)
    }
}
