use common::error::Res;

use crate::client::ApiClient;
use crate::dtos::auth::{
    AuthResponse, MessageResponse, RegisterRequest, ResendCodeRequest, SetPasswordRequest, User,
    VerifyEmailRequest,
};

/// Signup/verification endpoints. Each corresponds to one step of the
/// signup flow; `login` lives on `ApiClient` itself since it changes the
/// client's auth state.
impl ApiClient {
    /// Step 1: register the basic account record. The account stays
    /// unverified until the emailed code is confirmed.
    pub async fn register(&self, name: &str, email: &str) -> Res<User> {
        self.post(
            "auth/register/",
            &RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
            },
        )
        .await
    }

    /// Step 2: set the account password.
    pub async fn set_password(&self, email: &str, password: &str) -> Res<MessageResponse> {
        self.post(
            "auth/set-password/",
            &SetPasswordRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    /// Step 3: confirm the 6-digit emailed code. On success the account is
    /// verified and the server issues a token.
    pub async fn verify_email(&self, email: &str, code: &str) -> Res<AuthResponse> {
        self.post(
            "auth/verify-email/",
            &VerifyEmailRequest {
                email: email.to_string(),
                code: code.to_string(),
            },
        )
        .await
    }

    pub async fn resend_verification_code(&self, email: &str) -> Res<MessageResponse> {
        self.post(
            "auth/resend-code/",
            &ResendCodeRequest {
                email: email.to_string(),
            },
        )
        .await
    }
}
