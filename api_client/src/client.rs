use common::env_config::Config;
use common::error::{AppError, Res};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::dtos::auth::{AuthResponse, LoginRequest, User};
use crate::envelope::ListEnvelope;

/// Typed HTTP client for the agency backend.
///
/// Carries the bearer token as immutable state: `login` returns a new
/// authenticated client, `logout` returns an anonymous one. Every endpoint
/// method lives in `endpoints/` grouped by concern.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Res<Self> {
        // Url::join treats a base without a trailing slash as a file path
        // and would drop its last segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Ok(ApiClient {
            http: reqwest::Client::new(),
            base_url: Url::parse(&normalized)?,
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Res<Self> {
        Self::new(&config.api_base_url)
    }

    /// Restores an authenticated client from a previously stored token.
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Authenticates with email/password. Returns a new client carrying the
    /// issued token together with the server's user record; `self` stays
    /// anonymous.
    pub async fn login(&self, email: &str, password: &str) -> Res<(ApiClient, User)> {
        let resp: AuthResponse = self
            .post(
                "auth/login/",
                &LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        let authed = self.clone().with_token(resp.token);
        Ok((authed, resp.user))
    }

    /// Drops the token. The server keeps no client-visible session state, so
    /// logout is purely local.
    pub fn logout(&self) -> ApiClient {
        let mut client = self.clone();
        client.token = None;
        client
    }

    fn url(&self, path: &str) -> Res<Url> {
        self.base_url.join(path).map_err(AppError::from)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.header("Authorization", format!("Token {}", token)),
            None => req,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Res<T> {
        let req = self.authorize(self.http.get(self.url(path)?));
        Self::decode(req.send().await?).await
    }

    /// GET for list endpoints: unwraps either a DRF `{results, next,
    /// previous}` envelope or a bare array.
    pub(crate) async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Res<Vec<T>> {
        let envelope: ListEnvelope<T> = self.get(path).await?;
        Ok(envelope.into_items())
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Res<T> {
        let req = self.authorize(self.http.post(self.url(path)?).json(body));
        Self::decode(req.send().await?).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Res<T> {
        let req = self.authorize(self.http.patch(self.url(path)?).json(body));
        Self::decode(req.send().await?).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Res<T> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(AppError::from_status(
                status.as_u16(),
                extract_error_message(status.as_u16(), &body),
            ));
        }

        serde_json::from_str(&body).map_err(AppError::from)
    }
}

/// Pulls the server-asserted message out of an error body. The backend is
/// inconsistent about the key it uses (`error`, `detail` or `message`), so
/// all three are probed before falling back to a generic string.
pub fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    format!("Request failed with status {}", status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_error_key() {
        let body = r#"{"error": "Plan not found", "detail": "other"}"#;
        assert_eq!(extract_error_message(404, body), "Plan not found");
    }

    #[test]
    fn error_message_falls_back_to_detail_then_message() {
        assert_eq!(
            extract_error_message(400, r#"{"detail": "Bad input"}"#),
            "Bad input"
        );
        assert_eq!(
            extract_error_message(400, r#"{"message": "Nope"}"#),
            "Nope"
        );
    }

    #[test]
    fn error_message_generic_for_non_json() {
        assert_eq!(
            extract_error_message(502, "<html>bad gateway</html>"),
            "Request failed with status 502"
        );
    }

    #[test]
    fn logout_drops_token() {
        let client = ApiClient::new("http://localhost:8000/")
            .unwrap()
            .with_token("t0k3n".to_string());
        assert!(client.is_authenticated());
        assert!(!client.logout().is_authenticated());
    }
}
