use std::collections::HashMap;
use std::sync::Mutex;

use common::error::{AppError, Res};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dtos::auth::User;

const AUTH_TOKEN_KEY: &str = "auth_token";
const USER_KEY: &str = "user";
const CART_KEY: &str = "cart";

/// Snapshot of an authenticated session. Immutable after login; logging out
/// or a 401 discards it entirely.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Key/value store for the few values that survive a screen change: the
/// auth token, the cached user record and the cart. Everything else is
/// in-memory flow state and intentionally lost on restart.
#[derive(Debug, Default)]
pub struct SessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_session(&self, session: &Session) -> Res<()> {
        self.set_raw(AUTH_TOKEN_KEY, session.token.clone());
        self.set_json(USER_KEY, &session.user)
    }

    pub fn session(&self) -> Option<Session> {
        let token = self.get_raw(AUTH_TOKEN_KEY)?;
        let user: User = self.get_json(USER_KEY).ok()??;
        Some(Session { token, user })
    }

    pub fn token(&self) -> Option<String> {
        self.get_raw(AUTH_TOKEN_KEY)
    }

    /// Clears the session keys. Called on logout and on any 401.
    pub fn clear_session(&self) {
        let mut values = self.values.lock().expect("session store poisoned");
        values.remove(AUTH_TOKEN_KEY);
        values.remove(USER_KEY);
    }

    pub fn set_cart_json<T: Serialize>(&self, cart: &T) -> Res<()> {
        self.set_json(CART_KEY, cart)
    }

    pub fn cart_json<T: DeserializeOwned>(&self) -> Res<Option<T>> {
        self.get_json(CART_KEY)
    }

    pub fn clear_cart(&self) {
        self.values
            .lock()
            .expect("session store poisoned")
            .remove(CART_KEY);
    }

    fn set_raw(&self, key: &str, value: String) {
        self.values
            .lock()
            .expect("session store poisoned")
            .insert(key.to_string(), value);
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .expect("session store poisoned")
            .get(key)
            .cloned()
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Res<()> {
        let json = serde_json::to_string(value).map_err(AppError::from)?;
        self.set_raw(key, json);
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Res<Option<T>> {
        match self.get_raw(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }
}
