//! Logged-in session: bearer token, raw user record and which dashboard to mount.

mod role;
mod store;

pub use role::{resolve_role, DashboardRole};
pub use store::{FileSessionStore, SessionStore, SessionStoreError, StoredSession};

use std::sync::{Arc, RwLock};

use secrecy::{ExposeSecret, Secret};
use serde_json::Value;

use crate::core::{id_as_string, AppError};

#[derive(Default)]
struct SessionState {
    token: Option<Secret<String>>,
    user: Option<Value>,
}

/// Shared handle passed to everything that needs an authenticated client.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionState>>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>, user: Option<Value>) -> Self {
        let context = Self::default();
        context.sign_in(token, user);
        context
    }

    pub fn restore(store: &dyn SessionStore) -> Result<Self, AppError> {
        let context = Self::default();
        if let Some(stored) = store.load().map_err(AppError::session_error)? {
            context.sign_in(stored.token, stored.user);
        }
        Ok(context)
    }

    pub fn persist(&self, store: &dyn SessionStore) -> Result<(), AppError> {
        let snapshot = {
            let state = self.read();
            state.token.as_ref().map(|token| StoredSession {
                token: token.expose_secret().clone(),
                user: state.user.clone(),
            })
        };
        match snapshot {
            Some(stored) => store.save(&stored).map_err(AppError::session_error),
            None => store.clear().map_err(AppError::session_error),
        }
    }

    pub fn sign_in(&self, token: impl Into<String>, user: Option<Value>) {
        let mut state = self.write();
        state.token = Some(Secret::new(token.into()));
        state.user = user;
    }

    pub fn sign_out(&self) {
        let mut state = self.write();
        state.token = None;
        state.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// `Authorization` header value, if signed in.
    pub fn bearer_header(&self) -> Option<String> {
        self.read()
            .token
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    pub fn user(&self) -> Option<Value> {
        self.read().user.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        let state = self.read();
        let user = state.user.as_ref()?;
        ["id", "user_id", "_id"]
            .iter()
            .find_map(|key| user.get(*key).and_then(id_as_string))
    }

    pub fn role(&self) -> Option<DashboardRole> {
        self.read().user.as_ref().and_then(resolve_role)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
