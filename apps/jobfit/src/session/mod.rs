//! Session store, the single source of truth for "who is signed in".
//!
//! Holds the bearer token and user, persisted under `authToken` / `authUser` in
//! a [`KeyValueStore`]. The store is constructed with its storage and backend
//! and owned by whatever drives the UI; there is no global instance.
//!
//! ```text
//! Loading ──initialize──▶ Unauthenticated ──login / register──▶ Authenticated
//!        └─initialize───────────────────────────────────────────▶ Authenticated
//! Authenticated ──logout──▶ Unauthenticated
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{AuthBackend, AuthPayload};
use crate::errors::{ClientError, FieldError};
use crate::models::{Session, SkillReport, User, UserPatch};
use crate::storage::KeyValueStore;

pub mod validation;

use validation::{LoginForm, RegistrationForm};

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "authUser";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Unauthenticated,
    Authenticated,
}

/// Result of a register or login attempt. Never an `Err`: the UI only needs
/// to branch on `success` and show `error` / `field_errors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthOutcome {
    pub success: bool,
    pub user: Option<User>,
    pub error: Option<String>,
    pub field_errors: Vec<FieldError>,
}

impl AuthOutcome {
    fn succeeded(user: User) -> Self {
        Self {
            success: true,
            user: Some(user),
            ..Self::default()
        }
    }

    fn failed(err: ClientError) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(err.user_message()),
            field_errors: err.field_errors().to_vec(),
        }
    }
}

pub struct SessionStore<K> {
    kv: K,
    backend: Arc<dyn AuthBackend>,
    session: Option<Session>,
    loading: bool,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(kv: K, backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            kv,
            backend,
            session: None,
            loading: true,
        }
    }

    /// Restores a persisted session. Corrupt or unreadable state is wiped and
    /// treated as signed out; loading always finishes.
    pub fn initialize(&mut self) -> SessionStatus {
        match self.restore() {
            Ok(Some(session)) => {
                info!("Restored session for user {}", session.user.id);
                self.session = Some(session);
            }
            Ok(None) => {
                debug!("No persisted session");
                self.session = None;
            }
            Err(reason) => {
                warn!("Discarding persisted session: {reason}");
                self.clear_keys();
                self.session = None;
            }
        }
        self.loading = false;
        self.status()
    }

    fn restore(&self) -> Result<Option<Session>, String> {
        let token = self.kv.get(TOKEN_KEY).map_err(|e| e.to_string())?;
        let user = self.kv.get(USER_KEY).map_err(|e| e.to_string())?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(raw_user)) => {
                if token.trim().is_empty() {
                    return Err("empty token".to_string());
                }
                let user: User = serde_json::from_str(&raw_user)
                    .map_err(|e| format!("unparseable user: {e}"))?;
                Ok(Some(Session { token, user }))
            }
            _ => Err("token and user must be stored together".to_string()),
        }
    }

    /// Persists and activates a session. On a storage failure nothing changes
    /// in memory: the previous session's keys are written back, or any
    /// half-written keys are removed when nobody was signed in.
    pub fn login(&mut self, token: &str, user: User) -> Result<(), ClientError> {
        let raw_user = serde_json::to_string(&user)?;

        let persisted = self
            .kv
            .set(USER_KEY, &raw_user)
            .and_then(|()| self.kv.set(TOKEN_KEY, token));
        if let Err(e) = persisted {
            warn!("Could not persist session: {e}");
            self.roll_back_keys();
            return Err(e.into());
        }

        info!("Signed in as user {}", user.id);
        self.session = Some(Session {
            token: token.to_string(),
            user,
        });
        self.loading = false;
        Ok(())
    }

    /// Validates the form, registers with the backend, and signs in on success.
    pub async fn register(&mut self, form: &RegistrationForm) -> AuthOutcome {
        if let Err(errors) = form.validate() {
            return AuthOutcome::failed(ClientError::Validation(errors));
        }
        let result = self.backend.register(form).await;
        self.finish_auth(result)
    }

    /// Signs in with email and password.
    pub async fn login_with_credentials(&mut self, form: &LoginForm) -> AuthOutcome {
        if let Err(errors) = form.validate() {
            return AuthOutcome::failed(ClientError::Validation(errors));
        }
        let result = self.backend.login(form).await;
        self.finish_auth(result)
    }

    fn finish_auth(&mut self, result: Result<AuthPayload, ClientError>) -> AuthOutcome {
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Authentication failed: {e}");
                return AuthOutcome::failed(e);
            }
        };
        let user = payload.user.clone();
        match self.login(&payload.token, payload.user) {
            Ok(()) => AuthOutcome::succeeded(user),
            Err(e) => AuthOutcome::failed(e),
        }
    }

    /// Merges `patch` into the signed-in user. Returns `false` when nobody is
    /// signed in or the change could not be persisted.
    pub fn update_profile(&mut self, patch: UserPatch) -> bool {
        let Some(session) = self.session.as_ref() else {
            debug!("update_profile called without a session");
            return false;
        };

        let mut user = session.user.clone();
        user.merge(patch);

        let persisted = serde_json::to_string(&user)
            .map_err(ClientError::from)
            .and_then(|raw| self.kv.set(USER_KEY, &raw).map_err(ClientError::from));
        if let Err(e) = persisted {
            warn!("Could not persist profile update: {e}");
            return false;
        }

        if let Some(session) = self.session.as_mut() {
            session.user = user;
        }
        true
    }

    /// Always ends signed out, even if the stored keys cannot be removed.
    pub fn logout(&mut self) {
        self.clear_keys();
        if let Some(session) = self.session.take() {
            info!("Signed out user {}", session.user.id);
        }
        self.loading = false;
    }

    /// The token is written after the user, so a failed login can only have
    /// replaced the stored user.
    fn roll_back_keys(&self) {
        let Some(previous) = self.session.as_ref() else {
            self.clear_keys();
            return;
        };

        let restored = serde_json::to_string(&previous.user)
            .map_err(ClientError::from)
            .and_then(|raw| self.kv.set(USER_KEY, &raw).map_err(ClientError::from));
        if let Err(e) = restored {
            warn!("Could not restore previous session, clearing storage: {e}");
            self.clear_keys();
        }
    }

    fn clear_keys(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.kv.remove(key) {
                warn!("Failed to remove '{key}' from storage: {e}");
            }
        }
    }

    /// Missing-skill analysis for the signed-in user.
    pub async fn fetch_skills(&self) -> Result<SkillReport, ClientError> {
        let token = self.token().ok_or(ClientError::NoSession)?;
        self.backend.fetch_skills(token).await
    }

    pub fn status(&self) -> SessionStatus {
        if self.loading {
            SessionStatus::Loading
        } else if self.session.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.session.clone()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn backend(&self) -> &Arc<dyn AuthBackend> {
        &self.backend
    }
}
