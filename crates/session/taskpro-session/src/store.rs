//! The session store: who is logged in, surviving restarts.

use crate::storage::SessionStorage;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use taskpro_api_client::{ApiError, AuthApi, AuthResponse, LoginRequest, RegisterRequest, User};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Email and password are required")]
    MissingCredentials,
}

/// Read-only snapshot of the session published to consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    /// True until [`SessionStore::restore`] has run.
    pub restoring: bool,
    /// True while any login or register call is in flight.
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            restoring: true,
            loading: false,
            error: None,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// On-disk shape of the session. User and token are always written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub user: User,
    pub token: String,
}

/// Single owner of the session. Share it behind an `Arc`; readers use
/// [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe).
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
    restored: OnceCell<()>,
    in_flight: AtomicUsize,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            api,
            storage,
            state,
            restored: OnceCell::new(),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_restoring(&self) -> bool {
        self.state.borrow().restoring
    }

    /// Load the persisted session. Runs once; later calls do nothing.
    ///
    /// A record that cannot be read or decoded is erased and the session
    /// stays logged out.
    pub fn restore(&self) {
        self.restored.get_or_init(|| {
            let restored = self.read_persisted();
            let authenticated = restored.is_some();

            self.state.send_modify(|state| {
                if let Some(PersistedSession { user, token }) = restored {
                    state.user = Some(user);
                    state.token = Some(token);
                }
                state.restoring = false;
            });

            info!(authenticated, "Session restore complete");
        });
    }

    fn read_persisted(&self) -> Option<PersistedSession> {
        let raw = match self.storage.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session, discarding it");
                self.erase();
                return None;
            }
        };

        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(session) if !session.token.is_empty() => Some(session),
            Ok(_) => {
                warn!("Persisted session has an empty token, discarding it");
                self.erase();
                None
            }
            Err(e) => {
                warn!(error = %e, "Persisted session is malformed, discarding it");
                self.erase();
                None
            }
        }
    }

    /// Authenticate and persist the returned user and token.
    ///
    /// On failure the current session is left as it was and the error text is
    /// recorded in [`SessionState::error`].
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(self.fail(SessionError::MissingCredentials));
        }

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.begin_request();
        let result = self.api.login(&request).await;
        self.end_request();

        match result {
            Ok(AuthResponse { user, token }) => {
                self.persist(&user, &token);
                self.state.send_modify(|state| {
                    state.user = Some(user.clone());
                    state.token = Some(token);
                    state.loading = self.busy();
                    state.error = None;
                });
                info!(user_id = user.id, "Logged in");
                Ok(user)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Create an account. The session is not touched; the user logs in afterwards.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(self.fail(SessionError::MissingCredentials));
        }

        let request = RegisterRequest {
            name: name.trim().to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        self.begin_request();
        let result = self.api.register(&request).await;
        self.end_request();

        match result {
            Ok(created) => {
                self.state.send_modify(|state| {
                    state.loading = self.busy();
                    state.error = None;
                });
                info!(user_id = created.map(|u| u.id), "Registered account");
                Ok(())
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Forget the session and its persisted record.
    pub fn logout(&self) {
        self.clear();
        info!("Logged out");
    }

    /// Drop a session the server no longer accepts.
    pub fn invalidate(&self) {
        self.clear();
        info!("Session invalidated");
    }

    pub fn dismiss_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    fn clear(&self) {
        self.erase();
        self.state.send_modify(|state| {
            state.user = None;
            state.token = None;
            state.error = None;
        });
    }

    fn begin_request(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
    }

    fn end_request(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Read inside `send_modify` so a call starting concurrently cannot be missed.
    fn busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn fail(&self, error: SessionError) -> SessionError {
        let message = error.to_string();
        warn!(error = %message, "Session request failed");
        self.state.send_modify(|state| {
            state.loading = self.busy();
            state.error = Some(message);
        });
        error
    }

    fn persist(&self, user: &User, token: &str) {
        let record = PersistedSession {
            user: user.clone(),
            token: token.to_string(),
        };

        let result = serde_json::to_string(&record)
            .map_err(|e| e.to_string())
            .and_then(|json| self.storage.save(&json).map_err(|e| e.to_string()));

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session, it will not survive a restart");
        }
    }

    fn erase(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to erase persisted session");
        }
    }
}
