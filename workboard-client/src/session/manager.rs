//! Session lifecycle
//!
//! [`SessionManager`] owns every transition of the shared
//! [`SessionContext`]:
//!
//! ```text
//! anonymous --login/signup--> authenticated --logout/expire--> anonymous
//!     ^                            |
//!     +------ restore (401) -------+
//! ```
//!
//! The token and last-known profile are written to the [`TokenStore`] so a
//! restart can resume the session with [`SessionManager::restore_session`].
//!
//! # Example
//!
//! ```no_run
//! # use workboard_client::session::SessionManager;
//! # async fn example(session: SessionManager) -> Result<(), Box<dyn std::error::Error>> {
//! let user = session.login("ada", "secret").await?;
//! println!("Logged in as {}", user.username);
//! session.logout().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use validator::Validate;
use workboard_shared::auth::token::SessionToken;
use workboard_shared::models::user::{LoginRequest, SignupRequest, User};
use workboard_shared::validation::FieldErrors;

use super::store::{PersistedSession, TokenStore};
use super::{BackendStatus, SessionContext};
use crate::api::BoardsApi;
use crate::error::{ClientError, UNREACHABLE_MESSAGE};
use crate::notify::Notifier;

/// Error type for authentication flows
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// Backend could not be reached
    #[error("{}", UNREACHABLE_MESSAGE)]
    NetworkUnreachable,

    /// Credentials rejected
    #[error("{0}")]
    InvalidCredentials(String),

    /// Signup input rejected, per field
    #[error("{0}")]
    Validation(FieldErrors),

    /// Any other backend failure
    #[error(transparent)]
    Api(ClientError),
}

/// Result of resuming a persisted session at startup
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// Nothing was persisted
    NoSession,

    /// The token is valid and the user was resolved
    Authenticated(User),

    /// The token was rejected and has been cleared
    Expired,

    /// The backend was unreachable; the token and persisted profile are kept
    Offline(Option<User>),

    /// The identity endpoint failed otherwise; the token and persisted profile are kept
    Unverified(Option<User>),
}

/// Performs authentication flows and owns session state
pub struct SessionManager {
    api: Arc<dyn BoardsApi>,
    store: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    context: SessionContext,
    restore_timeout: Duration,
}

impl SessionManager {
    /// Creates a manager
    ///
    /// # Arguments
    ///
    /// * `api` - Backend client reading its token from `context`
    /// * `store` - Durable session storage
    /// * `notifier` - Receives login/signup/logout messages
    /// * `context` - Shared session state
    /// * `restore_timeout` - Bound on the startup identity check
    pub fn new(
        api: Arc<dyn BoardsApi>,
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        context: SessionContext,
        restore_timeout: Duration,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            context,
            restore_timeout,
        }
    }

    /// Shared session state
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Current user, if known
    pub fn current_user(&self) -> Option<User> {
        self.context.user()
    }

    /// Returns true when a token is held
    pub fn is_authenticated(&self) -> bool {
        self.context.is_authenticated()
    }

    /// Authenticates with username and password
    ///
    /// Any previously held token is dropped before the request is sent.
    ///
    /// # Errors
    ///
    /// - `AuthError::NetworkUnreachable` if the backend cannot be reached
    /// - `AuthError::InvalidCredentials` if input is blank or the backend rejects it
    /// - `AuthError::Api` for other failures
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let request = LoginRequest::new(username, password);
        if let Err(e) = request.validate() {
            let errors = FieldErrors::from(e);
            let message = errors.first_message().unwrap_or("Invalid credentials");
            return Err(AuthError::InvalidCredentials(message.to_string()));
        }

        self.clear_local();

        match self.api.login(&request).await {
            Ok(response) => {
                let token = response.token.clone().ok_or_else(|| {
                    AuthError::Api(ClientError::Decode(
                        "login response carried no token".to_string(),
                    ))
                })?;
                let user = response.user();

                self.establish(SessionToken::new(token), user.clone());
                self.context.set_backend(BackendStatus::Online);

                tracing::info!(user_id = user.id, username = %user.username, "Logged in");
                self.notifier.success("Login successful!");
                Ok(user)
            }
            Err(ClientError::NetworkUnreachable(reason)) => {
                tracing::warn!(%reason, "Login failed: backend unreachable");
                self.context.set_backend(BackendStatus::Offline);
                Err(AuthError::NetworkUnreachable)
            }
            Err(ClientError::Unauthorized(message)) | Err(ClientError::Forbidden(message)) => {
                Err(AuthError::InvalidCredentials(message))
            }
            Err(ClientError::Validation(errors)) => {
                Err(AuthError::InvalidCredentials(errors.summary()))
            }
            Err(other) => Err(AuthError::Api(other)),
        }
    }

    /// Creates an account
    ///
    /// Returns the new user when the backend also issued a token (the session
    /// is then authenticated), or `None` when the user must log in.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` for client-side or backend field errors
    /// - `AuthError::NetworkUnreachable` if the backend cannot be reached
    /// - `AuthError::Api` for other failures
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let request = SignupRequest::new(username, email, password);
        request
            .validate()
            .map_err(|e| AuthError::Validation(e.into()))?;

        match self.api.signup(&request).await {
            Ok(response) => {
                let user = response.user();
                let authenticated = match response.token {
                    Some(token) => {
                        self.establish(SessionToken::new(token), user.clone());
                        self.context.set_backend(BackendStatus::Online);
                        Some(user)
                    }
                    None => None,
                };

                tracing::info!(username = %request.username, auto_login = authenticated.is_some(), "Account created");
                self.notifier.success("Account created successfully!");
                Ok(authenticated)
            }
            Err(ClientError::NetworkUnreachable(reason)) => {
                tracing::warn!(%reason, "Signup failed: backend unreachable");
                self.context.set_backend(BackendStatus::Offline);
                Err(AuthError::NetworkUnreachable)
            }
            Err(ClientError::Validation(errors)) => Err(AuthError::Validation(errors)),
            Err(other) => Err(AuthError::Api(other)),
        }
    }

    /// Ends the session
    ///
    /// The server is told on a best-effort basis; local state is cleared
    /// whatever it answers.
    pub async fn logout(&self) {
        if self.context.is_authenticated() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }

        self.clear_local();
        tracing::info!("Logged out");
        self.notifier.success("Logged out successfully");
    }

    /// Resumes a persisted session
    ///
    /// The persisted profile is adopted immediately; `GET /users/me/` then
    /// confirms it within the restore timeout.
    pub async fn restore_session(&self) -> RestoreOutcome {
        let persisted = match self.store.load() {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return RestoreOutcome::NoSession,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read persisted session");
                return RestoreOutcome::NoSession;
            }
        };

        let PersistedSession { token, user } = persisted;
        self.context.establish(token.clone(), user.clone());

        let lookup = tokio::time::timeout(self.restore_timeout, self.api.current_user()).await;

        match lookup {
            Ok(Ok(current)) => {
                self.context.set_user(current.clone());
                self.context.set_backend(BackendStatus::Online);
                self.persist(&PersistedSession {
                    token,
                    user: Some(current.clone()),
                });
                tracing::info!(user_id = current.id, "Session restored");
                RestoreOutcome::Authenticated(current)
            }
            Ok(Err(ClientError::Unauthorized(_))) => {
                tracing::info!("Persisted token rejected, clearing session");
                self.context.set_backend(BackendStatus::Online);
                self.clear_local();
                RestoreOutcome::Expired
            }
            Ok(Err(ClientError::NetworkUnreachable(reason))) => {
                tracing::warn!(%reason, "Backend unreachable, keeping persisted session");
                self.context.set_backend(BackendStatus::Offline);
                RestoreOutcome::Offline(user)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.restore_timeout.as_secs(),
                    "Identity check timed out, keeping persisted session"
                );
                self.context.set_backend(BackendStatus::Offline);
                RestoreOutcome::Offline(user)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Could not resolve current user, keeping persisted profile");
                self.context.set_backend(BackendStatus::Online);
                RestoreOutcome::Unverified(user)
            }
        }
    }

    /// Checks backend reachability and records the result
    ///
    /// Any HTTP answer, even an error status, counts as online.
    pub async fn check_backend(&self) -> BackendStatus {
        self.context.set_backend(BackendStatus::Checking);

        let status = match self.api.ping().await {
            Ok(()) => BackendStatus::Online,
            Err(e) if e.is_network() => {
                tracing::warn!(error = %e, "Backend unreachable");
                BackendStatus::Offline
            }
            Err(_) => BackendStatus::Online,
        };

        self.context.set_backend(status);
        status
    }

    /// Drops a session the backend no longer accepts
    pub fn expire(&self) {
        if !self.context.is_authenticated() {
            return;
        }

        tracing::info!("Session expired");
        self.clear_local();
        self.notifier
            .error("Your session has expired. Please log in again.");
    }

    fn establish(&self, token: SessionToken, user: User) {
        self.context.establish(token.clone(), Some(user.clone()));
        self.persist(&PersistedSession {
            token,
            user: Some(user),
        });
    }

    fn persist(&self, session: &PersistedSession) {
        if let Err(e) = self.store.save(session) {
            tracing::error!(error = %e, "Failed to persist session");
        }
    }

    fn clear_local(&self) {
        self.context.clear();
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear persisted session");
        }
    }
}
