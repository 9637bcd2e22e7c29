//! Auth client
//!
//! Signs users in and out against the hosted auth API, keeps the current
//! session in a shared slot, persists it through a [`SessionStore`], and
//! broadcasts session changes to subscribers.
//!
//! # Example
//!
//! ```rust,no_run
//! use backend_client::{BackendClient, BackendConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::new(BackendConfig::from_env()?)?;
//!
//!     let _subscription = client.auth().on_auth_state_change(|event, session| {
//!         println!("{:?}: {:?}", event, session.map(|s| &s.user.id));
//!     });
//!
//!     client.auth().sign_in_with_password("ana@example.com", "secret1").await?;
//!     Ok(())
//! }
//! ```

use crate::rest::{BackendError, RestClient, RestRequest};
use crate::session::{Session, SessionStore, SessionStoreError, User};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;

/// Fallback shown when the provider gave no usable message
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur during auth operations
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error reported by the auth API
    #[error("Auth API error: {0}")]
    Backend(#[from] BackendError),

    /// Operation needs a session and there is none
    #[error("No active session - please sign in first")]
    NoSession,

    /// Session persistence failed
    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),

    /// Request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthError {
    /// Single-line message suitable for showing inline next to a form
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Backend(e) if !e.message().is_empty() => e.message().to_string(),
            AuthError::NoSession => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Session change events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    /// A persisted session was restored
    InitialSession,
    /// A new session was created (sign-in or sign-up)
    SignedIn,
    /// The session was cleared
    SignedOut,
    /// The access token was refreshed
    TokenRefreshed,
}

/// Callback invoked on session changes
pub type AuthCallback = Arc<dyn Fn(AuthChangeEvent, Option<&Session>) + Send + Sync>;

type Subscribers = Mutex<Vec<(u64, AuthCallback)>>;

/// Handle to a session-change subscription
///
/// The callback stays registered until this handle is dropped or
/// [`Subscription::unsubscribe`] is called.
pub struct Subscription {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    /// Stop receiving events
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Email/password credentials
#[derive(Debug, Clone, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// Sign-up request body
#[derive(Debug, Clone, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: serde_json::Value,
}

/// Refresh request body
#[derive(Debug, Clone, Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Sign-up answers with a full session, or only the user when the project
/// requires email confirmation first.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(User),
}

/// Result of a successful sign-up
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    /// The created user
    pub user: User,
    /// The new session, absent while email confirmation is pending
    pub session: Option<Session>,
}

/// Client for the hosted auth API
pub struct AuthClient {
    rest: RestClient,
    session: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn SessionStore>,
    subscribers: Arc<Subscribers>,
    next_id: AtomicU64,
}

impl AuthClient {
    /// Create an auth client sharing `session` with the table client
    pub fn new(
        rest: RestClient,
        session: Arc<RwLock<Option<Session>>>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            rest,
            session,
            store,
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to session changes
    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, Arc::new(callback)));
        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn notify(&self, event: AuthChangeEvent, session: Option<&Session>) {
        // Snapshot so callbacks may subscribe or unsubscribe without deadlocking
        let callbacks: Vec<AuthCallback> =
            self.subscribers.lock().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            callback(event, session);
        }
    }

    /// The in-memory session, without touching the store or the network
    pub fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// The current user, if signed in
    pub fn current_user(&self) -> Option<User> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    async fn install(&self, session: Session, event: AuthChangeEvent) -> Session {
        let session = session.stamped();
        *self.session.write() = Some(session.clone());

        if let Err(e) = self.store.save(&session).await {
            tracing::warn!("Failed to persist session: {}", e);
        }

        self.notify(event, Some(&session));
        session
    }

    /// Sign in with email and password
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let request = RestRequest::post("/auth/v1/token")
            .param("grant_type", "password")
            .json_body(&PasswordGrant { email, password })?;

        let session: Session = self.rest.execute(request).await?.data;
        tracing::info!(user_id = %session.user.id, "signed in");

        Ok(self.install(session, AuthChangeEvent::SignedIn).await)
    }

    /// Create an account; `name` lands in the user's metadata
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpOutcome> {
        let request = RestRequest::post("/auth/v1/signup").json_body(&SignUpRequest {
            email,
            password,
            data: serde_json::json!({ "name": name }),
        })?;

        let response: SignUpResponse = self.rest.execute(request).await?.data;

        match response {
            SignUpResponse::Session(session) => {
                tracing::info!(user_id = %session.user.id, "signed up");
                let session = self.install(session, AuthChangeEvent::SignedIn).await;
                Ok(SignUpOutcome {
                    user: session.user.clone(),
                    session: Some(session),
                })
            }
            SignUpResponse::User(user) => {
                tracing::info!(user_id = %user.id, "signed up, confirmation pending");
                Ok(SignUpOutcome { user, session: None })
            }
        }
    }

    /// Exchange the refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session> {
        let refresh_token = self
            .session
            .read()
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(AuthError::NoSession)?;

        self.refresh_with(&refresh_token).await
    }

    async fn refresh_with(&self, refresh_token: &str) -> Result<Session> {
        let request = RestRequest::post("/auth/v1/token")
            .param("grant_type", "refresh_token")
            .json_body(&RefreshGrant { refresh_token })?;

        let session: Session = self.rest.execute(request).await?.data;
        tracing::debug!(user_id = %session.user.id, "session refreshed");

        Ok(self.install(session, AuthChangeEvent::TokenRefreshed).await)
    }

    /// Current session, restoring it from the store and refreshing it if expired
    pub async fn get_session(&self) -> Result<Option<Session>> {
        let in_memory = self.session.read().clone();
        if let Some(session) = in_memory {
            if !session.is_expired() {
                return Ok(Some(session));
            }
            return self.refresh_with(&session.refresh_token).await.map(Some);
        }

        let Some(stored) = self.store.load().await? else {
            return Ok(None);
        };

        if !stored.is_expired() {
            *self.session.write() = Some(stored.clone());
            self.notify(AuthChangeEvent::InitialSession, Some(&stored));
            return Ok(Some(stored));
        }

        match self.refresh_with(&stored.refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(AuthError::Backend(e)) if !e.is_network_error() => {
                tracing::warn!("Stored session could not be refreshed: {}", e);
                self.store.clear().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Sign out, clearing the remote and local session
    ///
    /// A session the service no longer knows (401/403/404) counts as signed out.
    pub async fn sign_out(&self) -> Result<()> {
        let access_token = self.session.read().as_ref().map(|s| s.access_token.clone());

        if let Some(token) = access_token {
            let request = RestRequest::post("/auth/v1/logout").bearer(Some(token));
            match self.rest.execute_empty(request).await {
                Ok(_) => {}
                Err(e) if matches!(e.status(), 401 | 403 | 404) => {
                    tracing::debug!("Session already gone remotely: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        *self.session.write() = None;
        self.store.clear().await?;
        tracing::info!("signed out");

        self.notify(AuthChangeEvent::SignedOut, None);
        Ok(())
    }
}
