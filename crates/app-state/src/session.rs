//! Process-wide session state
//!
//! [`SessionState`] follows the auth provider's session-change stream and
//! exposes the signed-in user, a loading flag and the last error. When the
//! backend credentials are missing it settles into a permanent error state
//! without touching the network.

use crate::{Result, StateError};
use app_core::Route;
use backend_client::config::Result as ConfigResult;
use backend_client::{
    AuthChangeEvent, BackendClient, BackendConfig, ConfigError, Subscription, User,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// Point-in-time view of the session state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// Signed-in user
    pub user: Option<User>,
    /// Whether the initial session restore is still running
    pub loading: bool,
    /// Last error, shown inline
    pub error: Option<String>,
}

/// Reactive session state
///
/// Dropping the state ends its subscription to session changes.
pub struct SessionState {
    client: Option<Arc<BackendClient>>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    subscription: Option<Subscription>,
}

impl SessionState {
    /// Build from the environment configuration
    pub async fn from_env() -> Self {
        Self::from_config(BackendConfig::from_env()).await
    }

    /// Build from a configuration lookup result
    pub async fn from_config(config: ConfigResult<BackendConfig>) -> Self {
        let config = match config {
            Ok(config) if config.is_configured() => config,
            Ok(_) => return Self::failed(ConfigError::NotConfigured.into()),
            Err(e) => return Self::failed(e.into()),
        };

        match BackendClient::new(config) {
            Ok(client) => Self::start(Arc::new(client)).await,
            Err(e) => Self::failed(e.into()),
        }
    }

    /// State that never leaves its error
    pub fn failed(error: StateError) -> Self {
        tracing::error!("Session unavailable: {}", error);
        Self {
            client: None,
            snapshot: Arc::new(RwLock::new(SessionSnapshot {
                user: None,
                loading: false,
                error: Some(error.user_message()),
            })),
            subscription: None,
        }
    }

    /// Subscribe to session changes, then restore the current session
    pub async fn start(client: Arc<BackendClient>) -> Self {
        let snapshot = Arc::new(RwLock::new(SessionSnapshot {
            loading: true,
            ..Default::default()
        }));

        let slot = snapshot.clone();
        let subscription = client.auth().on_auth_state_change(move |event, session| {
            let mut state = slot.write();
            state.user = session.map(|s| s.user.clone());
            state.loading = false;
            if event == AuthChangeEvent::SignedOut {
                state.error = None;
            }
        });

        let restored = client.auth().get_session().await;
        {
            let mut state = snapshot.write();
            match restored {
                Ok(session) => state.user = session.map(|s| s.user),
                Err(e) => {
                    tracing::error!("Failed to restore session: {}", e);
                    state.error = Some(e.user_message());
                }
            }
            state.loading = false;
        }

        Self {
            client: Some(client),
            snapshot,
            subscription: Some(subscription),
        }
    }

    /// The backend client, absent when unconfigured
    pub fn client(&self) -> Option<Arc<BackendClient>> {
        self.client.clone()
    }

    /// Whether a backend client is available
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().clone()
    }

    /// Signed-in user
    pub fn user(&self) -> Option<User> {
        self.snapshot.read().user.clone()
    }

    /// Whether the session is still being restored
    pub fn is_loading(&self) -> bool {
        self.snapshot.read().loading
    }

    /// Last error
    pub fn error(&self) -> Option<String> {
        self.snapshot.read().error.clone()
    }

    /// Whether this state still listens to session changes
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Sign out and return the auth route
    ///
    /// On failure the error is kept and no route is returned.
    pub async fn sign_out(&self) -> Option<Route> {
        let client = self.client.as_ref()?;

        match client.auth().sign_out().await {
            Ok(()) => Some(Route::Auth),
            Err(e) => {
                tracing::error!("Failed to sign out: {}", e);
                self.snapshot.write().error = Some(e.user_message());
                None
            }
        }
    }

    /// Surface `result`'s error, if any, in the state
    pub fn record<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.snapshot.write().error = Some(e.user_message());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_is_permanent_error() {
        let state = SessionState::from_config(Err(ConfigError::NotConfigured)).await;

        assert!(!state.is_configured());
        assert!(!state.is_loading());
        assert!(!state.is_subscribed());
        assert!(state.error().unwrap().contains("LUNA_BACKEND_URL"));
        assert_eq!(state.sign_out().await, None);
    }

    #[tokio::test]
    async fn test_blank_config_is_permanent_error() {
        let state = SessionState::from_config(Ok(BackendConfig::new("", ""))).await;

        assert!(state.client().is_none());
        assert!(state.user().is_none());
        assert!(state.snapshot().error.is_some());
    }

    #[test]
    fn test_record_keeps_error() {
        let state = SessionState::failed(ConfigError::NotConfigured.into());
        let value: Option<u8> = state.record(Err(app_core::CoreError::NoSession.into()));

        assert_eq!(value, None);
        assert_eq!(state.error().as_deref(), Some("No active session"));
        assert_eq!(state.record(Ok(3)), Some(3));
    }
}
