//! Auth screen state

use app_core::auth::{AuthForm, AuthMode, AuthService};
use app_core::Route;
use backend_client::BackendClient;
use std::sync::Arc;

/// Sign-in / sign-up screen
pub struct AuthScreen {
    service: AuthService,
    /// Field values
    pub form: AuthForm,
    loading: bool,
    error: Option<String>,
}

impl AuthScreen {
    /// Empty screen in sign-in mode
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self {
            service: AuthService::new(client),
            form: AuthForm::new(),
            loading: false,
            error: None,
        }
    }

    /// Current mode
    pub fn mode(&self) -> AuthMode {
        self.form.mode
    }

    /// Switch between sign-in and sign-up
    pub fn toggle_mode(&mut self) {
        self.form.toggle_mode();
    }

    /// Whether a submit is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Inline error from the last submit
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit the form; returns the route to request on success
    pub async fn submit(&mut self) -> Option<Route> {
        self.loading = true;
        self.error = None;

        let result = self.service.submit(&self.form).await;
        self.loading = false;

        match result {
            Ok(route) => Some(route),
            Err(e) => {
                tracing::error!("Authentication failed: {}", e);
                self.error = Some(e.user_message());
                None
            }
        }
    }
}
