//! Authentication flows for Luna
//!
//! This module provides the sign-in and sign-up flows behind the auth
//! screen: form validation, the call to the identity provider, and the
//! initial profile row written after sign-up.

use crate::models::NewProfile;
use crate::routes::Route;
use crate::{CoreError, Result};
use backend_client::{BackendClient, Table};
use std::sync::Arc;

/// Minimum password length accepted by the provider
pub const MIN_PASSWORD_LEN: usize = 6;

/// Which form the auth screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Existing account
    #[default]
    SignIn,
    /// New account
    SignUp,
}

impl AuthMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

/// Field values of the auth form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    /// Current mode
    pub mode: AuthMode,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
    /// Display name (sign-up only)
    pub name: String,
}

impl AuthForm {
    /// Empty form in sign-in mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch between sign-in and sign-up, keeping the field values
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Check the fields the way the form inputs constrain them
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(CoreError::Validation("Email is required".to_string()));
        }
        if !email.contains('@') {
            return Err(CoreError::Validation("Enter a valid email address".to_string()));
        }
        if self.password.is_empty() {
            return Err(CoreError::Validation("Password is required".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.mode == AuthMode::SignUp && self.name.trim().is_empty() {
            return Err(CoreError::Validation("Name is required".to_string()));
        }
        Ok(())
    }
}

/// Authentication service
///
/// # Example
///
/// ```rust,no_run
/// use app_core::auth::{AuthForm, AuthService};
/// use backend_client::{BackendClient, BackendConfig};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Arc::new(BackendClient::new(BackendConfig::from_env()?)?);
///     let service = AuthService::new(client);
///
///     let mut form = AuthForm::new();
///     form.email = "ana@example.com".to_string();
///     form.password = "secret1".to_string();
///
///     let route = service.submit(&form).await?;
///     println!("go to {}", route);
///     Ok(())
/// }
/// ```
pub struct AuthService {
    client: Arc<BackendClient>,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    /// Validate and submit the form in its current mode
    ///
    /// Returns the route to request next. The route guard decides whether a
    /// signed-in user actually lands on the shell or on the quiz.
    pub async fn submit(&self, form: &AuthForm) -> Result<Route> {
        form.validate()?;
        match form.mode {
            AuthMode::SignIn => self.sign_in(form.email.trim(), &form.password).await,
            AuthMode::SignUp => {
                self.sign_up(form.email.trim(), &form.password, form.name.trim())
                    .await
            }
        }
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Route> {
        self.client.auth().sign_in_with_password(email, password).await?;
        Ok(Route::Home)
    }

    /// Create an account and its profile row
    ///
    /// The profile insert is best-effort: a failure is logged and the user
    /// still goes on to the quiz.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Route> {
        let outcome = self.client.auth().sign_up(email, password, name).await?;

        if outcome.session.is_none() {
            tracing::info!(user_id = %outcome.user.id, "sign-up awaiting email confirmation");
        }

        let profile = NewProfile::with_defaults(outcome.user.id.clone(), email, name);

        if let Err(e) = self.client.from(Table::Profiles).insert(&profile).await {
            tracing::warn!(user_id = %profile.id, "Failed to create profile: {}", e);
        }

        Ok(Route::Quiz)
    }
}
