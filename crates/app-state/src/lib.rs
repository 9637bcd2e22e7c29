//! Screen state for Luna
//!
//! This crate holds what each screen keeps in memory between user actions:
//! the process-wide session state, the route guard and navigator, and the
//! auth, quiz and main shell screens.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth_screen;
pub mod guard;
pub mod onboarding;
pub mod session;
pub mod shell;

pub use auth_screen::AuthScreen;
pub use guard::{CompletionCheck, Navigator, RouteGuard};
pub use onboarding::QuizScreen;
pub use session::{SessionSnapshot, SessionState};
pub use shell::MainShell;

use app_core::CoreError;
use backend_client::{AuthError, BackendError, ConfigError};

/// Screen state errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Core service error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Auth provider error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Backend client could not be built
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Backend credentials missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StateError {
    /// Single-line message suitable for showing inline
    pub fn user_message(&self) -> String {
        match self {
            StateError::Core(e) => e.user_message(),
            StateError::Auth(e) => e.user_message(),
            StateError::Backend(e) => e.message().to_string(),
            StateError::Config(e) => e.to_string(),
        }
    }
}

/// Result type for screen state operations
pub type Result<T> = std::result::Result<T, StateError>;
