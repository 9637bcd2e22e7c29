//! Core application logic for Luna
//!
//! This crate contains the business logic behind the three screens: auth,
//! the onboarding quiz, and the main shell's profile, cycle and community
//! data. Every service is a thin layer over [`backend_client::BackendClient`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod content;
pub mod cycles;
pub mod dev_errors;
pub mod models;
pub mod posts;
pub mod profiles;
pub mod quiz;
pub mod routes;

pub use models::{Cycle, Message, Post, Profile, QuizData, QuizSubmission};
pub use routes::{Route, Tab};

use backend_client::{AuthError, BackendError};
use thiserror::Error;

/// Error types for core services
#[derive(Debug, Error)]
pub enum CoreError {
    /// Table read or write failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Auth provider error
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// A write the user asked for could not be stored
    #[error("Failed to save data. Please try again.")]
    SaveFailed(#[source] BackendError),

    /// Input rejected before reaching the service
    #[error("{0}")]
    Validation(String),

    /// Operation needs a signed-in user
    #[error("No active session")]
    NoSession,
}

impl CoreError {
    /// Single-line message suitable for showing inline next to a form
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Backend(e) if !e.message().is_empty() => e.message().to_string(),
            CoreError::Backend(_) => backend_client::auth::GENERIC_FAILURE_MESSAGE.to_string(),
            CoreError::Auth(e) => e.user_message(),
            CoreError::SaveFailed(_) => self.to_string(),
            CoreError::Validation(msg) => msg.clone(),
            CoreError::NoSession => self.to_string(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let err = CoreError::from(BackendError::new(400, "invalid_grant", "Invalid login credentials"));
        assert_eq!(err.user_message(), "Invalid login credentials");

        let err = CoreError::from(BackendError::new(500, "", ""));
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let err = CoreError::Validation("Password must be at least 6 characters".to_string());
        assert_eq!(err.user_message(), "Password must be at least 6 characters");
    }
}
