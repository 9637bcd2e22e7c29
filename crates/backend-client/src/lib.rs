//! Hosted backend client library
//!
//! This crate provides a typed Rust client for the hosted auth + relational
//! table service that Luna runs against: the REST transport, the table query
//! builder, the auth client with its session-change stream, and session
//! persistence.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod rest;
pub mod session;
pub mod table;

pub use auth::{AuthChangeEvent, AuthClient, AuthError, Subscription};
pub use client::BackendClient;
pub use config::{BackendConfig, ConfigError};
pub use rest::{BackendError, RestClient};
pub use session::{Session, User};
pub use table::{Table, TableQuery};

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for backend operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error reported by the hosted service or the transport
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Single-line message suitable for showing inline next to a form
    pub fn user_message(&self) -> String {
        match self {
            Error::Backend(e) => e.message().to_string(),
            Error::Auth(e) => e.user_message(),
            Error::Config(e) => e.to_string(),
            Error::Json(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = Error::from(BackendError::new(400, "invalid_grant", "Invalid login credentials"));
        assert_eq!(err.user_message(), "Invalid login credentials");

        let err = Error::from(ConfigError::NotConfigured);
        assert!(err.to_string().contains("not configured"));
    }
}
