//! Session data and persistence
//!
//! This module holds the session types issued by the auth API and the
//! [`SessionStore`] seam used to persist them between runs.
//!
//! # Example
//!
//! ```rust
//! use backend_client::session::{Session, User};
//!
//! let session = Session {
//!     access_token: "access".to_string(),
//!     refresh_token: "refresh".to_string(),
//!     token_type: "bearer".to_string(),
//!     expires_in: 3600,
//!     expires_at: Some(4_000_000_000),
//!     user: User::new("8d0c5a5e", Some("ana@example.com".to_string())),
//! };
//!
//! assert!(!session.is_expired_at(1_700_000_000));
//! ```

mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SessionStoreError};
#[cfg(test)]
pub use store::MockSessionStore;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Seconds before expiry at which a session is treated as expired
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// An authenticated user as reported by the auth API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable user id (used as foreign key in every table)
    pub id: String,

    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Free-form metadata supplied at sign-up (holds `name`)
    #[serde(default)]
    pub user_metadata: serde_json::Value,

    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    /// Create a user with no metadata
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
            user_metadata: serde_json::Value::Null,
            created_at: None,
        }
    }

    /// Display name supplied at sign-up, if any
    pub fn name(&self) -> Option<&str> {
        self.user_metadata.get("name").and_then(|v| v.as_str())
    }
}

/// An active session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Access token for authenticated requests
    pub access_token: String,

    /// Token used to obtain a new access token
    pub refresh_token: String,

    /// Token type (always "bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: i64,

    /// Unix timestamp at which the access token expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    /// The session's user
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Fill in `expires_at` from `expires_in` when the service omitted it
    pub fn stamped(mut self) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }

    /// Whether the access token is expired at the given unix time
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at - EXPIRY_MARGIN_SECS,
            None => false,
        }
    }

    /// Whether the access token is expired now
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}
