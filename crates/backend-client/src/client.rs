//! BackendClient - entry point to the hosted service
//!
//! Bundles the auth client and the table API behind one handle. Table queries
//! automatically authenticate as the signed-in user, falling back to the anon
//! key when nobody is signed in.
//!
//! # Example
//!
//! ```rust,no_run
//! use backend_client::{BackendClient, BackendConfig, Table};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::new(BackendConfig::from_env()?)?;
//!     let session = client.auth().sign_in_with_password("ana@example.com", "secret1").await?;
//!
//!     let profile: serde_json::Value = client
//!         .from(Table::Profiles)
//!         .eq("id", &session.user.id)
//!         .single()
//!         .await?;
//!     println!("{}", profile);
//!     Ok(())
//! }
//! ```

use crate::auth::AuthClient;
use crate::config::BackendConfig;
use crate::rest::{RestClient, Result};
use crate::session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
use crate::table::{Table, TableQuery};
use parking_lot::RwLock;
use std::sync::Arc;

/// Client for the hosted auth + table service
pub struct BackendClient {
    rest: RestClient,
    auth: AuthClient,
    session: Arc<RwLock<Option<Session>>>,
}

impl BackendClient {
    /// Create a client; the session is persisted if the config names a path
    pub fn new(config: BackendConfig) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match &config.session_path {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::new()),
        };
        Self::with_store(config, store)
    }

    /// Create a client with an explicit session store
    pub fn with_store(config: BackendConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let rest = RestClient::new(config)?;
        let session = Arc::new(RwLock::new(None));
        let auth = AuthClient::new(rest.clone(), session.clone(), store);

        Ok(Self { rest, auth, session })
    }

    /// The auth client
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Start a query against `table` as the current user
    pub fn from(&self, table: Table) -> TableQuery<'_> {
        let bearer = self.session.read().as_ref().map(|s| s.access_token.clone());
        TableQuery::new(&self.rest, table, bearer)
    }

    /// Get the client configuration
    pub fn config(&self) -> &BackendConfig {
        self.rest.config()
    }
}
