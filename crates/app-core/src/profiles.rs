//! Profile service
//!
//! Reads and writes the signed-in user's `profiles` row.

use crate::models::{CycleLengths, NewProfile, Profile};
use crate::{CoreError, Result};
use backend_client::{BackendClient, Table};
use serde_json::json;
use std::sync::Arc;

/// Profile service
pub struct ProfileService {
    client: Arc<BackendClient>,
}

impl ProfileService {
    /// Create a new profile service
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    /// Insert a profile row
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<()> {
        self.client.from(Table::Profiles).insert(profile).await?;
        Ok(())
    }

    /// Fetch the profile with the given id
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        Ok(self
            .client
            .from(Table::Profiles)
            .eq("id", user_id)
            .single()
            .await?)
    }

    /// Fetch the profile with the given id, `None` when no row exists
    pub async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self
            .client
            .from(Table::Profiles)
            .eq("id", user_id)
            .maybe_single()
            .await?)
    }

    /// Store new average cycle and period lengths
    pub async fn update_cycle_lengths(&self, user_id: &str, lengths: CycleLengths) -> Result<()> {
        self.client
            .from(Table::Profiles)
            .eq("id", user_id)
            .update(&lengths)
            .await?;
        Ok(())
    }

    /// Change the display name
    pub async fn update_name(&self, user_id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Name is required".to_string()));
        }

        self.client
            .from(Table::Profiles)
            .eq("id", user_id)
            .update(&json!({ "name": name }))
            .await?;
        Ok(())
    }
}
