//! Cycle log
//!
//! Logged periods are append-only: the app reads the most recent ones and
//! inserts a new open-ended row each time the user registers a period.

use crate::models::{Cycle, NewCycle};
use crate::Result;
use backend_client::{BackendClient, Table};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// How many cycles the shell shows
pub const RECENT_CYCLES_LIMIT: usize = 12;

/// Note attached to periods registered from the shell
pub const REGISTERED_NOTE: &str = "Registered from the app";

/// Cycle service
pub struct CycleService {
    client: Arc<BackendClient>,
}

impl CycleService {
    /// Create a new cycle service
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    /// The user's most recent cycles, newest first
    pub async fn recent_cycles(&self, user_id: &str) -> Result<Vec<Cycle>> {
        Ok(self
            .client
            .from(Table::Cycles)
            .eq("user_id", user_id)
            .order("start_date", false)
            .limit(RECENT_CYCLES_LIMIT)
            .fetch()
            .await?)
    }

    /// Record a period starting on `start_date`
    ///
    /// Each call inserts a new row; repeated calls on the same day are not
    /// collapsed.
    pub async fn register_period(&self, user_id: &str, start_date: NaiveDate) -> Result<()> {
        let row = NewCycle {
            user_id: user_id.to_string(),
            start_date,
            notes: Some(REGISTERED_NOTE.to_string()),
        };

        self.client.from(Table::Cycles).insert(&row).await?;
        tracing::info!(user_id, %start_date, "period registered");
        Ok(())
    }

    /// Record a period starting today (UTC calendar date)
    pub async fn register_period_today(&self, user_id: &str) -> Result<()> {
        self.register_period(user_id, Utc::now().date_naive()).await
    }
}
