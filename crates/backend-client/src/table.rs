//! Table query builder
//!
//! Reads and writes against the hosted table API. A query is built up from
//! filters, ordering and a row cap, then finished with one of the terminal
//! operations: [`TableQuery::fetch`], [`TableQuery::single`],
//! [`TableQuery::maybe_single`], [`TableQuery::insert`] or
//! [`TableQuery::update`].
//!
//! # Example
//!
//! ```rust,no_run
//! use backend_client::{BackendClient, BackendConfig, Table};
//! use serde_json::Value;
//!
//! # async fn example(client: &BackendClient) -> Result<(), Box<dyn std::error::Error>> {
//! let cycles: Vec<Value> = client
//!     .from(Table::Cycles)
//!     .eq("user_id", "8d0c5a5e")
//!     .order("start_date", false)
//!     .limit(12)
//!     .fetch()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::rest::{BackendError, RestClient, RestRequest, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Tables known to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Per-user settings
    Profiles,
    /// Logged period starts
    Cycles,
    /// Community feed entries
    Posts,
    /// Onboarding questionnaire snapshots
    UserQuizData,
    /// Direct messages
    Messages,
}

impl Table {
    /// Table name on the service
    pub fn name(&self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Cycles => "cycles",
            Table::Posts => "posts",
            Table::UserQuizData => "user_quiz_data",
            Table::Messages => "messages",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";

/// A query against one table
#[derive(Debug, Clone)]
pub struct TableQuery<'a> {
    rest: &'a RestClient,
    table: Table,
    bearer: Option<String>,
    columns: String,
    filters: Vec<(String, String)>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
}

impl<'a> TableQuery<'a> {
    /// Start a query; `bearer` is the signed-in user's access token
    pub fn new(rest: &'a RestClient, table: Table, bearer: Option<String>) -> Self {
        Self {
            rest,
            table,
            bearer,
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Columns to return (defaults to `*`)
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Keep rows where `column` equals `value`
    pub fn eq(mut self, column: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.into(), format!("eq.{}", value)));
        self
    }

    /// Order rows by `column`
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some((column.into(), ascending));
        self
    }

    /// Return at most `count` rows
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    fn path(&self) -> String {
        format!("/rest/v1/{}", self.table.name())
    }

    fn with_filters(&self, mut request: RestRequest) -> RestRequest {
        for (column, filter) in &self.filters {
            request = request.param(column.clone(), filter.clone());
        }
        request
    }

    fn read_request(&self) -> RestRequest {
        let mut request = RestRequest::get(self.path())
            .param("select", self.columns.clone())
            .bearer(self.bearer.clone());
        request = self.with_filters(request);

        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            request = request.param("order", format!("{}.{}", column, direction));
        }

        if let Some(limit) = self.limit {
            request = request.param("limit", limit.to_string());
        }

        request
    }

    /// Fetch all matching rows
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let request = self.read_request();
        Ok(self.rest.execute(request).await?.data)
    }

    /// Fetch exactly one row; zero or several rows is an error
    pub async fn single<T: DeserializeOwned>(self) -> Result<T> {
        let request = self.read_request().header("Accept", OBJECT_MEDIA_TYPE);
        Ok(self.rest.execute(request).await?.data)
    }

    /// Fetch one row, treating "no rows" as `None`
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self.single().await {
            Ok(row) => Ok(Some(row)),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Insert one row
    pub async fn insert<B: Serialize + ?Sized>(self, row: &B) -> Result<()> {
        let request = RestRequest::post(self.path())
            .bearer(self.bearer.clone())
            .header("Prefer", "return=minimal")
            .json_body(row)
            .map_err(|e| BackendError::new(0, "SerializeError", e.to_string()))?;

        self.rest.execute_empty(request).await?;
        Ok(())
    }

    /// Update the rows matched by the filters
    ///
    /// An update without filters would touch every row and is refused.
    pub async fn update<B: Serialize + ?Sized>(self, patch: &B) -> Result<()> {
        if self.filters.is_empty() {
            return Err(BackendError::new(
                0,
                "MissingFilter",
                format!("refusing to update every row of {}", self.table),
            ));
        }

        let request = RestRequest::patch(self.path())
            .bearer(self.bearer.clone())
            .header("Prefer", "return=minimal")
            .json_body(patch)
            .map_err(|e| BackendError::new(0, "SerializeError", e.to_string()))?;
        let request = self.with_filters(request);

        self.rest.execute_empty(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn rest() -> RestClient {
        RestClient::new(BackendConfig::new("http://127.0.0.1:9", "anon")).unwrap()
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Profiles.name(), "profiles");
        assert_eq!(Table::UserQuizData.to_string(), "user_quiz_data");
        assert_eq!(Table::Messages.name(), "messages");
    }

    #[test]
    fn test_read_request_params() {
        let rest = rest();
        let query = TableQuery::new(&rest, Table::Cycles, Some("token".to_string()))
            .eq("user_id", "u1")
            .order("start_date", false)
            .limit(12);

        let request = query.read_request();
        assert_eq!(request.path, "/rest/v1/cycles");
        assert_eq!(
            request.params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.u1".to_string()),
                ("order".to_string(), "start_date.desc".to_string()),
                ("limit".to_string(), "12".to_string()),
            ]
        );
        assert_eq!(request.bearer.as_deref(), Some("token"));
    }

    #[test]
    fn test_ascending_order_and_columns() {
        let rest = rest();
        let request = TableQuery::new(&rest, Table::Posts, None)
            .select("id,likes")
            .order("created_at", true)
            .read_request();

        assert!(request.params.contains(&("select".to_string(), "id,likes".to_string())));
        assert!(request.params.contains(&("order".to_string(), "created_at.asc".to_string())));
    }

    #[tokio::test]
    async fn test_update_without_filter_is_refused() {
        let rest = rest();
        let err = TableQuery::new(&rest, Table::Posts, None)
            .update(&serde_json::json!({"likes": 1}))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "MissingFilter");
    }
}
