//! REST transport
//!
//! This module implements the HTTP layer shared by the auth API and the table
//! API of the hosted service: request/response types, error decoding, and the
//! reqwest-backed client that attaches the `apikey` and bearer headers.

use crate::config::BackendConfig;
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

// =============================================================================
// Error Types
// =============================================================================

/// Error code the table API uses when `single` matched no rows
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Error returned by the hosted service, or by the transport on the way there
///
/// # Examples
/// ```
/// use backend_client::rest::BackendError;
///
/// let error = BackendError::new(406, "PGRST116", "JSON object requested, multiple (or no) rows returned");
/// assert_eq!(error.status(), 406);
/// assert!(error.is_no_rows());
/// assert!(!error.is_network_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// HTTP status code (0 for transport failures)
    status: u16,
    /// Error code (e.g., "invalid_grant", "PGRST116", "23505")
    code: String,
    /// Human-readable error message
    message: String,
}

impl BackendError {
    /// Create a new backend error
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the error code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the request never got a usable answer from the service
    pub fn is_network_error(&self) -> bool {
        matches!(self.status, 0 | 408 | 429 | 500 | 502 | 503 | 504 | 522 | 524)
    }

    /// Whether this is the "no rows" answer to a `single` request
    pub fn is_no_rows(&self) -> bool {
        self.code == NO_ROWS_CODE
    }

    /// Decode an error body from either API
    ///
    /// The auth API answers with `msg`/`error_description`/`error`, the table
    /// API with `code`/`message`. The first message field present wins.
    pub fn from_body(status: u16, body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            return Self::new(status, "Unknown", format!("HTTP {}: {}", status, body));
        };

        let text = |key: &str| match value.get(key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let message = ["msg", "message", "error_description", "error"]
            .iter()
            .find_map(|key| text(key))
            .unwrap_or_else(|| format!("HTTP {}", status));

        let code = ["error_code", "code", "error"]
            .iter()
            .find_map(|key| text(key))
            .unwrap_or_else(|| "Unknown".to_string());

        Self::new(status, code, message)
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Backend error {}: {} - {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for BackendError {}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, BackendError>;

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method for REST requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request (reads)
    Get,
    /// POST request (inserts, auth calls)
    Post,
    /// PATCH request (updates)
    Patch,
    /// DELETE request
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A request against the hosted service
///
/// `path` is relative to the service URL (e.g. "/rest/v1/profiles").
/// Query parameters keep their insertion order.
#[derive(Debug, Clone)]
pub struct RestRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the service URL
    pub path: String,
    /// Query parameters
    pub params: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
    /// Bearer token; the anon key is used when absent
    pub bearer: Option<String>,
}

impl RestRequest {
    /// Create a request with the given method and path
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: HashMap::new(),
            body: None,
            bearer: None,
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Create a PATCH request
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Authenticate as the given access token
    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    /// Set the request body from JSON
    pub fn json_body<T: Serialize + ?Sized>(mut self, value: &T) -> std::result::Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Response from the hosted service
#[derive(Debug, Clone)]
pub struct RestResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response data
    pub data: T,
}

impl<T> RestResponse<T> {
    /// Create a new response
    pub fn new(status: u16, headers: HashMap<String, String>, data: T) -> Self {
        Self { status, headers, data }
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the hosted service
#[derive(Debug, Clone)]
pub struct RestClient {
    client: ReqwestClient,
    config: BackendConfig,
}

impl RestClient {
    /// Create a new client
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| BackendError::new(0, "ClientBuild", e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Execute a request and decode the JSON body
    pub async fn execute<T>(&self, request: RestRequest) -> Result<RestResponse<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request).await?;
        let status = response.status;

        let data: T = serde_json::from_str(&response.data).map_err(|e| {
            BackendError::new(status, "ParseError", format!("Failed to parse JSON: {}", e))
        })?;

        Ok(RestResponse::new(status, response.headers, data))
    }

    /// Execute a request whose body is irrelevant (204, `return=minimal`)
    pub async fn execute_empty(&self, request: RestRequest) -> Result<RestResponse<()>> {
        let response = self.send(request).await?;
        Ok(RestResponse::new(response.status, response.headers, ()))
    }

    async fn send(&self, request: RestRequest) -> Result<RestResponse<String>> {
        let url = format!("{}{}", self.config.url, request.path);
        tracing::debug!(method = request.method.as_str(), %url, "backend request");

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Patch => self.client.patch(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        if !request.params.is_empty() {
            req = req.query(&request.params);
        }

        let bearer = request.bearer.as_deref().unwrap_or(&self.config.anon_key);
        req = req
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", bearer));

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| BackendError::new(0, "NetworkError", format!("Request failed: {}", e)))?;

        self.read_response(response).await
    }

    async fn read_response(&self, response: ReqwestResponse) -> Result<RestResponse<String>> {
        let status = response.status().as_u16();
        let success = response.status().is_success();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.to_string(), value_str.to_string());
            }
        }

        let body = response.text().await.map_err(|e| {
            BackendError::new(status, "ParseError", format!("Failed to read response: {}", e))
        })?;

        if !success {
            return Err(BackendError::from_body(status, &body));
        }

        Ok(RestResponse::new(status, headers, body))
    }

    /// Get the client configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_network() {
        let error = BackendError::new(503, "ServiceUnavailable", "Service is down");
        assert!(error.is_network_error());
        assert!(!error.is_no_rows());

        let error = BackendError::new(400, "invalid_grant", "Invalid login credentials");
        assert!(!error.is_network_error());
    }

    #[test]
    fn test_error_from_auth_body() {
        let error = BackendError::from_body(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(error.status(), 400);
        assert_eq!(error.code(), "invalid_grant");
        assert_eq!(error.message(), "Invalid login credentials");

        let error = BackendError::from_body(
            422,
            r#"{"code":422,"error_code":"weak_password","msg":"Password should be at least 6 characters."}"#,
        );
        assert_eq!(error.code(), "weak_password");
        assert_eq!(error.message(), "Password should be at least 6 characters.");
    }

    #[test]
    fn test_error_from_table_body() {
        let error = BackendError::from_body(
            406,
            r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#,
        );
        assert!(error.is_no_rows());
        assert_eq!(error.message(), "JSON object requested, multiple (or no) rows returned");
    }

    #[test]
    fn test_error_from_garbage_body() {
        let error = BackendError::from_body(502, "<html>bad gateway</html>");
        assert_eq!(error.code(), "Unknown");
        assert!(error.message().contains("bad gateway"));
    }

    #[test]
    fn test_request_builder() {
        let req = RestRequest::get("/rest/v1/cycles")
            .param("user_id", "eq.u1")
            .param("order", "start_date.desc")
            .header("Accept", "application/json")
            .bearer(Some("token".to_string()));

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.params[0], ("user_id".to_string(), "eq.u1".to_string()));
        assert_eq!(req.params[1].0, "order");
        assert_eq!(req.bearer.as_deref(), Some("token"));
    }

    #[test]
    fn test_request_json_body() {
        let req = RestRequest::patch("/rest/v1/posts")
            .json_body(&serde_json::json!({"likes": 4}))
            .unwrap();

        assert_eq!(req.headers.get("Content-Type").map(String::as_str), Some("application/json"));
        let body = String::from_utf8(req.body.unwrap()).unwrap();
        assert_eq!(body, r#"{"likes":4}"#);
    }

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
    }
}
