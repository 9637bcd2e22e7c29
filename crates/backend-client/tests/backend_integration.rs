//! Integration tests for the backend client
//!
//! These tests use wiremock to stand in for the hosted auth and table APIs
//! and exercise the full request/response cycle.

use backend_client::session::{FileSessionStore, MemorySessionStore, SessionStore};
use backend_client::{AuthChangeEvent, AuthError, BackendClient, BackendConfig, Session, Table, User};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token_body(user_id: &str) -> serde_json::Value {
    json!({
        "access_token": format!("access-{}", user_id),
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": format!("refresh-{}", user_id),
        "user": {"id": user_id, "email": "ana@example.com", "user_metadata": {"name": "Ana"}}
    })
}

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(BackendConfig::new(server.uri(), "anon-key")).unwrap()
}

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: String,
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_sign_in_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({"email": "ana@example.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    let _sub = client
        .auth()
        .on_auth_state_change(move |event, session| {
            events_clone.lock().push((event, session.map(|s| s.user.id.clone())));
        });

    let session = client
        .auth()
        .sign_in_with_password("ana@example.com", "secret1")
        .await
        .unwrap();

    assert_eq!(session.user.id, "u1");
    assert_eq!(session.user.name(), Some("Ana"));
    assert!(session.expires_at.is_some());
    assert_eq!(client.auth().current_user().unwrap().id, "u1");
    assert_eq!(
        *events.lock(),
        vec![(AuthChangeEvent::SignedIn, Some("u1".to_string()))]
    );
}

#[tokio::test]
async fn test_sign_in_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .auth()
        .sign_in_with_password("ana@example.com", "wrong-pass")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Backend(ref e) if e.status() == 400));
    assert_eq!(err.user_message(), "Invalid login credentials");
    assert!(client.auth().current_session().is_none());
}

#[tokio::test]
async fn test_sign_up_with_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_json(json!({
            "email": "ana@example.com",
            "password": "secret1",
            "data": {"name": "Ana"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u2")))
        .mount(&server)
        .await;

    let client = client(&server);
    let outcome = client.auth().sign_up("ana@example.com", "secret1", "Ana").await.unwrap();

    assert_eq!(outcome.user.id, "u2");
    assert!(outcome.session.is_some());
    assert_eq!(client.auth().current_user().unwrap().id, "u2");
}

#[tokio::test]
async fn test_sign_up_confirmation_pending() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u3",
            "email": "ana@example.com",
            "user_metadata": {"name": "Ana"}
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let outcome = client.auth().sign_up("ana@example.com", "secret1", "Ana").await.unwrap();

    assert_eq!(outcome.user.id, "u3");
    assert!(outcome.session.is_none());
    assert!(client.auth().current_session().is_none());
}

#[tokio::test]
async fn test_sign_out_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u1")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("Authorization", "Bearer access-u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileSessionStore::new(temp_dir.path().join("session.json")));
    let client =
        BackendClient::with_store(BackendConfig::new(server.uri(), "anon-key"), store.clone())
            .unwrap();

    client.auth().sign_in_with_password("ana@example.com", "secret1").await.unwrap();
    assert!(store.load().await.unwrap().is_some());

    client.auth().sign_out().await.unwrap();
    assert!(client.auth().current_session().is_none());
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_sign_out_failure_keeps_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u1")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"msg": "boom"})))
        .mount(&server)
        .await;

    let client = client(&server);
    client.auth().sign_in_with_password("ana@example.com", "secret1").await.unwrap();

    let err = client.auth().sign_out().await.unwrap_err();
    assert_eq!(err.user_message(), "boom");
    assert!(client.auth().current_session().is_some());
}

#[tokio::test]
async fn test_expired_stored_session_is_refreshed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({"refresh_token": "old-refresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u1")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    store
        .save(&Session {
            access_token: "old-access".to_string(),
            refresh_token: "old-refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: Some(1),
            user: User::new("u1", None),
        })
        .await
        .unwrap();

    let client =
        BackendClient::with_store(BackendConfig::new(server.uri(), "anon-key"), store.clone())
            .unwrap();

    let session = client.auth().get_session().await.unwrap().unwrap();
    assert_eq!(session.access_token, "access-u1");
    assert_eq!(store.load().await.unwrap().unwrap().access_token, "access-u1");
}

#[tokio::test]
async fn test_unrefreshable_stored_session_is_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid Refresh Token"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    store
        .save(&Session {
            access_token: "old-access".to_string(),
            refresh_token: "revoked".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: Some(1),
            user: User::new("u1", None),
        })
        .await
        .unwrap();

    let client =
        BackendClient::with_store(BackendConfig::new(server.uri(), "anon-key"), store.clone())
            .unwrap();

    assert!(client.auth().get_session().await.unwrap().is_none());
    assert!(store.load().await.unwrap().is_none());
}

// =============================================================================
// Tables
// =============================================================================

#[tokio::test]
async fn test_fetch_with_filters_order_and_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cycles"))
        .and(query_param("select", "*"))
        .and(query_param("user_id", "eq.u1"))
        .and(query_param("order", "start_date.desc"))
        .and(query_param("limit", "12"))
        .and(header("Authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "c2"}, {"id": "c1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let rows: Vec<Row> = client
        .from(Table::Cycles)
        .eq("user_id", "u1")
        .order("start_date", false)
        .limit(12)
        .fetch()
        .await
        .unwrap();

    assert_eq!(rows, vec![Row { id: "c2".into() }, Row { id: "c1".into() }]);
}

#[tokio::test]
async fn test_queries_authenticate_as_signed_in_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("u1")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(header("Authorization", "Bearer access-u1"))
        .and(header("apikey", "anon-key"))
        .and(header("Accept", "application/vnd.pgrst.object+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.auth().sign_in_with_password("ana@example.com", "secret1").await.unwrap();

    let row: Row = client.from(Table::Profiles).eq("id", "u1").single().await.unwrap();
    assert_eq!(row.id, "u1");
}

#[tokio::test]
async fn test_maybe_single_no_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_quiz_data"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "details": "The result contains 0 rows",
            "hint": null,
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let row: Option<Row> = client
        .from(Table::UserQuizData)
        .eq("user_id", "u1")
        .maybe_single()
        .await
        .unwrap();
    assert!(row.is_none());

    let err = client
        .from(Table::UserQuizData)
        .eq("user_id", "u1")
        .single::<Row>()
        .await
        .unwrap_err();
    assert!(err.is_no_rows());
}

#[tokio::test]
async fn test_maybe_single_propagates_other_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_quiz_data"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "PGRST301",
            "message": "JWT expired"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .from(Table::UserQuizData)
        .eq("user_id", "u1")
        .maybe_single::<Row>()
        .await
        .unwrap_err();
    assert_eq!(err.status(), 401);
    assert_eq!(err.message(), "JWT expired");
}

#[tokio::test]
async fn test_insert_and_update() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cycles"))
        .and(header("Prefer", "return=minimal"))
        .and(body_json(json!({"user_id": "u1", "start_date": "2026-10-18"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/posts"))
        .and(query_param("id", "eq.p1"))
        .and(body_json(json!({"likes": 4})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .from(Table::Cycles)
        .insert(&json!({"user_id": "u1", "start_date": "2026-10-18"}))
        .await
        .unwrap();

    client
        .from(Table::Posts)
        .eq("id", "p1")
        .update(&json!({"likes": 4}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_insert_conflict_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"profiles_pkey\""
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .from(Table::Profiles)
        .insert(&json!({"id": "u1"}))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 409);
    assert_eq!(err.code(), "23505");
    assert!(!err.is_network_error());
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let client = BackendClient::new(BackendConfig::new("http://127.0.0.1:9", "anon-key")).unwrap();
    let err = client.from(Table::Posts).fetch::<Row>().await.unwrap_err();

    assert_eq!(err.status(), 0);
    assert!(err.is_network_error());
}
