//! Authentication and error handling of ApiClient against a mock backend

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use tutorhub_http::{ApiClient, ApiError, ApiRequest, Envelope, FormData, HttpConfig, SessionProvider};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Provider whose refresh swaps in a new token (or fails)
struct TestSession {
    token: Mutex<Option<String>>,
    next_token: Option<String>,
    refreshes: AtomicUsize,
    unauthorized: AtomicBool,
}

impl TestSession {
    fn new(token: &str, next_token: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(Some(token.to_string())),
            next_token: next_token.map(str::to_string),
            refreshes: AtomicUsize::new(0),
            unauthorized: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl SessionProvider for TestSession {
    fn access_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    async fn refresh_session(&self) -> bool {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        match &self.next_token {
            Some(next) => {
                *self.token.lock().unwrap() = Some(next.clone());
                true
            }
            None => {
                *self.token.lock().unwrap() = None;
                false
            }
        }
    }

    fn on_unauthorized(&self) {
        self.unauthorized.store(true, Ordering::SeqCst);
    }
}

fn client_for(server: &MockServer, session: Arc<TestSession>) -> ApiClient {
    ApiClient::new(HttpConfig::fast(), &server.uri())
        .unwrap()
        .with_session(session)
}

#[tokio::test]
async fn test_bearer_header_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/profile"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "message": "ok", "items": [1]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, TestSession::new("tok-1", None));
    let env: Envelope<i32> = client
        .send(&ApiRequest::get("/api/course/profile").auth())
        .await
        .unwrap();
    assert_eq!(env.items, vec![1]);
}

#[tokio::test]
async fn test_unauthenticated_request_has_no_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authenticate/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "sent", "mock": "123456"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, TestSession::new("tok-1", None));
    let body: Value = client
        .send(&ApiRequest::post("/api/authenticate/login").json(&json!({"phone_number": "555"})).unwrap())
        .await
        .unwrap();
    assert_eq!(body["mock"], "123456");

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_401_refreshes_and_retries_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/course/item"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/course/course/item"))
        .and(query_param("course_id", "c1"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "message": "ok", "items": ["course"]})))
        .expect(1)
        .mount(&server)
        .await;

    let session = TestSession::new("expired", Some("fresh"));
    let client = client_for(&server, Arc::clone(&session));

    let env: Envelope<String> = client
        .send(&ApiRequest::get("/api/course/course/item").query("course_id", "c1").auth())
        .await
        .unwrap();

    assert_eq!(env.items, vec!["course".to_string()]);
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 1);
    assert!(!session.unauthorized.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_second_401_surfaces_unauthorized_without_looping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/teacher/overview"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "token revoked"})))
        .expect(2)
        .mount(&server)
        .await;

    let session = TestSession::new("a", Some("b"));
    let client = client_for(&server, Arc::clone(&session));

    let err = client
        .send::<Value>(&ApiRequest::get("/api/course/teacher/overview").auth())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.message(), "token revoked");
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_refresh_signals_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let session = TestSession::new("a", None);
    let client = client_for(&server, Arc::clone(&session));

    let err = client
        .send::<Value>(&ApiRequest::get("/api/course/profile").auth())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(session.unauthorized.load(Ordering::SeqCst));

    // Token is gone now: the next call never reaches the server
    let err = client
        .send::<Value>(&ApiRequest::get("/api/course/profile").auth())
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Not authenticated");
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_401_on_public_call_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authenticate/authenticate"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad code"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = TestSession::new("a", Some("b"));
    let client = client_for(&server, Arc::clone(&session));

    let err = client
        .send::<Value>(&ApiRequest::post("/api/authenticate/authenticate").empty_json())
        .await
        .unwrap_err();
    assert_eq!(err.status(), 401);
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_422_is_structured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/course/course/schedule/insert"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": 422,
            "message": "Unprocessable",
            "errors": [{"input_index": 0, "error_code": "BUSINESS", "detail": "SCHEDULE_OVERLAP"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, TestSession::new("a", None));
    let err = client
        .send::<Value>(&ApiRequest::post("/api/course/course/schedule/insert").empty_json().auth())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation { .. }));
    assert_eq!(err.status(), 422);
    assert_eq!(err.validation_errors()[0].detail, "SCHEDULE_OVERLAP");
    assert!(err.detail().is_some());
}

#[tokio::test]
async fn test_server_error_without_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/curriculum/levels"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = client_for(&server, TestSession::new("a", None));
    let err = client
        .send::<Value>(&ApiRequest::get("/api/curriculum/levels").auth())
        .await
        .unwrap_err();

    assert_eq!(err.status(), 503);
    assert_eq!(err.message(), "Request failed");
    assert!(err.detail().is_none());
}

#[tokio::test]
async fn test_network_error_has_status_zero() {
    let client = ApiClient::new(HttpConfig::fast(), "http://127.0.0.1:9").unwrap();
    let err = client
        .send::<Value>(&ApiRequest::get("/api/curriculum/levels"))
        .await
        .unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.status(), 0);
}

#[tokio::test]
async fn test_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/curriculum/levels"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = ApiClient::new(HttpConfig::fast(), &server.uri()).unwrap();
    let err = client
        .send::<Value>(&ApiRequest::get("/api/curriculum/levels"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_multipart_form_is_resent_after_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/course/profile/picture"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/course/profile/picture"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "message": "ok", "items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, TestSession::new("old", Some("new")));
    let form = FormData::new().file("file", "me.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]);
    client
        .send_empty(&ApiRequest::patch("/api/course/profile/picture").form(form).auth())
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    let body = String::from_utf8_lossy(&received[1].body);
    assert!(body.contains("filename=\"me.png\""));
}
