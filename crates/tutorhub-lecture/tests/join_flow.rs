//! Lesson status and the join flow against a mock backend

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tutorhub_http::{ApiClient, HttpConfig, StaticToken};
use tutorhub_lecture::{
    LectureController, LectureError, LectureRoutes, LessonStatus, LiveLectureApi,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NS: &str = "/api/course/course/lesson";

fn controller(server: &MockServer) -> LectureController {
    let client = ApiClient::new(HttpConfig::fast(), &server.uri())
        .unwrap()
        .with_session(Arc::new(StaticToken("teacher-token".into())));
    LectureController::new(LiveLectureApi::new(client, LectureRoutes::default()), "course-1")
}

async fn mount_status(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{NS}/status")))
        .and(query_param("course_id", "course-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "message": "ok",
            "items": [status],
            "meta": {"lesson_id": "lesson-9"}
        })))
        .mount(server)
        .await;
}

async fn mount_create(server: &MockServer, expect: u64) {
    Mock::given(method("POST"))
        .and(path(format!("{NS}/create")))
        .and(body_partial_json(json!({"course_id": "course-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "message": "ok",
            "items": [{"lesson_id": "lesson-9", "course_id": "course-1", "host_id": "h", "host_joined": false, "description": "d"}]
        })))
        .expect(expect)
        .mount(server)
        .await;
}

async fn mount_token(server: &MockServer, token: &str, expect: u64) {
    Mock::given(method("POST"))
        .and(path(format!("{NS}/join-token")))
        .and(query_param("course_id", "course-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "message": "ok", "items": [{"token": token}]
        })))
        .expect(expect)
        .mount(server)
        .await;
}

async fn mount_verify(server: &MockServer, valid: bool, expect: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{NS}/verify-token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "message": "ok", "items": [valid]
        })))
        .expect(expect)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_refresh_status_reads_topic() {
    let server = MockServer::start().await;
    mount_status(&server, "ACTIVE_LESSON").await;

    let ctl = controller(&server);
    ctl.refresh_status().await;

    let state = ctl.state();
    assert_eq!(state.status, Some(LessonStatus::ActiveLesson));
    assert_eq!(state.lesson_id.as_deref(), Some("lesson-9"));
    assert!(state.can_enter());
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_status_failure_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{NS}/status")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
        .mount(&server)
        .await;

    let ctl = controller(&server);
    ctl.refresh_status().await;

    let state = ctl.state();
    assert_eq!(state.error.as_deref(), Some("db down"));
    assert!(state.status.is_none());
    assert!(!ctl.can_enter());
}

#[tokio::test]
async fn test_status_success_clears_previous_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{NS}/status")))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "try later"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, "ACTIVE_LESSON").await;

    let ctl = controller(&server);
    ctl.refresh_status().await;
    assert_eq!(ctl.state().error.as_deref(), Some("try later"));

    ctl.refresh_status().await;
    let state = ctl.state();
    assert!(state.error.is_none());
    assert_eq!(state.status, Some(LessonStatus::ActiveLesson));
}

#[tokio::test]
async fn test_concurrent_join_runs_once() {
    let server = MockServer::start().await;
    mount_status(&server, "ACTIVE_LESSON").await;
    Mock::given(method("POST"))
        .and(path(format!("{NS}/create")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "code": 200,
                    "message": "ok",
                    "items": [{"lesson_id": "lesson-9", "course_id": "course-1", "host_id": "h", "host_joined": false, "description": "d"}]
                }))
                .set_delay(Duration::from_millis(150)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_token(&server, "jwt-1", 2).await;
    mount_verify(&server, true, 2).await;

    let ctl = controller(&server);
    ctl.refresh_status().await;

    let (first, second) = tokio::join!(ctl.begin_join_flow(), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        ctl.begin_join_flow().await
    });

    assert_eq!(first.unwrap().map(|t| t.token), Some("jwt-1".to_string()));
    assert!(matches!(second, Err(LectureError::JoinInProgress)));
    // The refused call leaves the running flow's state alone
    let state = ctl.state();
    assert!(state.error.is_none());
    assert!(!state.joining);

    // Free again once the first flow is done
    mount_create(&server, 1).await;
    assert!(ctl.begin_join_flow().await.unwrap().is_some());
}

#[tokio::test]
async fn test_status_refresh_keeps_join_in_progress() {
    let server = MockServer::start().await;
    mount_status(&server, "ACTIVE_LESSON").await;
    Mock::given(method("POST"))
        .and(path(format!("{NS}/create")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "message": "ok", "items": []}))
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;
    mount_token(&server, "jwt-1", 1).await;
    mount_verify(&server, true, 1).await;

    let ctl = controller(&server);
    ctl.refresh_status().await;

    let (joined, seen) = tokio::join!(ctl.begin_join_flow(), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(ctl.state().joining);
        ctl.refresh_status().await;
        ctl.state()
    });

    assert!(!seen.loading);
    assert!(seen.joining);
    assert_eq!(joined.unwrap().unwrap().lesson_id, "lesson-9");
    assert!(!ctl.state().joining);
}

#[tokio::test]
async fn test_join_flow_noop_when_not_enterable() {
    let server = MockServer::start().await;
    mount_status(&server, "NO_ACTIVE_LESSON").await;
    mount_create(&server, 0).await;
    mount_token(&server, "jwt", 0).await;
    mount_verify(&server, true, 0).await;

    let ctl = controller(&server);
    ctl.refresh_status().await;
    let before = server.received_requests().await.unwrap().len();

    assert_eq!(ctl.begin_join_flow().await.unwrap(), None);
    assert_eq!(server.received_requests().await.unwrap().len(), before);
    assert!(ctl.ticket().is_none());
}

#[tokio::test]
async fn test_join_flow_without_status_makes_no_calls() {
    let server = MockServer::start().await;
    let ctl = controller(&server);

    assert_eq!(ctl.begin_join_flow().await.unwrap(), None);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_join_flow_runs_steps_in_order() {
    let server = MockServer::start().await;
    mount_status(&server, "CREATABLE_WINDOW").await;
    mount_create(&server, 1).await;
    mount_token(&server, "jwt-1", 1).await;
    mount_verify(&server, true, 1).await;

    let ctl = controller(&server);
    ctl.refresh_status().await;
    let ticket = ctl.begin_join_flow().await.unwrap().unwrap();

    assert_eq!(ticket.course_id, "course-1");
    assert_eq!(ticket.lesson_id, "lesson-9");
    assert_eq!(ticket.token, "jwt-1");
    assert_eq!(ctl.ticket(), Some(ticket));

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().rsplit('/').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(paths, vec!["status", "create", "join-token", "verify-token"]);

    let verify = server.received_requests().await.unwrap().pop().unwrap();
    assert_eq!(verify.url.query(), Some("token=jwt-1"));
}

#[tokio::test]
async fn test_empty_token_stops_before_verify() {
    let server = MockServer::start().await;
    mount_status(&server, "ACTIVE_LESSON").await;
    mount_create(&server, 1).await;
    mount_token(&server, "", 1).await;
    mount_verify(&server, true, 0).await;

    let ctl = controller(&server);
    ctl.refresh_status().await;
    let err = ctl.begin_join_flow().await.unwrap_err();

    assert!(matches!(err, LectureError::MissingJoinToken));
    let state = ctl.state();
    assert_eq!(state.error.as_deref(), Some("Join token missing"));
    assert!(state.ticket.is_none());
    assert!(!state.joining);
}

#[tokio::test]
async fn test_rejected_token_keeps_no_ticket() {
    let server = MockServer::start().await;
    mount_status(&server, "ACTIVE_LESSON").await;
    mount_create(&server, 1).await;
    mount_token(&server, "jwt-bad", 1).await;
    mount_verify(&server, false, 1).await;

    let ctl = controller(&server);
    ctl.refresh_status().await;
    let err = ctl.begin_join_flow().await.unwrap_err();

    assert!(matches!(err, LectureError::TokenRejected));
    assert!(ctl.ticket().is_none());
}

#[tokio::test]
async fn test_create_failure_short_circuits() {
    let server = MockServer::start().await;
    mount_status(&server, "ACTIVE_LESSON").await;
    Mock::given(method("POST"))
        .and(path(format!("{NS}/create")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "not host"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_token(&server, "jwt", 0).await;

    let ctl = controller(&server);
    ctl.refresh_status().await;
    let err = ctl.begin_join_flow().await.unwrap_err();

    assert!(matches!(err, LectureError::Api(_)));
    assert_eq!(ctl.state().error.as_deref(), Some("not host"));
}

#[tokio::test]
async fn test_polling_stops_on_drop() {
    let server = MockServer::start().await;
    mount_status(&server, "NO_ACTIVE_LESSON").await;

    let ctl = controller(&server);
    ctl.start_polling(Duration::from_millis(60));
    assert!(ctl.is_polling());

    tokio::time::sleep(Duration::from_millis(200)).await;
    let polled = server.received_requests().await.unwrap().len();
    assert!(polled >= 2, "expected at least two polls, got {polled}");

    drop(ctl);
    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), settled);
}
