//! Announcement store caching and stale response handling

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tutorhub_course::{AnnouncementCreate, AnnouncementStore, AnnouncementUpdate, FetchOutcome};
use tutorhub_http::{ApiClient, HttpConfig, StaticToken};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/api/course/course/announcements";

fn store(server: &MockServer) -> AnnouncementStore {
    let client = ApiClient::new(HttpConfig::fast(), &server.uri())
        .unwrap()
        .with_session(Arc::new(StaticToken("teacher-token".into())));
    AnnouncementStore::new(client)
}

fn announcement(id: &str, title: &str) -> Value {
    json!({
        "announcement_id": id,
        "course_id": "c1",
        "title": title,
        "body": "body",
        "is_pinned": false,
        "seen": false,
        "seen_at": null,
        "author": {"ID": "t1", "Name": "Ada", "Surname": "Lovelace", "Statu": "ACTIVE"},
        "created_at": "2026-01-01T10:00:00Z",
        "updated_at": "2026-01-01T10:00:00Z"
    })
}

fn page(items: Vec<Value>, unseen: u32) -> Value {
    json!({"items": items, "unseen": {"course_id": "c1", "unseen_count": unseen}})
}

fn list_response(payload: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": 200, "message": "ok", "items": payload}))
}

#[tokio::test]
async fn test_fetch_defaults_and_caches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .and(query_param("course_id", "c1"))
        .and(query_param("page", "0"))
        .and(query_param("page_size", "10"))
        .respond_with(list_response(json!([page(vec![announcement("a1", "Welcome")], 1)])))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    assert_eq!(store.fetch("c1", None, None).await.unwrap(), FetchOutcome::Applied);

    let cached = store.cached("c1").unwrap();
    assert_eq!(cached[0].title, "Welcome");
    assert_eq!(
        cached[0].author.as_ref().map(|a| a.display_name()),
        Some("Ada Lovelace".to_string())
    );
    assert_eq!(store.unseen_count("c1"), 1);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_page_object_form_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(list_response(page(vec![announcement("a1", "Object form")], 0)))
        .mount(&server)
        .await;

    let store = store(&server);
    store.fetch("c1", None, None).await.unwrap();
    assert_eq!(store.cached("c1").map(|v| v.len()), Some(1));
}

#[tokio::test]
async fn test_blank_course_is_skipped() {
    let server = MockServer::start().await;
    let store = store(&server);

    assert_eq!(store.fetch("  ", None, None).await.unwrap(), FetchOutcome::Skipped);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_response_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .and(query_param("page", "0"))
        .respond_with(
            list_response(json!([page(vec![announcement("old", "Old page")], 5)]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .and(query_param("page", "1"))
        .respond_with(list_response(json!([page(vec![announcement("new", "New page")], 2)])))
        .mount(&server)
        .await;

    let store = store(&server);
    let (first, second) = tokio::join!(store.fetch("c1", Some(0), None), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.fetch("c1", Some(1), None).await
    });

    assert_eq!(first.unwrap(), FetchOutcome::Stale);
    assert_eq!(second.unwrap(), FetchOutcome::Applied);
    let cached = store.cached("c1").unwrap();
    assert_eq!(cached[0].announcement_id, "new");
    assert_eq!(store.unseen_count("c1"), 2);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_stale_failure_leaves_error_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .and(query_param("page", "0"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"detail": "boom"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .and(query_param("page", "1"))
        .respond_with(list_response(json!([page(vec![], 0)])))
        .mount(&server)
        .await;

    let store = store(&server);
    let (first, second) = tokio::join!(store.fetch("c1", Some(0), None), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.fetch("c1", Some(1), None).await
    });

    assert_eq!(first.unwrap(), FetchOutcome::Stale);
    assert_eq!(second.unwrap(), FetchOutcome::Applied);
    assert!(store.error().is_none());
    assert_eq!(store.cached("c1"), Some(vec![]));
}

#[tokio::test]
async fn test_fetch_failure_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&server)
        .await;

    let store = store(&server);
    assert!(store.fetch("c1", None, None).await.is_err());
    assert_eq!(store.error().as_deref(), Some("boom"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_local_patches_after_mutations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(list_response(json!([page(vec![announcement("a1", "First")], 0)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/create")))
        .and(body_json(json!({"course_id": "c1", "title": "Second", "body": "body", "is_pinned": true})))
        .respond_with(list_response(json!([announcement("a2", "Second")])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{BASE}/update")))
        .and(query_param("announcement_id", "a1"))
        .respond_with(list_response(json!([announcement("a1", "First (edited)")])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{BASE}/delete")))
        .and(query_param("announcement_id", "a2"))
        .respond_with(list_response(json!([])))
        .mount(&server)
        .await;

    let store = store(&server);
    store.fetch("c1", None, None).await.unwrap();

    store
        .create(&AnnouncementCreate {
            course_id: "c1".into(),
            title: "Second".into(),
            body: "body".into(),
            is_pinned: true,
        })
        .await
        .unwrap();
    let ids: Vec<String> = store.cached("c1").unwrap().into_iter().map(|a| a.announcement_id).collect();
    assert_eq!(ids, vec!["a2", "a1"]);

    store
        .update(
            "a1",
            &AnnouncementUpdate {
                title: "First (edited)".into(),
                body: "body".into(),
                is_pinned: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(store.cached("c1").unwrap()[1].title, "First (edited)");

    store.delete("c1", "a2").await.unwrap();
    let ids: Vec<String> = store.cached("c1").unwrap().into_iter().map(|a| a.announcement_id).collect();
    assert_eq!(ids, vec!["a1"]);
}

#[tokio::test]
async fn test_embedded_422_fails_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 422,
            "message": "Unprocessable",
            "items": null,
            "errors": [{"input_index": 0, "error_code": "FORBIDDEN", "detail": "NOT_COURSE_OWNER"}]
        })))
        .mount(&server)
        .await;

    let store = store(&server);
    let err = store.fetch("c1", None, None).await.unwrap_err();
    assert_eq!(err.status(), 422);
    assert_eq!(store.error().as_deref(), Some("NOT_COURSE_OWNER"));
}
