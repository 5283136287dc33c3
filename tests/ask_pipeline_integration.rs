//! End-to-end pipeline tests: SQLite notes -> service -> mock completion API

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notesai::storage::{Note, NoteStore};
use notesai::{
    error, EMPTY_CORPUS_MESSAGE, MALFORMED_RESPONSE_FALLBACK, TRANSPORT_FAILURE_FALLBACK,
};

mod common;

fn answer_body(content: Value) -> Value {
    json!({
        "choices": [ { "index": 0, "message": { "role": "assistant", "content": content } } ]
    })
}

async fn seed_review_note(store: &notesai::storage::SqliteNoteStore, author: &str) {
    let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    store
        .insert_note(&Note {
            id: "note-1".to_string(),
            author_id: author.to_string(),
            text: "Title: Q1 Review\nURL: https://x.test\nGrowth strong".to_string(),
            created_at: t1,
            updated_at: t1,
        })
        .await
        .unwrap();
}

async fn sent_messages(server: &MockServer) -> Vec<Value> {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one completion request");
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    body["messages"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_single_question_sends_context_and_question() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body(json!(
            "<p>Watch input costs.</p>"
        ))))
        .expect(1)
        .mount(&server)
        .await;

    let (store, _tmp) = common::create_temp_store();
    seed_review_note(&store, "alice").await;
    let service = common::service_for(&common::mock_config(&server.uri(), Some("alice")), store);

    let answer = service
        .ask_about_notes(&["Any risks?"], &[] as &[&str])
        .await
        .unwrap();
    assert_eq!(answer, "<p>Watch input costs.</p>");

    let messages = sent_messages(&server).await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    let context = messages[0]["content"].as_str().unwrap();
    assert!(context.contains("<h3>Q1 Review</h3>"));
    assert!(context.contains("href=\"https://x.test\""));
    assert!(context.contains("Growth strong"));
    assert!(context.contains("2024-03-01 09:30 UTC"));
    assert!(!context.contains("Updated:"));
    assert_eq!(messages[1], json!({ "role": "user", "content": "Any risks?" }));
}

#[tokio::test]
async fn test_history_is_replayed_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body(json!("A2"))))
        .expect(1)
        .mount(&server)
        .await;

    let (store, _tmp) = common::create_temp_store();
    seed_review_note(&store, "alice").await;
    let service = common::service_for(&common::mock_config(&server.uri(), Some("alice")), store);

    service
        .ask_about_notes(&["Q1", "Q2"], &["A1"])
        .await
        .unwrap();

    let messages = sent_messages(&server).await;
    let roles: Vec<&str> = messages
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    assert_eq!(messages[1]["content"], "Q1");
    assert_eq!(messages[2]["content"], "A1");
    assert_eq!(messages[3]["content"], "Q2");
}

#[tokio::test]
async fn test_empty_corpus_never_calls_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body(json!("nope"))))
        .expect(0)
        .mount(&server)
        .await;

    let (store, _tmp) = common::create_temp_store();
    seed_review_note(&store, "bob").await;
    let service = common::service_for(&common::mock_config(&server.uri(), Some("alice")), store);

    let answer = service
        .ask_about_notes(&["Anything?"], &[] as &[&str])
        .await
        .unwrap();
    assert_eq!(answer, EMPTY_CORPUS_MESSAGE);
}

#[tokio::test]
async fn test_anonymous_caller_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body(json!("nope"))))
        .expect(0)
        .mount(&server)
        .await;

    let (store, _tmp) = common::create_temp_store();
    seed_review_note(&store, "alice").await;
    let service = common::service_for(&common::mock_config(&server.uri(), None), store);

    let err = service
        .ask_about_notes(&["Q"], &[] as &[&str])
        .await
        .unwrap_err();
    assert!(error::is_unauthorized(&err));
}

#[tokio::test]
async fn test_null_content_returns_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body(Value::Null)))
        .mount(&server)
        .await;

    let (store, _tmp) = common::create_temp_store();
    seed_review_note(&store, "alice").await;
    let service = common::service_for(&common::mock_config(&server.uri(), Some("alice")), store);

    let answer = service
        .ask_about_notes(&["Q"], &[] as &[&str])
        .await
        .unwrap();
    assert_eq!(answer, MALFORMED_RESPONSE_FALLBACK);
}

#[tokio::test]
async fn test_rate_limit_is_strict_in_ask_and_converted_in_entry_point() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .expect(2)
        .mount(&server)
        .await;

    let (store, _tmp) = common::create_temp_store();
    seed_review_note(&store, "alice").await;
    let service = common::service_for(&common::mock_config(&server.uri(), Some("alice")), store);

    let err = service.ask(&["Q"], &[] as &[&str]).await.unwrap_err();
    assert!(error::is_transport_failure(&err));

    let answer = service
        .ask_about_notes(&["Q"], &[] as &[&str])
        .await
        .unwrap();
    assert_eq!(answer, TRANSPORT_FAILURE_FALLBACK);
}

#[tokio::test]
async fn test_answers_are_sanitized_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body(json!(
            "<p onclick=\"steal()\">Fine</p><script>steal()</script>"
        ))))
        .mount(&server)
        .await;

    let (store, _tmp) = common::create_temp_store();
    seed_review_note(&store, "alice").await;
    let service = common::service_for(&common::mock_config(&server.uri(), Some("alice")), store);

    let answer = service
        .ask_about_notes(&["Q"], &[] as &[&str])
        .await
        .unwrap();
    assert_eq!(answer, "<p>Fine</p>");
}

#[tokio::test]
async fn test_note_actions_feed_the_next_question() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body(json!("ok"))))
        .mount(&server)
        .await;

    let (store, _tmp) = common::create_temp_store();
    let service = common::service_for(&common::mock_config(&server.uri(), Some("alice")), store);

    let note = service
        .create_note("Title: Draft\nfirst thought")
        .await
        .unwrap();
    service
        .update_note(&note.id, "Title: Draft\nsecond thought")
        .await
        .unwrap();
    service.ask_about_notes(&["Q"], &[] as &[&str]).await.unwrap();

    let messages = sent_messages(&server).await;
    let context = messages[0]["content"].as_str().unwrap();
    assert!(context.contains("second thought"));
    assert!(!context.contains("first thought"));
}
