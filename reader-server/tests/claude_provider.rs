//! The Claude provider against a local stand-in for the Messages API.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use claude::Claude;
use reader_core::{ErrorKind, GenerationRequest, StoryGenerator, StoryStore};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Scripted `/v1/messages` endpoint that records every request it sees.
#[derive(Clone, Default)]
struct FakeMessagesApi {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

impl FakeMessagesApi {
    fn requests(&self) -> Vec<(HeaderMap, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn messages(
    State(api): State<FakeMessagesApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    api.requests.lock().unwrap().push((headers, body));
    let (status, reply) = api
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "unscripted"})));
    (status, Json(reply))
}

struct Fixture {
    _dir: TempDir,
    api: FakeMessagesApi,
    store: StoryStore,
    generator: StoryGenerator,
}

async fn fixture(replies: Vec<(StatusCode, Value)>) -> Fixture {
    let api = FakeMessagesApi {
        replies: Arc::new(Mutex::new(replies.into())),
        ..Default::default()
    };
    let app = Router::new()
        .route("/v1/messages", post(messages))
        .with_state(api.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Bind should succeed");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });

    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("stories.sqlite").display());
    let store = StoryStore::connect(&url).await.expect("Store should open");

    let client = Claude::new("test-key").with_base_url(format!("http://{addr}"));
    let generator = StoryGenerator::new(Arc::new(client), store.clone());

    Fixture {
        _dir: dir,
        api,
        store,
        generator,
    }
}

fn message(content: Value) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-haiku-20241022",
        "content": content,
        "stop_reason": "tool_use",
        "usage": {"input_tokens": 12, "output_tokens": 34}
    })
}

fn dinosaur_request() -> GenerationRequest {
    GenerationRequest::new("dinosaurs", 3, "2")
}

#[tokio::test]
async fn test_tool_use_reply_becomes_a_stored_story() {
    let f = fixture(vec![(
        StatusCode::OK,
        message(json!([
            {"type": "text", "text": "Here is your story."},
            {
                "type": "tool_use",
                "id": "toolu_01",
                "name": "provide_story",
                "input": {"title": "Dino", "sentences": ["A dino ran.", "It was big."]}
            }
        ])),
    )])
    .await;

    let story = f
        .generator
        .generate(&dinosaur_request())
        .await
        .expect("Generation should succeed");

    assert_eq!(story.title, "Dino");
    assert_eq!(story.sentences, vec!["A dino ran.", "It was big."]);
    assert_eq!(f.store.list_stories().await.unwrap(), vec![story]);

    let requests = f.api.requests();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["x-api-key"], "test-key");
    assert_eq!(headers["anthropic-version"], "2023-06-01");
    assert_eq!(
        body["tool_choice"],
        json!({"type": "tool", "name": "provide_story"})
    );
    assert_eq!(body["tools"].as_array().unwrap().len(), 1);
    assert_eq!(body["tools"][0]["name"], "provide_story");
    assert_eq!(body["tools"][0]["input_schema"]["required"], json!(["title", "sentences"]));
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("<topic>dinosaurs</topic>"));
}

#[tokio::test]
async fn test_rate_limited_reply_is_an_external_service_error() {
    let f = fixture(vec![(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"type": "error", "error": {"type": "rate_limit_error", "message": "slow down"}}),
    )])
    .await;

    let err = f.generator.generate(&dinosaur_request()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err.to_string().contains("status 429"));
    assert!(f.store.list_stories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_text_only_reply_is_a_contract_violation() {
    let f = fixture(vec![(
        StatusCode::OK,
        message(json!([{"type": "text", "text": "Once upon a time..."}])),
    )])
    .await;

    let err = f.generator.generate(&dinosaur_request()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ContractViolation);
    assert!(err.to_string().contains("found 0"));
    assert!(f.store.list_stories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_sentences_from_the_model_are_rejected() {
    let f = fixture(vec![(
        StatusCode::OK,
        message(json!([{
            "type": "tool_use",
            "id": "toolu_02",
            "name": "provide_story",
            "input": {"title": "T", "sentences": ["", "  "]}
        }])),
    )])
    .await;

    let err = f.generator.generate(&dinosaur_request()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(f.store.list_stories().await.unwrap().is_empty());
}
