//! Story generation against a scripted provider and a real SQLite file.

use reader_core::{
    ErrorKind, GenerationRequest, MockProvider, MockReply, StoryGenerator, StoryStore,
    ToolInvocation,
};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: StoryStore,
    provider: Arc<MockProvider>,
    generator: StoryGenerator,
}

async fn fixture(replies: Vec<MockReply>) -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("stories.sqlite").display());
    let store = StoryStore::connect(&url).await.expect("Store should open");
    let provider = Arc::new(MockProvider::new(replies));
    let generator = StoryGenerator::new(provider.clone(), store.clone());

    Fixture {
        _dir: dir,
        store,
        provider,
        generator,
    }
}

fn dinosaur_request() -> GenerationRequest {
    GenerationRequest::new("dinosaurs", 3, "2")
}

#[tokio::test]
async fn test_generated_story_is_listed_with_identical_content() {
    let f = fixture(vec![MockReply::story(
        "Dino Day",
        &["A dino ran.", "It was big.", "The end."],
    )])
    .await;

    let story = f
        .generator
        .generate(&dinosaur_request())
        .await
        .expect("Generation should succeed");

    assert_eq!(story.title, "Dino Day");
    assert_eq!(story.sentences, vec!["A dino ran.", "It was big.", "The end."]);
    assert_eq!(story.grade_level, "2");
    assert_eq!(story.topic, "dinosaurs");

    let listed = f.store.list_stories().await.unwrap();
    assert_eq!(listed, vec![story]);
}

#[tokio::test]
async fn test_provider_receives_forced_story_tool() {
    let f = fixture(vec![MockReply::story("T", &["One."])]).await;
    f.generator.generate(&dinosaur_request()).await.unwrap();

    let calls = f.provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].tool.name, "provide_story");
    assert!(calls[0].prompt.contains("<topic>dinosaurs</topic>"));
    assert!(calls[0].prompt.contains("no more than 3 sentences"));
    assert!(calls[0].system.contains("children"));
}

#[tokio::test]
async fn test_missing_tool_call_is_a_contract_violation() {
    let f = fixture(vec![
        MockReply::no_tool_call(),
        MockReply::Invocations(vec![ToolInvocation::new("other_tool", "{}")]),
    ])
    .await;

    for _ in 0..2 {
        let err = f.generator.generate(&dinosaur_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContractViolation);
    }
    assert!(f.store.list_stories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_json_arguments_are_a_parse_error() {
    let f = fixture(vec![
        MockReply::raw_arguments("{\"title\": \"Dino Day\", \"sentences\": ["),
        MockReply::raw_arguments(r#"{"title": "Dino Day", "sentences": []}"#),
        MockReply::raw_arguments(r#"{"title": "Dino Day", "sentences": ["", "  "]}"#),
        MockReply::story("Dino Day", &["A dino ran.", "\t"]),
    ])
    .await;

    for _ in 0..4 {
        let err = f.generator.generate(&dinosaur_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
    assert!(f.store.list_stories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_failure_is_an_external_service_error() {
    let f = fixture(vec![MockReply::failure("quota exceeded")]).await;

    let err = f.generator.generate(&dinosaur_request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn test_invalid_request_never_reaches_the_provider() {
    let f = fixture(vec![MockReply::story("T", &["One."])]).await;

    let err = f
        .generator
        .generate(&GenerationRequest::new("dinosaurs", 0, "2"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(f.provider.call_count(), 0);
}

#[tokio::test]
async fn test_storage_failure_fails_generation() {
    let f = fixture(vec![MockReply::story("Lost", &["Gone."])]).await;
    f.store.close().await;

    let err = f.generator.generate(&dinosaur_request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[tokio::test]
async fn test_n_creations_list_n_unique_ids() {
    let f = fixture(Vec::new()).await;
    assert!(f.store.list_stories().await.unwrap().is_empty());

    for i in 0..4 {
        f.provider
            .queue_reply(MockReply::story(&format!("Story {i}"), &["Hello."]));
        f.generator.generate(&dinosaur_request()).await.unwrap();
    }

    let stories = f.store.list_stories().await.unwrap();
    assert_eq!(stories.len(), 4);

    let mut ids: Vec<_> = stories.iter().map(|s| s.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}
