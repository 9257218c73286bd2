//! Integration test that calls the real Claude API.
//!
//! Requires ANTHROPIC_API_KEY (via .env file or environment).
//! Run with: `cargo test -p reader-core --test api_integration -- --ignored`

use reader_core::{GenerationRequest, StoryGenerator, StoryStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

#[tokio::test]
#[ignore] // Costs API credits and needs network access
async fn test_real_model_returns_a_story() {
    setup();
    let Ok(client) = claude::Claude::from_env() else {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    };

    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("live.sqlite").display());
    let store = StoryStore::connect(&url).await.expect("Store should open");
    let generator = StoryGenerator::new(Arc::new(client), store.clone());

    let story = generator
        .generate(&GenerationRequest::new("a puppy at the beach", 4, "1"))
        .await
        .expect("Model should provide a story");

    println!("{}", story.title);
    for sentence in &story.sentences {
        println!("  {sentence}");
    }

    assert!(!story.title.is_empty());
    assert!(!story.sentences.is_empty());
    assert_eq!(store.list_stories().await.unwrap().len(), 1);
}
