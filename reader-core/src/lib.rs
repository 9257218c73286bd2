//! Children's reading stories generated by a language model.
//!
//! This crate provides:
//! - The story model and SQLite-backed story store
//! - Sight-word mapping lookup
//! - The story generator, which forces the model through a `provide_story` tool
//! - A scripted mock provider for tests
//!
//! # Quick Start
//!
//! ```ignore
//! use reader_core::{GenerationRequest, StoryGenerator, StoryStore, WordMappings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = StoryStore::connect("sqlite://database.sqlite").await?;
//!     let mappings = WordMappings::load("word_mappings.json")?;
//!     let generator = StoryGenerator::new(Arc::new(claude::Claude::from_env()?), store);
//!
//!     let story = generator
//!         .generate(&GenerationRequest::new("dinosaurs", 3, "2"))
//!         .await?;
//!     println!("{}: {:?}", story.title, mappings.relevant_mappings(&story.sentences));
//!     Ok(())
//! }
//! ```

pub mod generator;
pub mod prompt;
pub mod provider;
pub mod store;
pub mod story;
pub mod testing;
pub mod word_map;

pub use generator::{ErrorKind, GenerationError, GeneratorConfig, ProvideStory, StoryGenerator};
pub use provider::{StoryProvider, ToolCall, ToolInvocation, ToolReply};
pub use store::{StoreError, StoryStore};
pub use story::{GenerationRequest, NewStory, Story, StoryId};
pub use testing::{MockProvider, MockReply};
pub use word_map::{PhonemeMapping, WordMapError, WordMappings};
