//! Story generation service.
//!
//! Turns a [`GenerationRequest`] into a stored [`Story`]: build the prompt,
//! force the model through the `provide_story` tool, validate the reply and
//! persist it before handing it back.

use crate::prompt::{build_story_prompt, SYSTEM_PROMPT};
use crate::provider::{StoryProvider, ToolCall, ToolReply};
use crate::store::{StoreError, StoryStore};
use crate::story::{GenerationRequest, NewStory, Story};
use reader_macros::Tool;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Provide the finished children's story
#[derive(Debug, Tool, Deserialize)]
#[tool(name = "provide_story")]
pub struct ProvideStory {
    /// The title of the story
    #[tool(min_length = 1)]
    pub title: String,
    /// The sentences of the story, in reading order, one string per sentence
    #[tool(min_items = 1, item_min_length = 1)]
    pub sentences: Vec<String>,
}

/// Coarse classification of a [`GenerationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The model call itself failed.
    ExternalService,
    /// The model answered without the required tool call.
    ContractViolation,
    /// The tool call arguments did not match the schema.
    Parse,
    /// The story could not be stored.
    Storage,
    /// The request was rejected before calling the model.
    InvalidRequest,
}

/// Errors from story generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model provider error: {0}")]
    Provider(#[from] claude::Error),

    #[error("Expected exactly one `{tool}` call, found {found}")]
    MissingToolCall { tool: &'static str, found: usize },

    #[error("Malformed `{tool}` arguments: {reason}")]
    MalformedArguments { tool: &'static str, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Provider(_) => ErrorKind::ExternalService,
            GenerationError::MissingToolCall { .. } => ErrorKind::ContractViolation,
            GenerationError::MalformedArguments { .. } => ErrorKind::Parse,
            GenerationError::Storage(_) => ErrorKind::Storage,
            GenerationError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }
}

/// Configuration for story generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model override; `None` uses the provider's default.
    pub model: Option<String>,

    /// Maximum tokens for the reply.
    pub max_tokens: usize,

    /// Temperature for generation.
    pub temperature: Option<f32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 1024,
            temperature: Some(0.8),
        }
    }
}

/// Generates stories with a model and records them in the store.
pub struct StoryGenerator {
    provider: Arc<dyn StoryProvider>,
    store: StoryStore,
    config: GeneratorConfig,
}

impl StoryGenerator {
    pub fn new(provider: Arc<dyn StoryProvider>, store: StoryStore) -> Self {
        Self {
            provider,
            store,
            config: GeneratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Generate, validate and store a story.
    ///
    /// The story is only returned once it has been written; a storage
    /// failure fails the whole call.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Story, GenerationError> {
        validate_request(request)?;

        let call = ToolCall {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_story_prompt(request),
            tool: ProvideStory::as_tool(),
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let invocations = self.provider.invoke_tool(call).await?;
        let tool = ProvideStory::tool_name();

        let invocation = match ToolReply::select(invocations, tool) {
            ToolReply::Invoked(invocation) => invocation,
            ToolReply::Absent { found } => {
                return Err(GenerationError::MissingToolCall { tool, found });
            }
        };

        let provided = parse_provided_story(&invocation.arguments).map_err(|reason| {
            log::error!(
                "Unusable `{tool}` arguments ({reason}): {}",
                invocation.arguments
            );
            GenerationError::MalformedArguments { tool, reason }
        })?;

        let new_story = NewStory {
            title: provided.title,
            sentences: provided.sentences,
            grade_level: request.grade_level.trim().to_string(),
            topic: request.topic.trim().to_string(),
        };

        let id = self.store.insert_story(&new_story).await?;
        log::info!(
            "Stored story {id} \"{}\" ({} sentences)",
            new_story.title,
            new_story.sentences.len()
        );

        Ok(new_story.with_id(id))
    }
}

fn validate_request(request: &GenerationRequest) -> Result<(), GenerationError> {
    if request.topic.trim().is_empty() {
        return Err(GenerationError::InvalidRequest("topic is empty".to_string()));
    }
    if request.grade_level.trim().is_empty() {
        return Err(GenerationError::InvalidRequest(
            "grade level is empty".to_string(),
        ));
    }
    if request.sentence_count == 0 {
        return Err(GenerationError::InvalidRequest(
            "sentence count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn parse_provided_story(arguments: &str) -> Result<ProvideStory, String> {
    let story: ProvideStory = serde_json::from_str(arguments).map_err(|e| e.to_string())?;

    if story.title.trim().is_empty() {
        return Err("title is empty".to_string());
    }
    if story.sentences.is_empty() {
        return Err("story has no sentences".to_string());
    }
    if let Some(index) = story.sentences.iter().position(|s| s.trim().is_empty()) {
        return Err(format!("sentence {} is blank", index + 1));
    }
    Ok(story)
}
