//! HTTP routes for listing and creating stories.

use crate::assets;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reader_core::{GenerationError, GenerationRequest, StoreError, Story, StoryGenerator, StoryStore, WordMappings};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<StoryGenerator>,
    pub store: StoryStore,
    pub word_mappings: Arc<WordMappings>,
}

impl AppState {
    pub fn new(generator: StoryGenerator, store: StoryStore, word_mappings: WordMappings) -> Self {
        Self {
            generator: Arc::new(generator),
            store,
            word_mappings: Arc::new(word_mappings),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(assets::index))
        .route("/script.js", get(assets::script))
        .route("/stories", get(list_stories).post(create_story))
        .with_state(state)
}

/// Errors surfaced to HTTP clients.
///
/// Every failure inside the service collapses to one generic message; the
/// detail only goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid story request: {0}")]
    BadRequest(String),

    #[error("Failed to create the story.")]
    CreateFailed(#[source] GenerationError),

    #[error("Failed to list stories.")]
    ListFailed(#[source] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(reason) => {
                log::warn!("Rejected story request: {reason}");
                StatusCode::BAD_REQUEST
            }
            ApiError::CreateFailed(err) => {
                log::error!("Story creation failed ({:?}): {err}", err.kind());
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ListFailed(err) => {
                log::error!("Listing stories failed: {err}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoriesResponse {
    stories: Vec<Story>,
    word_mappings: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedStoryResponse {
    story: Story,
    word_mappings: BTreeMap<String, Value>,
}

async fn list_stories(State(state): State<AppState>) -> Result<Json<StoriesResponse>, ApiError> {
    let stories = state
        .store
        .list_stories()
        .await
        .map_err(ApiError::ListFailed)?;
    let sentences: Vec<&str> = stories
        .iter()
        .flat_map(|story| story.sentences.iter().map(String::as_str))
        .collect();
    let word_mappings = state.word_mappings.relevant_mappings(&sentences);

    Ok(Json(StoriesResponse {
        stories,
        word_mappings,
    }))
}

async fn create_story(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<CreatedStoryResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    log::info!(
        "Creating story: topic {:?}, grade {:?}, up to {} sentences",
        request.topic,
        request.grade_level,
        request.sentence_count
    );

    let story = state
        .generator
        .generate(&request)
        .await
        .map_err(ApiError::CreateFailed)?;
    let word_mappings = state.word_mappings.relevant_mappings(&story.sentences);

    Ok(Json(CreatedStoryResponse {
        story,
        word_mappings,
    }))
}
