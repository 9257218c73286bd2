//! Story persistence backed by SQLite.
//!
//! Sentences are kept as a JSON array in a single text column so that
//! order and exact content survive the round trip.

use crate::story::{NewStory, Story, StoryId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;

/// Errors from story storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to encode sentences: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Story {id} has unreadable sentences: {source}")]
    CorruptSentences {
        id: StoryId,
        source: serde_json::Error,
    },
}

const CREATE_STORY_TABLE: &str = "CREATE TABLE IF NOT EXISTS story (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT NOT NULL,
  sentences TEXT NOT NULL,
  grade TEXT NOT NULL,
  topic TEXT NOT NULL
)";

#[derive(Debug, FromRow)]
struct StoryRow {
    id: i64,
    title: String,
    sentences: String,
    grade: String,
    topic: String,
}

impl TryFrom<StoryRow> for Story {
    type Error = StoreError;

    fn try_from(row: StoryRow) -> Result<Self, Self::Error> {
        let id = StoryId(row.id);
        let sentences = serde_json::from_str(&row.sentences)
            .map_err(|source| StoreError::CorruptSentences { id, source })?;
        Ok(Story {
            id,
            title: row.title,
            sentences,
            grade_level: row.grade,
            topic: row.topic,
        })
    }
}

/// Handle to the story table.
///
/// Cloning is cheap; every clone shares the same single connection.
#[derive(Debug, Clone)]
pub struct StoryStore {
    pool: SqlitePool,
}

impl StoryStore {
    /// Open (creating if needed) the database at `url` and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create the story table if it does not exist. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_STORY_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Append a story and return its new id.
    pub async fn insert_story(&self, story: &NewStory) -> Result<StoryId, StoreError> {
        let sentences = serde_json::to_string(&story.sentences)?;
        let result =
            sqlx::query("INSERT INTO story (title, sentences, grade, topic) VALUES (?, ?, ?, ?)")
                .bind(&story.title)
                .bind(&sentences)
                .bind(&story.grade_level)
                .bind(&story.topic)
                .execute(&self.pool)
                .await?;
        Ok(StoryId(result.last_insert_rowid()))
    }

    /// All stories in insertion order.
    pub async fn list_stories(&self) -> Result<Vec<Story>, StoreError> {
        let rows = sqlx::query_as::<_, StoryRow>(
            "SELECT id, title, sentences, grade, topic FROM story ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Story::try_from).collect()
    }

    /// Release the connection. Further calls on any clone will fail.
    pub async fn close(&self) {
        self.pool.close().await;
        log::info!("Database connection closed.");
    }
}
