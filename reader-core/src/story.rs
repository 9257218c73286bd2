//! Story records and generation requests.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Store-assigned story identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub i64);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A generated story as stored and served.
///
/// Stories are written once and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    /// Story body in reading order.
    pub sentences: Vec<String>,
    pub grade_level: String,
    pub topic: String,
}

/// A story that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub title: String,
    pub sentences: Vec<String>,
    pub grade_level: String,
    pub topic: String,
}

impl NewStory {
    /// Attach the id the store assigned on insert.
    pub fn with_id(self, id: StoryId) -> Story {
        Story {
            id,
            title: self.title,
            sentences: self.sentences,
            grade_level: self.grade_level,
            topic: self.topic,
        }
    }
}

/// Parameters for a new story, as posted by the reading app.
///
/// The browser form submits every field as text, so `sentenceCount` and
/// `gradeLevel` accept either JSON numbers or strings. Older clients send
/// `grade` instead of `gradeLevel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub topic: String,
    /// Upper bound on the number of sentences.
    #[serde(deserialize_with = "count_from_number_or_text")]
    pub sentence_count: u32,
    #[serde(alias = "grade", deserialize_with = "label_from_number_or_text")]
    pub grade_level: String,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, sentence_count: u32, grade_level: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            sentence_count,
            grade_level: grade_level.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

fn count_from_number_or_text<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| D::Error::custom(format!("sentence count out of range: {n}"))),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid sentence count: {s:?}"))),
    }
}

fn label_from_number_or_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    })
}
