//! Prompts for story generation.

use crate::story::GenerationRequest;

/// Persona and output contract sent as the system prompt.
pub const SYSTEM_PROMPT: &str = "You are an expert author who writes short stories \
for children who are learning to read. Write the perfect, age-appropriate short story \
for the given topic, sentence count and any other details. Return the title of the story \
and its sentences, with the sentences organized into an array of strings in reading order.";

/// Build the user prompt for a story request.
pub fn build_story_prompt(request: &GenerationRequest) -> String {
    format!(
        r#"Create a story for a child in grade "{grade}" with the topic:

<topic>{topic}</topic>

The story should not include words that are too difficult for a child in this grade. The story should include some sight words appropriate for this grade.

The story should be no more than {count} sentences long."#,
        grade = request.grade_level.trim(),
        topic = request.topic.trim(),
        count = request.sentence_count,
    )
}
