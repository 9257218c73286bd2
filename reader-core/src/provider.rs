//! Model provider seam.
//!
//! The generator only needs one thing from a model: run a prompt with a
//! single forced tool and report which tool invocations came back.

use async_trait::async_trait;
use claude::{Claude, Message, Request, Tool};

/// A prompt that must be answered through `tool`.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub system: String,
    pub prompt: String,
    pub tool: Tool,
    pub model: Option<String>,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
}

/// One tool invocation from the model, with its arguments as JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: String,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// What the model did with the forced tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolReply {
    /// Exactly one invocation of the expected tool.
    Invoked(ToolInvocation),
    /// No usable invocation; `found` counts invocations of the expected tool.
    Absent { found: usize },
}

impl ToolReply {
    /// Pick the single invocation named `tool` out of a model reply.
    pub fn select(invocations: Vec<ToolInvocation>, tool: &str) -> Self {
        let mut matching: Vec<_> = invocations
            .into_iter()
            .filter(|invocation| invocation.name == tool)
            .collect();

        if matching.len() == 1 {
            ToolReply::Invoked(matching.remove(0))
        } else {
            ToolReply::Absent {
                found: matching.len(),
            }
        }
    }
}

/// A model that can be asked for a forced tool call.
#[async_trait]
pub trait StoryProvider: Send + Sync {
    /// Run the call and return every tool invocation in the reply.
    async fn invoke_tool(&self, call: ToolCall) -> Result<Vec<ToolInvocation>, claude::Error>;
}

#[async_trait]
impl StoryProvider for Claude {
    async fn invoke_tool(&self, call: ToolCall) -> Result<Vec<ToolInvocation>, claude::Error> {
        let mut request = Request::new(vec![Message::user(call.prompt)])
            .with_system(call.system)
            .with_max_tokens(call.max_tokens)
            .forcing_tool(call.tool);

        if let Some(model) = call.model {
            request = request.with_model(model);
        }
        if let Some(temperature) = call.temperature {
            request = request.with_temperature(temperature);
        }

        let response = self.complete(request).await?;

        Ok(response
            .tool_uses()
            .map(|tool_use| ToolInvocation::new(tool_use.name.clone(), tool_use.input.to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_single_match() {
        let reply = ToolReply::select(
            vec![
                ToolInvocation::new("other_tool", "{}"),
                ToolInvocation::new("provide_story", r#"{"title":"T"}"#),
            ],
            "provide_story",
        );
        assert_eq!(
            reply,
            ToolReply::Invoked(ToolInvocation::new("provide_story", r#"{"title":"T"}"#))
        );
    }

    #[test]
    fn test_select_none() {
        let reply = ToolReply::select(vec![ToolInvocation::new("other_tool", "{}")], "provide_story");
        assert_eq!(reply, ToolReply::Absent { found: 0 });
        assert_eq!(ToolReply::select(Vec::new(), "provide_story"), ToolReply::Absent { found: 0 });
    }

    #[test]
    fn test_select_rejects_duplicates() {
        let reply = ToolReply::select(
            vec![
                ToolInvocation::new("provide_story", "{}"),
                ToolInvocation::new("provide_story", "{}"),
            ],
            "provide_story",
        );
        assert_eq!(reply, ToolReply::Absent { found: 2 });
    }
}
