//! Testing utilities for story generation.
//!
//! `MockProvider` replays scripted model replies so the generator, store
//! and HTTP layer can be exercised without API calls.

use crate::provider::{StoryProvider, ToolCall, ToolInvocation};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A scripted reply from the mock model.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return these tool invocations.
    Invocations(Vec<ToolInvocation>),
    /// Fail the call as if the provider were unreachable.
    Failure(String),
}

impl MockReply {
    /// A well-formed `provide_story` call.
    pub fn story(title: &str, sentences: &[&str]) -> Self {
        let arguments = serde_json::json!({
            "title": title,
            "sentences": sentences,
        });
        Self::raw_arguments(arguments.to_string())
    }

    /// A `provide_story` call with arbitrary argument text.
    pub fn raw_arguments(arguments: impl Into<String>) -> Self {
        MockReply::Invocations(vec![ToolInvocation::new("provide_story", arguments)])
    }

    /// A reply with no tool call at all.
    pub fn no_tool_call() -> Self {
        MockReply::Invocations(Vec::new())
    }

    /// A provider failure.
    pub fn failure(message: impl Into<String>) -> Self {
        MockReply::Failure(message.into())
    }
}

/// A provider that returns scripted replies in order.
///
/// Once the script runs out every call fails.
#[derive(Debug, Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<ToolCall>>,
}

impl MockProvider {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a reply to the end of the script.
    pub fn queue_reply(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<ToolCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl StoryProvider for MockProvider {
    async fn invoke_tool(&self, call: ToolCall) -> Result<Vec<ToolInvocation>, claude::Error> {
        lock(&self.calls).push(call);

        match lock(&self.replies).pop_front() {
            Some(MockReply::Invocations(invocations)) => Ok(invocations),
            Some(MockReply::Failure(message)) => Err(claude::Error::Network(message)),
            None => Err(claude::Error::Network(
                "mock provider has no more scripted replies".to_string(),
            )),
        }
    }
}
