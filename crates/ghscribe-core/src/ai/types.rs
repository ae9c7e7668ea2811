// SPDX-License-Identifier: Apache-2.0

//! Request and response types for the chat completions API.

use serde::{Deserialize, Serialize};

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the chat completions endpoint.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    /// Model identifier (e.g., "gpt-4o-mini").
    pub model: &'a str,
    /// Conversation so far.
    pub messages: &'a [ChatMessage],
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Response from the chat completions endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Generated choices (usually one).
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// A single generated choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ChatMessage,
}
