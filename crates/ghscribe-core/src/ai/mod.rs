// SPDX-License-Identifier: Apache-2.0

//! Completion service integration.
//!
//! The review step only needs "messages in, text out", expressed by
//! [`CompletionProvider`]. [`OpenAiClient`] is the HTTP implementation.

pub mod client;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use client::OpenAiClient;
pub use types::ChatMessage;

/// Generates text from a role-tagged message sequence.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model identifier, shown in generated comments.
    fn model(&self) -> &str;

    /// Sends one completion request and returns the generated text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
