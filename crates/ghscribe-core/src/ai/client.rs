// SPDX-License-Identifier: Apache-2.0

//! HTTP client for an OpenAI-compatible chat completions endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use super::CompletionProvider;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::{AiConfig, COMPLETION_API_KEY_ENV};
use crate::error::ScribeError;

/// Chat completions client.
///
/// Sends exactly one request per [`CompletionProvider::complete`] call; any
/// failure is returned to the caller without retrying.
#[derive(Debug)]
pub struct OpenAiClient {
    http: Client,
    api_url: String,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiClient {
    /// Creates a client from configuration and an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: SecretString, config: &AiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.api_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(ScribeError::Network)?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                return Err(ScribeError::Completion {
                    message: format!(
                        "Invalid API key. Check your {COMPLETION_API_KEY_ENV} environment variable."
                    ),
                    status: Some(status.as_u16()),
                }
                .into());
            }
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("Rate limited by completion service");
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(0);
                debug!(retry_after, "Parsed Retry-After header");
                return Err(ScribeError::RateLimited { retry_after }.into());
            }
            let body = response.text().await.unwrap_or_default();
            return Err(ScribeError::Completion {
                message: format!("HTTP {}: {body}", status.as_u16()),
                status: Some(status.as_u16()),
            }
            .into());
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ScribeError::Completion {
                message: "response contained no choices".to_string(),
                status: None,
            })?;

        debug!(chars = content.len(), "Received completion");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> OpenAiClient {
        let config = AiConfig {
            api_url: format!("{}/v1/chat/completions", server.uri()),
            ..AiConfig::default()
        };
        OpenAiClient::new(SecretString::from("sk-test"), &config).unwrap()
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("be brief"), ChatMessage::user("hello")]
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 1500,
                "messages": [{"role": "system", "content": "be brief"}, {"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Looks good."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).await.complete(&messages()).await.unwrap();
        assert_eq!(text, "Looks good.");
    }

    #[tokio::test]
    async fn test_unauthorized_names_key_variable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .complete(&messages())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_rate_limited_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .complete(&messages())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScribeError>(),
            Some(ScribeError::RateLimited { retry_after: 17 })
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .complete(&messages())
            .await
            .unwrap_err();
        match err.downcast_ref::<ScribeError>() {
            Some(ScribeError::Completion { message, status }) => {
                assert_eq!(*status, Some(503));
                assert!(message.contains("overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .complete(&messages())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
