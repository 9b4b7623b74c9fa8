//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LlmError;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.65;

/// Output token ceiling sent with every request.
pub const MAX_TOKENS: u32 = 550;

/// A system + user instruction pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// The extracted completion text and the raw response body it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub raw: String,
}

/// Anything that can turn a prompt pair into text.
///
/// This abstraction allows mocking the endpoint in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Request a single completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for `POST {api_base}/chat/completions`.
///
/// Does NOT derive Debug so the API key stays out of logs.
pub struct ChatCompletionsClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            n: 1,
        };

        debug!("Requesting completion from {} ({})", self.endpoint(), self.model);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Transport)?;

        let status = response.status();
        let raw = response.text().await.map_err(LlmError::Transport)?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LlmError::Unauthorized {
                    status: status.as_u16(),
                });
            }
            s if !s.is_success() => {
                return Err(LlmError::Status {
                    status: s.as_u16(),
                    body: raw,
                });
            }
            _ => {}
        }

        let content = parse_completion(&raw)?;
        Ok(Completion { content, raw })
    }
}

/// Pull the trimmed first-choice content out of a response body.
fn parse_completion(raw: &str) -> Result<String, LlmError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(raw).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(LlmError::MissingContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_takes_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  hello  "}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_completion(raw).unwrap(), "hello");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let err = parse_completion(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, LlmError::MissingContent));
    }

    #[test]
    fn test_parse_completion_with_null_content() {
        let err = parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert!(matches!(err, LlmError::MissingContent));
    }

    #[test]
    fn test_parse_completion_missing_choices_field() {
        let err = parse_completion(r#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, LlmError::MissingContent));
    }

    #[test]
    fn test_parse_completion_not_json() {
        let err = parse_completion("<html>oops</html>").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = ChatCompletionsClient::new("https://api.example.com/v1/", "k", "m");
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
    }
}
