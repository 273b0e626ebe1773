//! Chat-completion client
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint fronted by
//! RapidAPI. One prompt in, one extracted reply out; no streaming, no
//! conversation state.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Extracted reply from a chat completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Provider-assigned completion id
    pub id: String,
    /// Content of the first choice's message
    pub message: String,
    /// Model that produced the completion
    pub model: String,
    /// Why the completion stopped (e.g. "stop", "length")
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    id: String,
    model: String,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl TryFrom<ChatResponse> for ChatReply {
    type Error = Error;

    fn try_from(response: ChatResponse) -> Result<Self> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Chat("completion contains no choices".to_string()))?;

        Ok(Self {
            id: response.id,
            message: choice.message.content,
            model: response.model,
            finish_reason: choice.finish_reason,
        })
    }
}

/// Parse a chat-completion payload and extract the reply
///
/// # Errors
///
/// Returns error if the payload is not valid JSON, a required field is
/// absent, or the choice list is empty
pub fn parse_completion(body: &str) -> Result<ChatReply> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    ChatReply::try_from(parsed)
}

/// Sends prompts to the chat-completion endpoint
pub struct ChatClient {
    client: reqwest::Client,
    host: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(host: String, api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "RapidAPI key required for chat completions".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            host,
            api_key,
            model,
        })
    }

    /// Ask the model a single user prompt and extract its reply
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the provider rejects it, or the
    /// completion payload is missing required fields.
    pub async fn ask(&self, prompt: &str) -> Result<ChatReply> {
        let url = format!("https://{}/chat/completions", self.host);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "sending chat completion");

        let response = self
            .client
            .post(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat API error");
            return Err(Error::Chat(format!("chat API error {status}: {body}")));
        }

        let body = response.text().await?;
        let reply = parse_completion(&body)?;

        tracing::info!(
            id = %reply.id,
            model = %reply.model,
            finish_reason = reply.finish_reason.as_deref().unwrap_or("?"),
            reply_chars = reply.message.len(),
            "chat completion received"
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "chatcmpl-7a1",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo-0613",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": "Hello there!"},
                "finish_reason": "stop"
            }
        ],
        "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
    }"#;

    #[test]
    fn extracts_first_choice() {
        let parsed: ChatResponse = serde_json::from_str(SAMPLE).unwrap();
        let reply = ChatReply::try_from(parsed).unwrap();

        assert_eq!(reply.id, "chatcmpl-7a1");
        assert_eq!(reply.message, "Hello there!");
        assert_eq!(reply.model, "gpt-3.5-turbo-0613");
        assert_eq!(reply.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn empty_choices_is_an_error() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id": "chatcmpl-7a2", "model": "gpt-3.5-turbo", "choices": []}"#,
        )
        .unwrap();

        let err = ChatReply::try_from(parsed).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn missing_message_content_fails_parse() {
        let result: std::result::Result<ChatResponse, _> = serde_json::from_str(
            r#"{"id": "x", "model": "m", "choices": [{"message": {"role": "assistant"}}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn request_serializes_single_user_message() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
