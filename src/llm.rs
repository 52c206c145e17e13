use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GenerationError;
use crate::models::Prompt;
use crate::prompt::SYSTEM_PROMPT;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const TEMPERATURE: f32 = 0.7;

/// Turns a prompt into raw model text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for any OpenAI-compatible chat completions endpoint
/// (OpenAI itself, OpenRouter, a local gateway).
pub struct ChatCompletionsClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(api_url: String, api_key: String, model: String) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }
}

impl TextGenerator for ChatCompletionsClient {
    fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: prompt.as_str(),
                },
            ],
            temperature: TEMPERATURE,
        };

        info!(model = self.model.as_str(), prompt_chars = prompt.as_str().len(), "Calling LLM API");
        let start = Instant::now();

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply = parse_completion(&text)?;
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            reply_chars = reply.len(),
            "LLM API call succeeded"
        );
        Ok(reply)
    }
}

/// Pulls the first choice's content out of a chat completions payload.
pub fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body)?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_returns_first_choice() {
        let body = r##"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "# Title\n\nBody"}},
                {"index": 1, "message": {"role": "assistant", "content": "other"}}
            ]
        }"##;
        assert_eq!(parse_completion(body).unwrap(), "# Title\n\nBody");
    }

    #[test]
    fn test_parse_completion_rejects_empty_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "  \n"}}]}"#;
        assert!(matches!(parse_completion(body), Err(GenerationError::EmptyResponse)));

        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert!(matches!(parse_completion(body), Err(GenerationError::EmptyResponse)));

        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_completion_rejects_malformed_payload() {
        assert!(matches!(
            parse_completion("upstream connect error"),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_request_serializes_system_and_user_messages() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![
                Message { role: "system", content: SYSTEM_PROMPT },
                Message { role: "user", content: "write" },
            ],
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "write");
    }
}
