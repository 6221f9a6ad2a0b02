use anyhow::{Context, Result};
use reqwest::Response;
use serde::{Deserialize, Serialize};

pub fn build_request(
    model: String,
    temperature: f32,
    system_instruction: &str,
    user_message: &str,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: system_instruction.to_string(),
            },
            ChatMessage {
                role: "user".into(),
                content: user_message.to_string(),
            },
        ],
        temperature,
    }
}

pub async fn parse_response(response: Response) -> Result<String> {
    let completion: ChatCompletionResponse = response
        .json()
        .await
        .context("chat completion response was not valid JSON")?;
    first_content(completion)
}

pub fn first_content(completion: ChatCompletionResponse) -> Result<String> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .context("chat completion response did not contain any choices")?;

    choice
        .message
        .and_then(|msg| msg.content)
        .context("chat completion response missing message content")
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}
