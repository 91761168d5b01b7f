//! Model completion interface.
//!
//! The core hands the client a system context, the prior analyses of the open
//! day, and one payload (text, or a photo reference with an optional
//! caption); everything transport-level stays in here. `OpenAiClient` speaks
//! the chat-completions wire format; tests swap in a canned client through
//! the `Arc<dyn ModelClient>` seam in `AppState`.

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::ModelConfig;

#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    /// `photo_ref` is an opaque image reference (https or data URL) the
    /// transport already resolved; the core never touches image bytes.
    Photo {
        photo_ref: String,
        caption: Option<String>,
    },
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(
        &self,
        system_context: &str,
        history: &[String],
        payload: Payload,
    ) -> anyhow::Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: serde_json::Value,
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

fn build_messages(system_context: &str, history: &[String], payload: Payload) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage {
        role: "system",
        content: json!(system_context),
    });
    // Прошлые анализы дня — как прежние ответы ассистента
    for analysis in history {
        messages.push(ChatMessage {
            role: "assistant",
            content: json!(analysis),
        });
    }
    let content = match payload {
        Payload::Text(text) => json!(text),
        Payload::Photo { photo_ref, caption } => {
            let mut parts = vec![json!({
                "type": "image_url",
                "image_url": { "url": photo_ref },
            })];
            if let Some(caption) = caption {
                parts.push(json!({ "type": "text", "text": caption }));
            }
            json!(parts)
        }
    };
    messages.push(ChatMessage {
        role: "user",
        content,
    });
    messages
}

pub struct OpenAiClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl OpenAiClient {
    pub fn new(config: ModelConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("create http client")?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(
        &self,
        system_context: &str,
        history: &[String],
        payload: Payload,
    ) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: build_messages(system_context, history, payload),
            max_tokens: self.config.max_tokens,
        };
        debug!(model = %self.config.model, messages = request.messages.len(), "model request");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("model request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("model returned {status}: {body}");
        }

        let parsed: ChatResponse = response.json().await.context("decode model response")?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if text.is_empty() {
            bail!("model returned an empty completion");
        }
        Ok(text)
    }
}
