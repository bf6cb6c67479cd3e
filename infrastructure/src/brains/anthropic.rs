//! Anthropic messages API adapter (non-streaming)

use super::http::{api_key_from_env, check_status, client, dialogue, request_error, trim_base_url};
use async_trait::async_trait;
use mirror_application::{
    BrainAdapter, BrainCapabilities, BrainError, BrainProvider, ChatOptions, ChunkStream,
    PingResult,
};
use mirror_domain::{CompletedResponse, ConversationMessage, Role, StreamChunk};
use serde_json::{Value, json};
use std::time::Instant;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

pub struct AnthropicBrain {
    id: String,
    model: String,
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl AnthropicBrain {
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: Option<&str>,
    ) -> Result<Self, BrainError> {
        Ok(Self {
            id: id.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: trim_base_url(base_url.unwrap_or(DEFAULT_BASE_URL)),
            http: client()?,
        })
    }

    pub fn from_env(
        id: impl Into<String>,
        model: impl Into<String>,
        api_key_env: &str,
        base_url: Option<&str>,
    ) -> Result<Self, BrainError> {
        Self::new(id, model, api_key_from_env(api_key_env)?, base_url)
    }

    fn request_body(
        &self,
        messages: &[ConversationMessage],
        system_prompt: &str,
        options: &ChatOptions,
    ) -> Value {
        let api_messages: Vec<Value> = dialogue(messages)
            .map(|m| {
                let role = if m.role == Role::Assistant {
                    "assistant"
                } else {
                    "user"
                };
                json!({ "role": role, "content": m.content })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "system": system_prompt,
            "messages": api_messages,
        });
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
    }
}

/// Joined, trimmed text blocks plus usage
pub(crate) fn parse_message_response(body: &Value) -> Result<CompletedResponse, BrainError> {
    let blocks = body["content"]
        .as_array()
        .ok_or_else(|| BrainError::InvalidResponse("missing content array".to_string()))?;

    let text: String = blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect();

    Ok(CompletedResponse {
        text: text.trim().to_string(),
        input_tokens: body["usage"]["input_tokens"].as_u64(),
        output_tokens: body["usage"]["output_tokens"].as_u64(),
    })
}

#[async_trait]
impl BrainAdapter for AnthropicBrain {
    fn id(&self) -> &str {
        &self.id
    }

    fn provider(&self) -> BrainProvider {
        BrainProvider::Anthropic
    }

    fn capabilities(&self) -> BrainCapabilities {
        BrainCapabilities {
            streaming: false,
            max_context_tokens: Some(200_000),
        }
    }

    async fn ping(&self) -> PingResult {
        let start = Instant::now();
        let request = self.authorized(self.http.get(format!("{}/models", self.base_url)));
        match request.send().await.map_err(request_error) {
            Ok(response) => match check_status(response).await {
                Ok(_) => PingResult::ok(Some(start.elapsed().as_millis() as u64)),
                Err(e) => PingResult::failed(e.to_string()),
            },
            Err(e) => PingResult::failed(e.to_string()),
        }
    }

    async fn chat(
        &self,
        messages: &[ConversationMessage],
        system_prompt: &str,
        options: &ChatOptions,
    ) -> Result<ChunkStream, BrainError> {
        let body = self.request_body(messages, system_prompt, options);
        debug!("POST {}/messages model={}", self.base_url, self.model);

        let request = async {
            let response = self
                .authorized(self.http.post(format!("{}/messages", self.base_url)))
                .json(&body)
                .send()
                .await
                .map_err(request_error)?;
            let body: Value = check_status(response)
                .await?
                .json()
                .await
                .map_err(|e| BrainError::InvalidResponse(e.to_string()))?;
            parse_message_response(&body)
        };
        let completed = match options.cancellation.as_ref() {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(BrainError::Cancelled),
                completed = request => completed,
            },
            None => request.await,
        }?;
        Ok(ChunkStream::from_items(vec![Ok(StreamChunk::final_chunk(
            completed.text,
            completed.input_tokens,
            completed.output_tokens,
        ))]))
    }
}
