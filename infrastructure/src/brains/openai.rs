//! OpenAI-compatible chat completions adapter (streaming)

use super::http::{api_key_from_env, check_status, client, dialogue, request_error, trim_base_url};
use super::sse::{SseBuffer, SseEvent};
use async_trait::async_trait;
use futures::StreamExt;
use mirror_application::{
    BrainAdapter, BrainCapabilities, BrainError, BrainProvider, ChatOptions, ChunkSender,
    ChunkStream, PingResult,
};
use mirror_domain::{ConversationMessage, Role, StreamChunk};
use serde_json::{Value, json};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Works with OpenAI and any server implementing its chat completions API.
pub struct OpenAiBrain {
    id: String,
    model: String,
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiBrain {
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

    /// Build from the API key stored in `api_key_env`
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
        let mut api_messages = vec![json!({ "role": "system", "content": system_prompt })];
        api_messages.extend(dialogue(messages).map(|m| {
            let role = if m.role == Role::Assistant {
                "assistant"
            } else {
                "user"
            };
            json!({ "role": role, "content": m.content })
        }));

        let mut body = json!({
            "model": self.model,
            "stream": true,
            "stream_options": { "include_usage": true },
            "messages": api_messages,
        });
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

/// Text delta and usage carried by one streamed completion event
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CompletionDelta {
    pub content: Option<String>,
    pub usage: Option<(u64, u64)>,
}

pub(crate) fn parse_stream_event(event: &Value) -> CompletionDelta {
    let content = event["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let usage = event
        .get("usage")
        .filter(|u| !u.is_null())
        .map(|u| {
            (
                u["prompt_tokens"].as_u64().unwrap_or(0),
                u["completion_tokens"].as_u64().unwrap_or(0),
            )
        });
    CompletionDelta { content, usage }
}

async fn pump_sse(
    response: reqwest::Response,
    tx: ChunkSender,
    token: CancellationToken,
) {
    let mut bytes = response.bytes_stream();
    let mut buffer = SseBuffer::new();
    let mut usage: Option<(u64, u64)> = None;

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                let _ = tx.send(Err(BrainError::Cancelled)).await;
                return;
            }
            _ = tx.closed() => return,
            next = bytes.next() => next,
        };
        let Some(next) = next else { break };

        let data = match next {
            Ok(data) => data,
            Err(e) => {
                let _ = tx
                    .send(Err(BrainError::Stream(format!("Stream read error: {e}"))))
                    .await;
                return;
            }
        };

        for event in buffer.push(&data) {
            let SseEvent::Data(payload) = event else {
                continue;
            };
            let Ok(value) = serde_json::from_str::<Value>(&payload) else {
                debug!("Skipping unparseable SSE payload");
                continue;
            };
            let delta = parse_stream_event(&value);
            if delta.usage.is_some() {
                usage = delta.usage;
            }
            if let Some(content) = delta.content {
                if tx.send(Ok(StreamChunk::delta(content))).await.is_err() {
                    return;
                }
            }
        }
    }

    let (input, output) = match usage {
        Some((i, o)) => (Some(i), Some(o)),
        None => (None, None),
    };
    let _ = tx.send(Ok(StreamChunk::final_chunk("", input, output))).await;
}

#[async_trait]
impl BrainAdapter for OpenAiBrain {
    fn id(&self) -> &str {
        &self.id
    }

    fn provider(&self) -> BrainProvider {
        BrainProvider::OpenAi
    }

    fn capabilities(&self) -> BrainCapabilities {
        BrainCapabilities {
            streaming: true,
            max_context_tokens: None,
        }
    }

    async fn ping(&self) -> PingResult {
        let start = Instant::now();
        let result = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(request_error);
        match result {
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
        debug!("POST {}/chat/completions model={}", self.base_url, self.model);

        let token = options.cancellation.clone().unwrap_or_default();
        let request = async {
            let response = self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(request_error)?;
            check_status(response).await
        };
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(BrainError::Cancelled),
            response = request => response?,
        };

        let (tx, stream) = ChunkStream::channel();
        tokio::spawn(pump_sse(response, tx, token));
        Ok(stream)
    }
}
