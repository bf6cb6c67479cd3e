//! Google Gemini `generateContent` adapter (non-streaming)

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

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiBrain {
    id: String,
    model: String,
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiBrain {
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
        let contents: Vec<Value> = dialogue(messages)
            .map(|m| {
                // Gemini calls the assistant side "model"
                let role = if m.role == Role::Assistant { "model" } else { "user" };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();

        let mut generation = serde_json::Map::new();
        if let Some(temperature) = options.temperature {
            generation.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = options.max_tokens {
            generation.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }

        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": contents,
        });
        if !generation.is_empty() {
            body["generationConfig"] = Value::Object(generation);
        }
        body
    }
}

pub(crate) fn parse_generate_response(body: &Value) -> Result<CompletedResponse, BrainError> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| BrainError::InvalidResponse("no candidate content".to_string()))?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();

    Ok(CompletedResponse {
        text: text.trim().to_string(),
        input_tokens: body["usageMetadata"]["promptTokenCount"].as_u64(),
        output_tokens: body["usageMetadata"]["candidatesTokenCount"].as_u64(),
    })
}

#[async_trait]
impl BrainAdapter for GeminiBrain {
    fn id(&self) -> &str {
        &self.id
    }

    fn provider(&self) -> BrainProvider {
        BrainProvider::Gemini
    }

    fn capabilities(&self) -> BrainCapabilities {
        BrainCapabilities {
            streaming: false,
            max_context_tokens: None,
        }
    }

    async fn ping(&self) -> PingResult {
        let start = Instant::now();
        let request = self
            .http
            .get(format!("{}/models", self.base_url))
            .header("x-goog-api-key", &self.api_key);
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
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = self.request_body(messages, system_prompt, options);
        debug!("POST {}", url);

        let request = async {
            let response = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(request_error)?;
            let body: Value = check_status(response)
                .await?
                .json()
                .await
                .map_err(|e| BrainError::InvalidResponse(e.to_string()))?;
            parse_generate_response(&body)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_maps_roles() {
        let brain = GeminiBrain::new("gemini", "gemini-2.5-pro", "key", None).unwrap();
        let body = brain.request_body(
            &[
                ConversationMessage::user("q"),
                ConversationMessage::assistant("a"),
            ],
            "sys",
            &ChatOptions::default(),
        );
        assert_eq!(body["contents"][1]["role"], json!("model"));
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], json!("sys"));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_generation_config() {
        let brain = GeminiBrain::new("gemini", "gemini-2.5-pro", "key", None).unwrap();
        let body = brain.request_body(
            &[],
            "",
            &ChatOptions::default().with_temperature(0.0).with_max_tokens(50),
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(50));
    }

    #[test]
    fn test_parse_generate_response() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hi " }, { "text": "there" }] } }],
            "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 2 }
        });
        let response = parse_generate_response(&body).unwrap();
        assert_eq!(response.text, "Hi there");
        assert_eq!(response.output_tokens, Some(2));
        assert!(parse_generate_response(&json!({})).is_err());
    }
}
