//! Native Gemini provider speaking the `generateContent` REST API.
//!
//! Thinking model support: Gemini 2.5+ models return parts tagged
//! `thought: true`. Those are filtered out and only the final non-thought
//! text is returned.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{provider_error, GenerationRequest, LlmProvider};
use crate::config::GeminiConfig;
use crate::error::{ArchError, Result};

/// Gemini v1beta REST API base.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-request timeout for generation calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Gemini provider authenticated with an API key (`?key=` query parameter).
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ArchError::Config(format!("failed to build Gemini HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            client,
        })
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        Self::new(&config.api_key, &config.model)
    }

    /// Point the provider at a different API base (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build the `generateContent` request body.
    pub fn build_request_body(request: &GenerationRequest) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": &request.prompt }]
            }]
        });
        if let Some(sys) = &request.system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": sys }] });
        }
        if let Some(schema) = &request.response_schema {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema
            });
        }
        body
    }

    /// Extract final answer text from a Gemini API response.
    ///
    /// If no non-thought parts exist (unusual), the thought text is returned
    /// so the caller always gets *something*.
    pub fn extract_text(response: &Value) -> Option<String> {
        let parts = response["candidates"][0]["content"]["parts"].as_array()?;

        let final_parts: Vec<&str> = parts
            .iter()
            .filter(|p| !p["thought"].as_bool().unwrap_or(false))
            .filter_map(|p| p["text"].as_str())
            .collect();

        if !final_parts.is_empty() {
            return Some(final_parts.join(""));
        }

        let thought_parts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();

        if !thought_parts.is_empty() {
            Some(thought_parts.join(""))
        } else {
            None
        }
    }

    /// Token counts `(prompt, completion)` when the response reports them.
    fn extract_usage(response: &Value) -> Option<(u64, u64)> {
        let meta = response.get("usageMetadata")?;
        let prompt = meta["promptTokenCount"].as_u64()?;
        let completion = meta["candidatesTokenCount"].as_u64().unwrap_or(0);
        Some((prompt, completion))
    }

    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<Option<String>> {
        let body = Self::build_request_body(&request);

        debug!(
            model = %self.model,
            structured = request.response_schema.is_some(),
            "Gemini generateContent request"
        );

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key as a query parameter.
                ArchError::transport(format!("Gemini request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if status.is_success() {
            let json: Value = response.json().await.map_err(|e| {
                ArchError::transport(format!(
                    "Failed to parse Gemini response: {}",
                    e.without_url()
                ))
            })?;
            if let Some((prompt, completion)) = Self::extract_usage(&json) {
                debug!(prompt_tokens = prompt, completion_tokens = completion, "Gemini usage");
            }
            return Ok(Self::extract_text(&json));
        }

        let error_text = response.text().await.unwrap_or_default();

        // Prefer the structured message from the Gemini error body.
        let body_msg = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(error_text);

        Err(provider_error(status.as_u16(), &format!("Gemini API error: {body_msg}")))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn provider_for(server: &mockito::ServerGuard) -> GeminiProvider {
        GeminiProvider::new("test-key", "gemini-3-flash-preview")
            .unwrap()
            .with_base_url(&server.url())
    }

    const GENERATE_PATH: &str = "/models/gemini-3-flash-preview:generateContent";

    #[test]
    fn test_extract_thinking_model_response_skips_thought_parts() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "Final answer here" }
                    ]
                }
            }]
        });
        let text = GeminiProvider::extract_text(&response);
        assert_eq!(text.as_deref(), Some("Final answer here"));
    }

    #[test]
    fn test_extract_thinking_falls_back_to_thought_if_no_final() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "only thought part", "thought": true }] }
            }]
        });
        let text = GeminiProvider::extract_text(&response);
        assert_eq!(text.as_deref(), Some("only thought part"));
    }

    #[test]
    fn test_extract_text_multiple_parts_joined() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] }
            }]
        });
        assert_eq!(
            GeminiProvider::extract_text(&response).as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_extract_text_none_without_candidates() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(GeminiProvider::extract_text(&response).is_none());
    }

    #[test]
    fn test_extract_usage_parses_token_counts() {
        let response = json!({
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5 }
        });
        assert_eq!(GeminiProvider::extract_usage(&response), Some((10, 5)));
        assert_eq!(GeminiProvider::extract_usage(&json!({})), None);
    }

    #[test]
    fn test_build_request_body_plain_prompt() {
        let body = GeminiProvider::build_request_body(&GenerationRequest::new("Hi"));
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hi");
        assert!(body.get("systemInstruction").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_build_request_body_with_system_and_schema() {
        let request = GenerationRequest::new("Hi")
            .with_system_instruction("You are helpful")
            .with_response_schema(json!({ "type": "OBJECT" }));
        let body = GeminiProvider::build_request_body(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are helpful");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_api_url_format() {
        let provider = GeminiProvider::new("key", "gemini-2.5-pro").unwrap();
        let url = provider.api_url();
        assert!(url.starts_with("https://generativelanguage.googleapis.com/v1beta"));
        assert!(url.ends_with("/models/gemini-2.5-pro:generateContent"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new("secret-key", "m").unwrap();
        assert!(!format!("{provider:?}").contains("secret-key"));
    }

    #[tokio::test]
    async fn test_generate_sends_key_and_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "systemInstruction": { "parts": [{ "text": "sys" }] }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#)
            .create_async()
            .await;

        let request = GenerationRequest::new("hi").with_system_instruction("sys");
        let text = provider_for(&server).generate(request).await.unwrap();
        mock.assert_async().await;
        assert_eq!(text.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_generate_no_text_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[]}}]}"#)
            .create_async()
            .await;

        let text = provider_for(&server)
            .generate(GenerationRequest::new("hi"))
            .await
            .unwrap();
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_generate_error_status_uses_upstream_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"API key not valid"}}"#)
            .create_async()
            .await;

        let err = provider_for(&server)
            .generate(GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        match err {
            ArchError::Provider { status, message } => {
                assert_eq!(status, Some(403));
                assert!(message.contains("API key not valid"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_key() {
        let provider = GeminiProvider::new("SECRET-KEY-123", "m")
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let err = provider.generate(GenerationRequest::new("hi")).await.unwrap_err();
        let text = err.to_string();
        assert!(matches!(err, ArchError::Provider { .. }));
        assert!(!text.contains("SECRET-KEY-123"), "{text}");
    }

    #[tokio::test]
    async fn test_malformed_success_body_does_not_expose_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let err = provider_for(&server)
            .generate(GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Failed to parse Gemini response"), "{text}");
        assert!(!text.contains("test-key"), "{text}");
    }
}
