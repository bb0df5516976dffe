use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use log::{info, error};

use super::{AiError, GenerateOptions, TextGenerator};

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Google Generative Language `generateContent` backend.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn http_request(&self, prompt: &str, options: &GenerateOptions) -> RequestBuilder {
        self.client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&Self::build_request(prompt, options))
    }

    fn build_request(prompt: &str, options: &GenerateOptions) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: Some(prompt.to_string()) }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: options.max_tokens,
                temperature: options.temperature,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, AiError> {
        info!("Sending request to Gemini with model: {}", self.model);

        let response = self.http_request(prompt, options).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API error: {}", body);
            return Err(AiError::Api { status: status.as_u16(), body });
        }

        let gemini_response: GeminiResponse = response.json().await?;
        gemini_response.into_text().ok_or(AiError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GeminiClient::build_request("Ask me something", &GenerateOptions::QUESTION);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "Ask me something");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 200);
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new(Client::new(), "k".to_string(), "gemini-2.0-flash".to_string());
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_api_key_travels_in_header() {
        let client = GeminiClient::new(Client::new(), "SECRET-KEY-123".to_string(), "gemini-2.0-flash".to_string());
        let request = client
            .http_request("Ask me something", &GenerateOptions::QUESTION)
            .build()
            .unwrap();

        assert!(request.url().query().is_none());
        assert!(!request.url().as_str().contains("SECRET-KEY-123"));
        assert_eq!(request.headers()[API_KEY_HEADER], "SECRET-KEY-123");
    }

    #[tokio::test]
    async fn test_transport_error_hides_url() {
        let client = GeminiClient::new(Client::new(), "SECRET-KEY-123".to_string(), "gemini-2.0-flash".to_string())
            .with_base_url("http://127.0.0.1:1/v1beta".to_string());

        let err = client.generate("hello", &GenerateOptions::QUESTION).await.unwrap_err();
        assert!(matches!(err, AiError::Request(_)));
        assert!(!err.to_string().contains("127.0.0.1:1/v1beta"));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }], "role": "model" },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Hello world"));
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert!(response.into_text().is_none());
    }
}
