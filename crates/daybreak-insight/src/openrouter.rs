//! OpenRouter chat-completion transport (secondary provider).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::error::InsightError;
use crate::transport::{InsightTransport, DEFAULT_REQUEST_TIMEOUT};
use crate::types::{InsightPayload, InsightProvider};

const OPENROUTER_API_BASE: &str = "https://openrouter.ai";
pub const DEFAULT_MODEL: &str = "xiaomi/mimo-v2-flash:free";

const SYSTEM_PROMPT: &str = "You are a specialized cultural and meteorological historian assistant. You must output valid JSON only.";

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct OpenRouterTransport {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenRouterTransport {
    pub fn new(api_key: Option<String>) -> Self {
        Self::new_with_base_url(api_key, DEFAULT_MODEL, OPENROUTER_API_BASE)
    }

    pub fn new_with_base_url(api_key: Option<String>, model: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound each request; an elapsed request fails with `NetworkError::Timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl InsightTransport for OpenRouterTransport {
    fn provider(&self) -> InsightProvider {
        InsightProvider::Secondary
    }

    #[instrument(skip(self, prompt), fields(model = %self.model), level = "info")]
    async fn generate(&self, prompt: &str) -> Result<InsightPayload, InsightError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(InsightError::MissingCredential("secondary"))?;

        let url = format!("{}/api/v1/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "response_format": { "type": "json_object" }
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InsightError::from_response(response).await);
        }

        let resp: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| InsightError::Schema(format!("JSON parse error: {}", e)))?;

        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(InsightError::EmptyResponse)?;

        InsightPayload::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "gen-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        let content = serde_json::json!({
            "event": "Canada Day",
            "location": "Ottawa, Canada",
            "description": "The Constitution Act of 1867 took effect.",
            "themeColor": "#FF0000",
            "imageKeyword": "maple leaf",
            "historicalWeather": {
                "name": "Chicago heat wave",
                "year": 1995,
                "description": "Over 700 deaths in five days.",
                "type": "extreme_heat"
            }
        })
        .to_string();

        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("Authorization", "Bearer or_key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test/model",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&content)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = OpenRouterTransport::new_with_base_url(
            Some("or_key".into()),
            "test/model",
            &mock_server.uri(),
        );
        let payload = transport.generate("prompt").await.unwrap();

        assert_eq!(payload.event, "Canada Day");
        assert_eq!(transport.provider(), InsightProvider::Secondary);
    }

    #[tokio::test]
    async fn test_malformed_content_is_schema_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion("Sure! Here's a fact: ...")),
            )
            .mount(&mock_server)
            .await;

        let transport =
            OpenRouterTransport::new_with_base_url(Some("k".into()), "m", &mock_server.uri());
        let result = transport.generate("prompt").await;

        assert!(matches!(result, Err(InsightError::Schema(_))));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let transport =
            OpenRouterTransport::new_with_base_url(Some("k".into()), "m", &mock_server.uri());
        let result = transport.generate("prompt").await;

        assert!(matches!(result, Err(InsightError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let transport = OpenRouterTransport::new(None);
        let result = transport.generate("prompt").await;
        assert!(matches!(result, Err(InsightError::MissingCredential("secondary"))));
    }
}
