//! Gemini structured-output transport (primary provider).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::error::InsightError;
use crate::transport::{InsightTransport, DEFAULT_REQUEST_TIMEOUT};
use crate::types::{InsightPayload, InsightProvider, WeatherEventCategory};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.text)
    }
}

pub struct GeminiTransport {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiTransport {
    pub fn new(api_key: Option<String>) -> Self {
        Self::new_with_base_url(api_key, DEFAULT_MODEL, GEMINI_API_BASE)
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

    /// JSON schema the response must satisfy
    pub fn response_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "event": { "type": "STRING" },
                "location": { "type": "STRING" },
                "description": { "type": "STRING" },
                "themeColor": { "type": "STRING" },
                "imageKeyword": { "type": "STRING" },
                "historicalWeather": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "year": { "type": "INTEGER" },
                        "description": { "type": "STRING" },
                        "type": { "type": "STRING", "enum": WeatherEventCategory::ALL }
                    },
                    "required": ["name", "year", "description", "type"]
                }
            },
            "required": ["event", "location", "description", "themeColor", "imageKeyword", "historicalWeather"]
        })
    }
}

#[async_trait]
impl InsightTransport for GeminiTransport {
    fn provider(&self) -> InsightProvider {
        InsightProvider::Primary
    }

    #[instrument(skip(self, prompt), fields(model = %self.model), level = "info")]
    async fn generate(&self, prompt: &str) -> Result<InsightPayload, InsightError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(InsightError::MissingCredential("primary"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema(),
            }
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InsightError::from_response(response).await);
        }

        let resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InsightError::Schema(format!("JSON parse error: {}", e)))?;

        let text = resp.first_text().ok_or(InsightError::EmptyResponse)?;
        InsightPayload::from_json(&text)
    }
}
