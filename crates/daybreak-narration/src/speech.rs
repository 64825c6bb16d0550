//! Gemini generative speech client.

use std::time::Duration;

use serde::Deserialize;
use tracing::instrument;

use crate::error::NarrationError;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_VOICE: &str = "Aoede";
/// Upper bound on one speech request, connect to last body byte
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const STYLE_INSTRUCTION: &str = "Generate audio speaking this text. Use a warm, natural, and conversational English accent. Avoid being overly formal or robotic. Text: ";

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
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: Option<String>,
}

pub struct SpeechClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    voice: String,
    base_url: String,
    timeout: Duration,
}

impl SpeechClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::new_with_base_url(api_key, DEFAULT_MODEL, DEFAULT_VOICE, GEMINI_API_BASE)
    }

    pub fn new_with_base_url(
        api_key: Option<String>,
        model: &str,
        voice: &str,
        base_url: &str,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.to_string(),
            voice: voice.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound each request; an elapsed request fails with `NetworkError::Timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request speech for `text`; returns the base64 raw PCM payload.
    #[instrument(skip(self, text), fields(voice = %self.voice), level = "info")]
    pub async fn synthesize(&self, text: &str) -> Result<String, NarrationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(NarrationError::MissingCredential)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": format!("{STYLE_INSTRUCTION}{text}") }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.voice }
                    }
                }
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
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(NarrationError::Api { status, message });
        }

        let resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| NarrationError::Decode(format!("JSON parse error: {}", e)))?;

        resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
            .and_then(|inline| inline.data)
            .filter(|data| !data.is_empty())
            .ok_or(NarrationError::EmptyAudio)
    }
}
