use serde::{Deserialize, Serialize};

use crate::error::InsightError;

/// Which generative provider produced (or is asked for) an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsightProvider {
    /// Gemini structured output
    #[default]
    Primary,
    /// OpenRouter chat completion
    Secondary,
}

impl InsightProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for InsightProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InsightProvider {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "gemini" => Ok(Self::Primary),
            "secondary" | "openrouter" => Ok(Self::Secondary),
            other => Err(InsightError::UnknownProvider(other.to_string())),
        }
    }
}

/// Kind of historical weather event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherEventCategory {
    ExtremeHeat,
    ExtremeCold,
    Storm,
    Flood,
    Other,
}

impl WeatherEventCategory {
    pub const ALL: [&'static str; 5] = ["extreme_heat", "extreme_cold", "storm", "flood", "other"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalWeatherEvent {
    pub name: String,
    pub year: i32,
    pub description: String,
    #[serde(rename = "type")]
    pub category: WeatherEventCategory,
}

/// The JSON object a provider is asked to return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightPayload {
    pub event: String,
    pub location: String,
    pub description: String,
    pub theme_color: String,
    pub image_keyword: String,
    #[serde(default)]
    pub historical_weather: Option<HistoricalWeatherEvent>,
}

impl InsightPayload {
    /// Parse provider text, rejecting anything that doesn't match the schema.
    pub fn from_json(text: &str) -> Result<Self, InsightError> {
        let payload: Self = serde_json::from_str(strip_code_fence(text))
            .map_err(|e| InsightError::Schema(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<(), InsightError> {
        if self.event.trim().is_empty() {
            return Err(InsightError::Schema("event is empty".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(InsightError::Schema("description is empty".to_string()));
        }
        if let Some(weather) = &self.historical_weather {
            if weather.name.trim().is_empty() {
                return Err(InsightError::Schema(
                    "historicalWeather.name is empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn into_insight(self, provider_used: InsightProvider) -> CulturalInsight {
        CulturalInsight {
            event: self.event,
            location: self.location,
            description: self.description,
            theme_color: self.theme_color,
            image_keyword: self.image_keyword,
            provider_used,
            historical_weather: self.historical_weather,
        }
    }
}

// Chat models sometimes wrap JSON in a markdown fence even when asked not to
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// One day's insight as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalInsight {
    pub event: String,
    pub location: String,
    pub description: String,
    pub theme_color: String,
    pub image_keyword: String,
    pub provider_used: InsightProvider,
    pub historical_weather: Option<HistoricalWeatherEvent>,
}

impl CulturalInsight {
    /// Returned when every provider attempt has failed.
    pub fn fallback() -> Self {
        Self {
            event: "Global Connection Day".to_string(),
            location: "Brazil & Anglosphere".to_string(),
            description:
                "A day celebrating the cultural ties between Brazil and the English-speaking world."
                    .to_string(),
            theme_color: "#0047AB".to_string(),
            image_keyword: "modern-architecture".to_string(),
            provider_used: InsightProvider::Primary,
            historical_weather: Some(HistoricalWeatherEvent {
                name: "Historical Weather Records".to_string(),
                year: 1995,
                description:
                    "A day of significant meteorological observation across major global hubs."
                        .to_string(),
                category: WeatherEventCategory::Other,
            }),
        }
    }

    /// Full-screen backdrop photo for the insight's keyword
    pub fn background_image_url(&self) -> String {
        format!(
            "https://loremflickr.com/1920/1080/{}",
            urlencoding::encode(&self.image_keyword)
        )
    }
}
