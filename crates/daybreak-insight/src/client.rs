//! Insight client with provider fallback.

use std::sync::Arc;

use tracing::instrument;

use crate::gemini::GeminiTransport;
use crate::openrouter::OpenRouterTransport;
use crate::prompt::build_prompt;
use crate::transport::InsightTransport;
use crate::types::{CulturalInsight, InsightProvider};

/// Fetches the daily insight. Never fails: the worst case is the fixed
/// "Global Connection Day" insight.
#[derive(Clone)]
pub struct InsightClient {
    primary: Arc<dyn InsightTransport>,
    secondary: Option<Arc<dyn InsightTransport>>,
}

impl InsightClient {
    /// Gemini as primary, OpenRouter as secondary
    pub fn new(gemini: GeminiTransport, openrouter: OpenRouterTransport) -> Self {
        Self::with_transports(Arc::new(gemini), Some(Arc::new(openrouter)))
    }

    pub fn with_transports(
        primary: Arc<dyn InsightTransport>,
        secondary: Option<Arc<dyn InsightTransport>>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// Ask `requested` for today's insight.
    ///
    /// A failed secondary call is followed by exactly one primary call with the
    /// same prompt; a failed primary call yields `CulturalInsight::fallback()`.
    #[instrument(skip(self), level = "info")]
    pub async fn get_cultural_insight(
        &self,
        date: &str,
        weather: &str,
        requested: InsightProvider,
    ) -> CulturalInsight {
        let prompt = build_prompt(date, weather);

        if requested == InsightProvider::Secondary {
            match &self.secondary {
                Some(secondary) => match secondary.generate(&prompt).await {
                    Ok(payload) => {
                        tracing::info!("Insight produced by {}", secondary.provider());
                        return payload.into_insight(secondary.provider());
                    }
                    Err(e) => {
                        tracing::warn!("Secondary insight provider failed, using primary: {}", e);
                    }
                },
                None => {
                    tracing::warn!("No secondary insight provider configured, using primary");
                }
            }
        }

        match self.primary.generate(&prompt).await {
            Ok(payload) => {
                tracing::info!("Insight produced by {}", self.primary.provider());
                payload.into_insight(self.primary.provider())
            }
            Err(e) => {
                tracing::warn!("Primary insight provider failed, using built-in insight: {}", e);
                CulturalInsight::fallback()
            }
        }
    }
}
