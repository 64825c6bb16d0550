//! Daily cultural insight for Daybreak.
//!
//! Asks a generative-language provider for a cultural milestone and a
//! historical weather event on today's date. Two providers are supported
//! behind one transport trait; the client falls back from the secondary to
//! the primary once, and from the primary to a fixed local insight.

pub mod client;
pub mod error;
pub mod gemini;
pub mod openrouter;
pub mod prompt;
pub mod transport;
pub mod types;

pub use client::InsightClient;
pub use error::InsightError;
pub use gemini::GeminiTransport;
pub use openrouter::OpenRouterTransport;
pub use prompt::build_prompt;
pub use transport::{InsightTransport, DEFAULT_REQUEST_TIMEOUT};
pub use types::{
    CulturalInsight, HistoricalWeatherEvent, InsightPayload, InsightProvider,
    WeatherEventCategory,
};
