//! Insight provider error types.
//!
//! None of these reach the dashboard: the client recovers from every one of
//! them, first by switching provider and finally with the fixed insight.

use daybreak_core::{NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("No credential configured for the {0} provider")]
    MissingCredential(&'static str),

    #[error("Unknown insight provider: {0}")]
    UnknownProvider(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned no content")]
    EmptyResponse,

    #[error("Response does not match the insight schema: {0}")]
    Schema(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl From<reqwest::Error> for InsightError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}

impl InsightError {
    /// Build an `Api` error from a non-success response, consuming its body.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Self::Api { status, message }
    }
}
