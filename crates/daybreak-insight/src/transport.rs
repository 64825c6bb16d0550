use std::time::Duration;

use async_trait::async_trait;

use crate::error::InsightError;
use crate::types::{InsightPayload, InsightProvider};

/// Upper bound on one provider request, connect to last body byte
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One way of turning a prompt into a schema-checked insight payload.
///
/// Implementations make exactly one request per call and never retry;
/// fallback between providers is the client's job.
#[async_trait]
pub trait InsightTransport: Send + Sync {
    /// Provider this transport talks to
    fn provider(&self) -> InsightProvider;

    async fn generate(&self, prompt: &str) -> Result<InsightPayload, InsightError>;
}
