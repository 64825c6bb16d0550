//! Device location: one-shot position queries with a timeout.
//!
//! Two sources are available: an IP geolocation lookup for headless devices,
//! and fixed coordinates from the config file. Neither retries; a failed
//! query fails the current refresh cycle and the next cycle asks again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::types::{Coordinates, LocationError};

/// Default time allowed for a position fix
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Source of the dashboard's current position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Issue a single position request, failing with `LocationError::Timeout`
    /// if no fix arrives within `timeout`.
    async fn current_coordinates(&self, timeout: Duration)
        -> Result<Coordinates, LocationError>;
}

/// Coordinates supplied by configuration
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_coordinates(
        &self,
        _timeout: Duration,
    ) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

#[derive(Debug, Deserialize)]
struct IpLocateResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// Position from an ip-api.com compatible endpoint
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            tracing::debug!("IP location request failed: {}", e);
            LocationError::ServiceUnavailable
        })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LocationError::PermissionDenied)
            }
            status if !status.is_success() => {
                tracing::debug!("IP location returned status {}", status);
                return Err(LocationError::ServiceUnavailable);
            }
            _ => {}
        }

        let body: IpLocateResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("Malformed location response: {}", e)))?;

        if body.status != "success" {
            tracing::debug!(
                "IP location lookup failed: {}",
                body.message.as_deref().unwrap_or("no reason given")
            );
            return Err(LocationError::ServiceUnavailable);
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Other(
                "Location response missing coordinates".to_string(),
            )),
        }
    }
}

#[async_trait]
impl LocationProvider for IpLocator {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn current_coordinates(
        &self,
        timeout: Duration,
    ) -> Result<Coordinates, LocationError> {
        match tokio::time::timeout(timeout, self.locate()).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        }
    }
}
