//! Reverse geocoding: convert coordinates to human-readable place names.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.
//!
//! Lookups never fail: any problem yields one of the sentinel names below.

use crate::types::Coordinates;
use reqwest::Client;
use serde::Deserialize;

/// Shown when the geocoder could not be reached or answered nonsense
pub const YOUR_LOCATION: &str = "Your Location";

/// Shown when the geocoder answered but the address has no usable place field
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
}

impl NominatimAddress {
    // city > town > village > state
    fn place_name(self) -> String {
        [self.city, self.town, self.village, self.state]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
    }
}

/// Reverse geocode coordinates to a place name (e.g. "São Paulo").
pub(crate) async fn reverse_geocode(client: &Client, base_url: &str, coords: &Coordinates) -> String {
    let url = format!(
        "{}/reverse?format=json&lat={}&lon={}",
        base_url, coords.latitude, coords.longitude
    );

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Reverse geocode request failed: {}", e);
            return YOUR_LOCATION.to_string();
        }
    };

    if !response.status().is_success() {
        tracing::debug!("Reverse geocode returned status {}", response.status());
        return YOUR_LOCATION.to_string();
    }

    let body: NominatimResponse = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("Reverse geocode parse error: {}", e);
            return YOUR_LOCATION.to_string();
        }
    };

    let Some(address) = body.address else {
        tracing::debug!("Reverse geocode response has no address");
        return YOUR_LOCATION.to_string();
    };

    let place = address.place_name();
    tracing::info!("Reverse geocoded to: {}", place);
    place
}
