use crate::geocode::{self, YOUR_LOCATION};
use crate::types::{condition_text, Coordinates, WeatherError, WeatherSnapshot};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const OPEN_METEO_URL: &str = "https://api.open-meteo.com";
const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("Daybreak/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    weathercode: i32,
    is_day: u8,
}

/// Open-Meteo current conditions plus Nominatim place names
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    forecast_url: String,
    geocode_url: String,
}

impl WeatherClient {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_endpoints(OPEN_METEO_URL, NOMINATIM_URL, USER_AGENT)
    }

    /// Point the client at other hosts (config overrides, mock servers)
    pub fn with_endpoints(
        forecast_url: &str,
        geocode_url: &str,
        user_agent: &str,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            forecast_url: forecast_url.trim_end_matches('/').to_string(),
            geocode_url: geocode_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current conditions. The place name is left as the generic sentinel.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn fetch_weather(&self, coords: &Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current_weather=true&timezone=auto",
            self.forecast_url, coords.latitude, coords.longitude
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let current = body.current_weather.ok_or(WeatherError::Unavailable)?;

        Ok(WeatherSnapshot {
            temperature_celsius: current.temperature,
            condition_code: current.weathercode,
            condition_text: condition_text(current.weathercode).to_string(),
            is_daytime: current.is_day == 1,
            place_name: YOUR_LOCATION.to_string(),
        })
    }

    /// Resolve a place name; falls back to a sentinel instead of failing.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn reverse_geocode(&self, coords: &Coordinates) -> String {
        geocode::reverse_geocode(&self.client, &self.geocode_url, coords).await
    }

    /// Conditions and place name fetched concurrently, combined once both are in.
    pub async fn fetch_snapshot(&self, coords: &Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let (weather, place) = tokio::join!(self.fetch_weather(coords), self.reverse_geocode(coords));
        Ok(weather?.with_place_name(place))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::UNKNOWN_LOCATION;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WeatherClient {
        WeatherClient::with_endpoints(&server.uri(), &server.uri(), "daybreak-test").unwrap()
    }

    async fn mount_forecast(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("current_weather", "true"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_weather() {
        let mock_server = MockServer::start().await;
        mount_forecast(
            &mock_server,
            serde_json::json!({
                "latitude": -23.55,
                "longitude": -46.63,
                "current_weather": {"temperature": 28.4, "weathercode": 95, "is_day": 1, "windspeed": 7.2}
            }),
        )
        .await;

        let client = client_for(&mock_server);
        let snapshot = client
            .fetch_weather(&Coordinates::new(-23.55, -46.63))
            .await
            .unwrap();

        assert_eq!(snapshot.temperature_celsius, 28.4);
        assert_eq!(snapshot.condition_code, 95);
        assert_eq!(snapshot.condition_text, "Thunderstorm");
        assert!(snapshot.is_daytime);
        assert_eq!(snapshot.place_name, YOUR_LOCATION);
    }

    #[tokio::test]
    async fn test_fetch_weather_night_and_unknown_code() {
        let mock_server = MockServer::start().await;
        mount_forecast(
            &mock_server,
            serde_json::json!({
                "current_weather": {"temperature": -3.0, "weathercode": 77, "is_day": 0}
            }),
        )
        .await;

        let snapshot = client_for(&mock_server)
            .fetch_weather(&Coordinates::new(45.0, -75.0))
            .await
            .unwrap();

        assert!(!snapshot.is_daytime);
        assert_eq!(snapshot.condition_text, "Unknown");
    }

    #[tokio::test]
    async fn test_missing_current_weather_is_unavailable() {
        let mock_server = MockServer::start().await;
        mount_forecast(&mock_server, serde_json::json!({"latitude": 1.0})).await;

        let result = client_for(&mock_server)
            .fetch_weather(&Coordinates::new(1.0, 2.0))
            .await;

        assert!(matches!(result, Err(WeatherError::Unavailable)));
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .fetch_weather(&Coordinates::new(1.0, 2.0))
            .await;

        assert!(matches!(result, Err(WeatherError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_weather_is_idempotent() {
        let mock_server = MockServer::start().await;
        mount_forecast(
            &mock_server,
            serde_json::json!({
                "current_weather": {"temperature": 12.5, "weathercode": 3, "is_day": 1}
            }),
        )
        .await;

        let client = client_for(&mock_server);
        let coords = Coordinates::new(51.5, -0.12);
        let first = client.fetch_weather(&coords).await.unwrap();
        let second = client.fetch_weather(&coords).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_reverse_geocode_city() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "São Paulo, Brasil",
                "address": {"city": "São Paulo", "state": "São Paulo", "country": "Brasil"}
            })))
            .mount(&mock_server)
            .await;

        let name = client_for(&mock_server)
            .reverse_geocode(&Coordinates::new(-23.55, -46.63))
            .await;

        assert_eq!(name, "São Paulo");
    }

    #[tokio::test]
    async fn test_reverse_geocode_state_only() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {"state": "Amazonas"}
            })))
            .mount(&mock_server)
            .await;

        let name = client_for(&mock_server)
            .reverse_geocode(&Coordinates::new(-3.1, -60.0))
            .await;

        assert_eq!(name, "Amazonas");
    }

    #[tokio::test]
    async fn test_reverse_geocode_empty_address() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {}
            })))
            .mount(&mock_server)
            .await;

        let name = client_for(&mock_server)
            .reverse_geocode(&Coordinates::new(0.0, 0.0))
            .await;

        assert_eq!(name, UNKNOWN_LOCATION);
    }

    #[tokio::test]
    async fn test_reverse_geocode_malformed_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&mock_server)
            .await;

        let name = client_for(&mock_server)
            .reverse_geocode(&Coordinates::new(0.0, 0.0))
            .await;

        assert_eq!(name, YOUR_LOCATION);
    }

    #[tokio::test]
    async fn test_reverse_geocode_missing_address() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Unable to geocode"
            })))
            .mount(&mock_server)
            .await;

        let name = client_for(&mock_server)
            .reverse_geocode(&Coordinates::new(0.0, 0.0))
            .await;

        assert_eq!(name, YOUR_LOCATION);
    }

    #[tokio::test]
    async fn test_reverse_geocode_transport_error() {
        let client =
            WeatherClient::with_endpoints("http://127.0.0.1:9", "http://127.0.0.1:9", "test")
                .unwrap();
        let name = client.reverse_geocode(&Coordinates::new(0.0, 0.0)).await;
        assert_eq!(name, YOUR_LOCATION);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_combines_both() {
        let mock_server = MockServer::start().await;
        mount_forecast(
            &mock_server,
            serde_json::json!({
                "current_weather": {"temperature": 28.4, "weathercode": 95, "is_day": 1}
            }),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {"city": "São Paulo"}
            })))
            .mount(&mock_server)
            .await;

        let snapshot = client_for(&mock_server)
            .fetch_snapshot(&Coordinates::new(-23.55, -46.63))
            .await
            .unwrap();

        assert_eq!(snapshot.place_name, "São Paulo");
        assert_eq!(snapshot.condition_text, "Thunderstorm");
    }
}
