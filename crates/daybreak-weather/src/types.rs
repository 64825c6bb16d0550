use daybreak_core::{NetworkError, ReqwestErrorExt};
use serde::{Deserialize, Serialize};

/// Map a WMO weather code to the text shown on the dashboard.
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn condition_text(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Geographic position for one refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Current conditions plus the resolved place name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature_celsius: f64,
    pub condition_code: i32,
    pub condition_text: String,
    pub is_daytime: bool,
    pub place_name: String,
}

impl WeatherSnapshot {
    /// Same conditions, different place
    pub fn with_place_name(self, place_name: impl Into<String>) -> Self {
        Self {
            place_name: place_name.into(),
            ..self
        }
    }

    /// Temperature rounded half away from zero, as spoken aloud
    pub fn rounded_temperature(&self) -> i64 {
        self.temperature_celsius.round() as i64
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location access was denied. Please check location permissions."
            }
            Self::ServiceUnavailable => "Location service unavailable. Please try again later.",
            Self::Timeout => "Finding your location took too long. Retrying next cycle.",
            Self::Other(_) => "Failed to determine your location.",
        }
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather data not available")]
    Unavailable,
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable => "Weather data not available",
            Self::Network(e) => e.user_message(),
            Self::Parse(_) => "Received an unexpected weather response.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_table_is_exact() {
        let table = [
            (0, "Clear sky"),
            (1, "Mainly clear"),
            (2, "Partly cloudy"),
            (3, "Overcast"),
            (45, "Fog"),
            (48, "Depositing rime fog"),
            (51, "Light drizzle"),
            (53, "Moderate drizzle"),
            (55, "Dense drizzle"),
            (61, "Slight rain"),
            (63, "Moderate rain"),
            (65, "Heavy rain"),
            (71, "Slight snow"),
            (73, "Moderate snow"),
            (75, "Heavy snow"),
            (95, "Thunderstorm"),
            (96, "Thunderstorm with slight hail"),
            (99, "Thunderstorm with heavy hail"),
        ];
        for (code, text) in table {
            assert_eq!(condition_text(code), text, "code {code}");
        }
    }

    #[test]
    fn test_unmapped_codes_are_unknown() {
        for code in [-1, 4, 56, 57, 66, 77, 80, 81, 82, 85, 86, 100, 999, i32::MAX] {
            assert_eq!(condition_text(code), "Unknown", "code {code}");
        }
    }

    #[test]
    fn test_with_place_name_keeps_conditions() {
        let snapshot = WeatherSnapshot {
            temperature_celsius: 28.4,
            condition_code: 95,
            condition_text: "Thunderstorm".to_string(),
            is_daytime: true,
            place_name: "Your Location".to_string(),
        };
        let named = snapshot.clone().with_place_name("São Paulo");
        assert_eq!(named.place_name, "São Paulo");
        assert_eq!(named.condition_code, snapshot.condition_code);
        assert_eq!(named.rounded_temperature(), 28);
    }

    #[test]
    fn test_location_error_messages() {
        assert!(LocationError::PermissionDenied
            .user_message()
            .contains("permissions"));
        assert!(!LocationError::Timeout.user_message().is_empty());
        assert!(WeatherError::Network(NetworkError::Timeout)
            .user_message()
            .contains("timed out"));
        assert_eq!(
            WeatherError::Unavailable.user_message(),
            "Weather data not available"
        );
    }
}
