use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the Gemini credential
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable holding the OpenRouter credential
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Device location settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Weather and reverse-geocoding providers
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Generative insight providers
    #[serde(default)]
    pub insight: InsightConfig,

    /// Speech output settings
    #[serde(default)]
    pub narration: NarrationConfig,

    /// Refresh cycle settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// How the dashboard determines where it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// IP-based lookup on every refresh
    #[default]
    Auto,
    /// Use `latitude`/`longitude` from this file
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub mode: LocationMode,

    /// Fixed latitude (used when mode = "fixed")
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Fixed longitude (used when mode = "fixed")
    #[serde(default)]
    pub longitude: Option<f64>,

    /// Give up on a position fix after this many milliseconds
    #[serde(default = "default_location_timeout_ms")]
    pub timeout_ms: u64,

    /// IP geolocation endpoint
    #[serde(default = "default_ip_locator_url")]
    pub ip_locator_url: String,
}

fn default_location_timeout_ms() -> u64 {
    10_000
}

fn default_ip_locator_url() -> String {
    "http://ip-api.com/json".to_string()
}

impl LocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            mode: LocationMode::Auto,
            latitude: None,
            longitude: None,
            timeout_ms: default_location_timeout_ms(),
            ip_locator_url: default_ip_locator_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo base URL
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Nominatim base URL
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// User agent sent to the geocoder (Nominatim requires one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("Daybreak/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            geocode_url: default_geocode_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Which provider each refresh asks first: "primary" (alias "gemini")
    /// or "secondary" (alias "openrouter")
    #[serde(default = "default_insight_provider")]
    pub provider: String,

    #[serde(default = "default_gemini_url")]
    pub gemini_url: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Prefer the GEMINI_API_KEY environment variable over storing this here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_openrouter_url")]
    pub openrouter_url: String,

    #[serde(default = "default_openrouter_model")]
    pub openrouter_model: String,

    /// Prefer the OPENROUTER_API_KEY environment variable over storing this here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openrouter_api_key: Option<String>,
}

impl InsightConfig {
    /// Canonical slot for `provider`, matched case-insensitively
    fn provider_slot(&self) -> Option<&'static str> {
        match self.provider.trim().to_ascii_lowercase().as_str() {
            "primary" | "gemini" => Some("primary"),
            "secondary" | "openrouter" => Some("secondary"),
            _ => None,
        }
    }
}

fn default_insight_provider() -> String {
    "primary".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_openrouter_url() -> String {
    "https://openrouter.ai".to_string()
}

fn default_openrouter_model() -> String {
    "xiaomi/mimo-v2-flash:free".to_string()
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            provider: default_insight_provider(),
            gemini_url: default_gemini_url(),
            gemini_model: default_gemini_model(),
            gemini_api_key: None,
            openrouter_url: default_openrouter_url(),
            openrouter_model: default_openrouter_model(),
            openrouter_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Gemini model that produces audio
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Prebuilt Gemini voice
    #[serde(default = "default_voice")]
    pub voice: String,

    /// espeak-ng binary used when generative speech is unavailable
    #[serde(default = "default_espeak_bin")]
    pub espeak_bin: String,

    /// Raw PCM player (aplay or paplay)
    #[serde(default = "default_player")]
    pub player: String,
}

fn default_speech_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_voice() -> String {
    "Aoede".to_string()
}

fn default_espeak_bin() -> String {
    "espeak-ng".to_string()
}

fn default_player() -> String {
    "aplay".to_string()
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            speech_model: default_speech_model(),
            voice: default_voice(),
            espeak_bin: default_espeak_bin(),
            player: default_player(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Refresh interval in milliseconds (default: one hour)
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

fn default_refresh_interval_ms() -> u64 {
    3_600_000
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating defaults if missing.
    /// Credentials from the environment are applied on top.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit path, writing defaults there if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Fill provider credentials from GEMINI_API_KEY / OPENROUTER_API_KEY
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(GEMINI_API_KEY_ENV) {
            if !key.is_empty() {
                tracing::info!("Using Gemini credential from {}", GEMINI_API_KEY_ENV);
                self.insight.gemini_api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var(OPENROUTER_API_KEY_ENV) {
            if !key.is_empty() {
                tracing::info!("Using OpenRouter credential from {}", OPENROUTER_API_KEY_ENV);
                self.insight.openrouter_api_key = Some(key);
            }
        }
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.forecast_url, "weather.forecast_url", &mut result);
        self.validate_url(&self.weather.geocode_url, "weather.geocode_url", &mut result);
        self.validate_url(&self.insight.gemini_url, "insight.gemini_url", &mut result);
        self.validate_url(
            &self.insight.openrouter_url,
            "insight.openrouter_url",
            &mut result,
        );

        if self.location.mode == LocationMode::Auto {
            self.validate_url(
                &self.location.ip_locator_url,
                "location.ip_locator_url",
                &mut result,
            );
        }

        if self.location.mode == LocationMode::Fixed {
            match (self.location.latitude, self.location.longitude) {
                (Some(lat), Some(lon)) => {
                    if !(-90.0..=90.0).contains(&lat) {
                        result.add_error("location.latitude", "Latitude must be within -90..90");
                    }
                    if !(-180.0..=180.0).contains(&lon) {
                        result.add_error(
                            "location.longitude",
                            "Longitude must be within -180..180",
                        );
                    }
                }
                _ => result.add_error(
                    "location",
                    "Fixed location mode requires latitude and longitude",
                ),
            }
        }

        if self.location.timeout_ms == 0 {
            result.add_error("location.timeout_ms", "Location timeout must be greater than 0");
        }

        let provider = self.insight.provider_slot();
        if provider.is_none() {
            result.add_error(
                "insight.provider",
                format!(
                    "Provider must be \"primary\" (\"gemini\") or \"secondary\" (\"openrouter\"), got: {}",
                    self.insight.provider
                ),
            );
        }

        if self.insight.gemini_api_key.is_none() {
            result.add_warning(
                "insight.gemini_api_key",
                "No Gemini credential - insights and generative speech will use fallbacks",
            );
        }

        if provider == Some("secondary") && self.insight.openrouter_api_key.is_none() {
            result.add_warning(
                "insight.openrouter_api_key",
                "Secondary provider requested without an OpenRouter credential",
            );
        }

        if self.dashboard.refresh_interval_ms == 0 {
            result.add_error(
                "dashboard.refresh_interval_ms",
                "Refresh interval must be greater than 0",
            );
        } else if self.dashboard.refresh_interval_ms < 60_000 {
            result.add_warning(
                "dashboard.refresh_interval_ms",
                "Refresh interval is under a minute; providers may rate limit",
            );
        }

        if self.narration.player != "aplay" && self.narration.player != "paplay" {
            result.add_warning(
                "narration.player",
                format!("Unknown player {}, expected aplay or paplay", self.narration.player),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("daybreak");

        Ok(config_dir.join("config.toml"))
    }
}
