use daybreak_insight::CulturalInsight;
use daybreak_weather::WeatherSnapshot;
use serde::Serialize;

/// Where the refresh cycle currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Snapshot of everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub phase: DashboardPhase,
    pub weather: Option<WeatherSnapshot>,
    pub insight: Option<CulturalInsight>,
    /// Gates the initial full-screen loading indicator only
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub is_narrating: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            phase: DashboardPhase::Idle,
            weather: None,
            insight: None,
            is_loading: true,
            last_error: None,
            is_narrating: false,
        }
    }
}

impl DashboardState {
    /// True until the first refresh has produced weather or failed
    pub fn shows_initial_loading(&self) -> bool {
        self.is_loading && self.weather.is_none()
    }
}
