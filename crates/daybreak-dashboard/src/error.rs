use daybreak_weather::{LocationError, WeatherError};
use thiserror::Error;

/// Failure of one refresh cycle
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl DashboardError {
    /// Message shown on the dashboard
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Location(e) => e.user_message(),
            Self::Weather(e) => e.user_message(),
        }
    }
}
