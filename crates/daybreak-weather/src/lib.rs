//! Weather and location for Daybreak
//!
//! Provides the device position (IP lookup or fixed coordinates), current
//! conditions via the Open-Meteo API and place names via Nominatim.

pub mod geocode;
pub mod location;
pub mod provider;
pub mod types;

pub use geocode::{UNKNOWN_LOCATION, YOUR_LOCATION};
pub use location::{FixedLocation, IpLocator, LocationProvider, DEFAULT_LOCATION_TIMEOUT};
pub use provider::WeatherClient;
pub use types::*;
