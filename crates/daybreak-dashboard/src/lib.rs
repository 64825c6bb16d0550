//! Refresh loop and state for the Daybreak dashboard.
//!
//! `DashboardController` runs location, weather and insight lookups on a
//! fixed cadence and publishes each result as an immutable `DashboardState`
//! snapshot. Narration is triggered separately and guarded against overlap.

pub mod controller;
pub mod error;
pub mod narration;
pub mod state;

pub use controller::{DashboardController, DashboardHandle, DashboardSettings};
pub use error::DashboardError;
pub use narration::{compose_narration, date_label};
pub use state::{DashboardPhase, DashboardState};
