//! Text composed for the insight prompt and the spoken readout.

use chrono::{DateTime, TimeZone};
use daybreak_weather::WeatherSnapshot;

/// Month and day, e.g. "October 18"
pub fn date_label<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%B %-d").to_string()
}

/// Sentence read aloud by the narration trigger.
///
/// Always carries the full date and 24-hour time; the weather sentence is
/// appended only when a snapshot is available.
pub fn compose_narration<Tz: TimeZone>(now: &DateTime<Tz>, weather: Option<&WeatherSnapshot>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut text = format!(
        "Today is {}. The current time is {}.",
        now.format("%A, %B %-d, %Y"),
        now.format("%H:%M")
    );

    if let Some(weather) = weather {
        text.push_str(&format!(
            " In {}, the weather is currently {} with a temperature of {} degrees Celsius.",
            weather.place_name,
            weather.condition_text,
            weather.rounded_temperature()
        ));
    }

    text
}
