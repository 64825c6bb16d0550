/// Build the request sent to every insight provider.
///
/// `date` is a month-day label such as "October 18"; `weather` is the
/// current condition text.
pub fn build_prompt(date: &str, weather: &str) -> String {
    format!(
        r#"Today is {date}. The current weather is {weather}.
Focus EXCLUSIVELY on:
1. Brazil (Brasil).
2. English-speaking countries (USA, UK, Canada, Australia, New Zealand, Ireland, etc.).

Tasks:
1. Find a NOTABLE CULTURAL MILESTONE, holiday, or anniversary (e.g., a famous artist's birth, a historical event, a landmark pop culture moment) that falls on this day in Brazil or an English-speaking country.
2. Find a SIGNIFICANT HISTORICAL WEATHER EVENT (e.g., historic storms, extreme heatwaves, famous blizzards, floods) that occurred on this specific calendar day in history within these same regions.

Return a JSON object with this EXACT structure:
{{
  "event": "string",
  "location": "string",
  "description": "string",
  "themeColor": "hex string",
  "imageKeyword": "string",
  "historicalWeather": {{
    "name": "string",
    "year": number,
    "description": "string",
    "type": "extreme_heat" | "extreme_cold" | "storm" | "flood" | "other"
  }}
}}"#
    )
}
