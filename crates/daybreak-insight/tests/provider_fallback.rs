//! Provider fallback against mock Gemini and OpenRouter servers.

use std::time::Duration;

use daybreak_insight::{
    CulturalInsight, GeminiTransport, InsightClient, InsightProvider, OpenRouterTransport,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn insight_json() -> String {
    serde_json::json!({
        "event": "Birth of Pelé",
        "location": "Três Corações, Brazil",
        "description": "Edson Arantes do Nascimento, Pelé, was born.",
        "themeColor": "#FFDF00",
        "imageKeyword": "football",
        "historicalWeather": {
            "name": "Great Blizzard of 1888",
            "year": 1888,
            "description": "Snowfall of up to 150 cm paralysed the US East Coast.",
            "type": "extreme_cold"
        }
    })
    .to_string()
}

async fn gemini_server(status: u16, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": insight_json() }] } }]
        }))
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(template)
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

async fn openrouter_server(body: ResponseTemplate, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(body)
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn client(gemini: &MockServer, openrouter: &MockServer) -> InsightClient {
    InsightClient::new(
        GeminiTransport::new_with_base_url(Some("g_key".into()), "gemini-test", &gemini.uri()),
        OpenRouterTransport::new_with_base_url(
            Some("or_key".into()),
            "test/model",
            &openrouter.uri(),
        ),
    )
}

#[tokio::test]
async fn test_malformed_secondary_falls_back_to_primary() {
    let gemini = gemini_server(200, 1).await;
    let openrouter = openrouter_server(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "{\"event\": 42}" } }]
        })),
        1,
    )
    .await;

    let insight = client(&gemini, &openrouter)
        .get_cultural_insight("October 23", "Clear sky", InsightProvider::Secondary)
        .await;

    assert_eq!(insight.event, "Birth of Pelé");
    assert_eq!(insight.provider_used, InsightProvider::Primary);
    // MockServer verifies the expected call counts on drop
}

#[tokio::test]
async fn test_both_providers_down_yields_fixed_insight() {
    let gemini = gemini_server(503, 1).await;
    let openrouter = openrouter_server(ResponseTemplate::new(500), 1).await;

    let insight = client(&gemini, &openrouter)
        .get_cultural_insight("October 23", "Clear sky", InsightProvider::Secondary)
        .await;

    assert_eq!(insight, CulturalInsight::fallback());
}

#[tokio::test]
async fn test_primary_request_never_touches_secondary() {
    let gemini = gemini_server(200, 1).await;
    let openrouter = openrouter_server(ResponseTemplate::new(200), 0).await;

    let insight = client(&gemini, &openrouter)
        .get_cultural_insight("October 23", "Clear sky", InsightProvider::Primary)
        .await;

    assert_eq!(insight.provider_used, InsightProvider::Primary);
    assert_eq!(insight.historical_weather.unwrap().year, 1888);
}

#[tokio::test]
async fn test_stalled_providers_still_yield_fixed_insight() {
    let stalled = || ResponseTemplate::new(200).set_delay(Duration::from_secs(600));
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(stalled())
        .mount(&gemini)
        .await;
    let openrouter = openrouter_server(stalled(), 1).await;

    let bound = Duration::from_millis(300);
    let client = InsightClient::new(
        GeminiTransport::new_with_base_url(Some("g_key".into()), "gemini-test", &gemini.uri())
            .with_timeout(bound),
        OpenRouterTransport::new_with_base_url(Some("or_key".into()), "test/model", &openrouter.uri())
            .with_timeout(bound),
    );

    let insight = tokio::time::timeout(
        Duration::from_secs(10),
        client.get_cultural_insight("October 23", "Clear sky", InsightProvider::Secondary),
    )
    .await
    .expect("request timeout should end both provider attempts");

    assert_eq!(insight, CulturalInsight::fallback());
}
