use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use daybreak_core::{Config, ConfigError, LocationMode};
use daybreak_dashboard::{DashboardController, DashboardPhase, DashboardSettings, DashboardState};
use daybreak_insight::{GeminiTransport, InsightClient, OpenRouterTransport};
use daybreak_narration::{CommandAudioOutput, EspeakSynthesizer, NarrationService, SpeechClient};
use daybreak_weather::{Coordinates, FixedLocation, IpLocator, LocationProvider, WeatherClient};
use tokio::io::{AsyncBufReadExt, BufReader};

fn build_controller(config: &Config) -> Result<Arc<DashboardController>> {
    let location: Arc<dyn LocationProvider> = match config.location.mode {
        LocationMode::Fixed => {
            let (Some(latitude), Some(longitude)) =
                (config.location.latitude, config.location.longitude)
            else {
                return Err(ConfigError::MissingSetting("location.latitude/longitude".into()).into());
            };
            Arc::new(FixedLocation::new(Coordinates::new(latitude, longitude)))
        }
        LocationMode::Auto => Arc::new(IpLocator::new(&config.location.ip_locator_url)),
    };

    let weather = WeatherClient::with_endpoints(
        &config.weather.forecast_url,
        &config.weather.geocode_url,
        &config.weather.user_agent,
    )
    .context("Failed to build weather client")?;

    let insight = InsightClient::new(
        GeminiTransport::new_with_base_url(
            config.insight.gemini_api_key.clone(),
            &config.insight.gemini_model,
            &config.insight.gemini_url,
        ),
        OpenRouterTransport::new_with_base_url(
            config.insight.openrouter_api_key.clone(),
            &config.insight.openrouter_model,
            &config.insight.openrouter_url,
        ),
    );

    let narration = NarrationService::new(
        SpeechClient::new_with_base_url(
            config.insight.gemini_api_key.clone(),
            &config.narration.speech_model,
            &config.narration.voice,
            &config.insight.gemini_url,
        ),
        Arc::new(CommandAudioOutput::new(config.narration.player.clone())),
        Arc::new(EspeakSynthesizer::new(config.narration.espeak_bin.clone())),
    );

    Ok(Arc::new(DashboardController::new(
        location,
        weather,
        insight,
        Arc::new(narration),
        DashboardSettings::from_config(config),
    )))
}

fn render(state: &DashboardState) {
    let now = Local::now();
    println!();
    println!("{}", now.format("%H:%M  %A, %B %-d, %Y"));

    if state.shows_initial_loading() {
        println!("Initializing board...");
        return;
    }

    if let Some(weather) = &state.weather {
        println!(
            "{}  {}°C  {}{}",
            weather.place_name,
            weather.rounded_temperature(),
            weather.condition_text,
            if weather.is_daytime { "" } else { " (night)" }
        );
    }

    if let Some(insight) = &state.insight {
        println!("Today: {} ({})", insight.event, insight.location);
        println!("  {}", insight.description);
        if let Some(event) = &insight.historical_weather {
            println!("  On this day in {}: {}. {}", event.year, event.name, event.description);
        }
        println!("  Backdrop: {}", insight.background_image_url());
    }

    match state.phase {
        DashboardPhase::Loading => println!("Refreshing..."),
        DashboardPhase::Error => {
            if let Some(err) = &state.last_error {
                println!("Error: {}", err);
            }
        }
        DashboardPhase::Idle | DashboardPhase::Ready => {}
    }

    if state.is_narrating {
        println!("Speaking...");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    daybreak_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let controller = build_controller(&config)?;

    tracing::info!("Daybreak started");
    println!("Daybreak: press Enter to hear the time and weather, 'r' to refresh, 'q' to quit");

    let mut rx = controller.subscribe();
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            render(&state);
        }
    });

    let handle = controller.start();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                match line.context("Failed to read stdin")?.as_deref().map(str::trim) {
                    None | Some("q") => break,
                    Some("") => {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move { controller.narrate().await });
                    }
                    Some("r") => {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move { controller.refresh().await });
                    }
                    Some(other) => println!("Unknown command: {other}"),
                }
            }
        }
    }

    handle.shutdown().await;
    printer.abort();
    tracing::info!("Daybreak stopped");

    Ok(())
}
