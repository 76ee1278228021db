use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use stylecast_advice::GeminiClient;
use stylecast_coordinator::{Coordinator, CoordinatorSettings, Snapshot};
use stylecast_core::Config;
use stylecast_weather::OpenMeteoProvider;

const ADVICE_WAIT: Duration = Duration::from_secs(45);

#[tokio::main]
async fn main() -> Result<()> {
    stylecast_core::init();

    let config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => {
            tracing::warn!("Falling back to default configuration: {:#}", e);
            let mut config = Config::default();
            config.apply_overrides(|name| std::env::var(name).ok());
            config
        }
    };

    let forecast = Arc::new(OpenMeteoProvider::new(&config.forecast)?);
    let advice = Arc::new(GeminiClient::new(&config.advice)?);
    let coordinator = Coordinator::new(
        forecast,
        advice,
        CoordinatorSettings::from_config(&config),
    );

    tracing::info!("Stylecast started");

    let chain = config
        .coordinator
        .chain_advice
        .then(|| coordinator.spawn_advice_chain());

    let mut updates = coordinator.subscribe();
    coordinator.fetch_primary().await;

    if chain.is_some() && coordinator.snapshot().has_forecast() {
        let timed_out = tokio::time::timeout(
            ADVICE_WAIT,
            updates.wait_for(|s| s.advice.is_some() && !s.advice_loading),
        )
        .await
        .is_err();
        if timed_out {
            tracing::warn!("Gave up waiting for advice after {:?}", ADVICE_WAIT);
        }
    }

    print_snapshot(&config.forecast.location_name, &coordinator.snapshot());

    // Graceful shutdown
    coordinator.shutdown();
    if let Some(chain) = chain {
        if let Err(e) = chain.await {
            tracing::warn!("Advice chain ended abnormally: {}", e);
        }
    }

    Ok(())
}

fn print_snapshot(location: &str, snapshot: &Snapshot) {
    println!("Stylecast - {}", location);

    if let Some(error) = &snapshot.error_message {
        println!("\n{}", error);
    }

    if let Some(temperature) = snapshot.temperature {
        println!("\nNow: {:.1}°C", temperature);
    }

    if let Some(h) = snapshot.highlights() {
        println!("  00:00  {:.1}°C", h.midnight);
        println!("  12:00  {:.1}°C", h.noon);
        println!("  18:00  {:.1}°C", h.evening);
    }

    if let Some(advice) = &snapshot.advice {
        println!("\n{}", advice);
    }

    if let Some(updated_at) = snapshot.updated_at {
        println!("\nUpdated: {}", updated_at.format("%Y-%m-%d %H:%M UTC"));
    }
}
