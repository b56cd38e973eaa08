use anyhow::{Context, Result};

use gridcast_core::Config;
use gridcast_weather::icons::emoji_for;
use gridcast_weather::{
    resolve_city_state, resolve_postal_code, ForecastClient, GeoResolver, GridResolver,
    RefreshConfig, RefreshScheduler,
};

/// Headless shell: resolve a location from the command line if one is
/// given, then start the refresh loop and print the first snapshot. The
/// graphical presentation layer consumes the same handle.
#[tokio::main]
async fn main() -> Result<()> {
    gridcast_core::init()?;

    let mut config = Config::load().context("Failed to load configuration")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [city, state_or_code] => {
            if !update_location(&mut config, city, state_or_code).await? {
                return Ok(());
            }
        }
        _ => {
            eprintln!("Usage: gridcast [<city> <state-or-postal-code>]");
            return Ok(());
        }
    }

    if !config.location.is_valid() {
        println!("No location configured. Run: gridcast <city> <state-or-postal-code>");
        return Ok(());
    }

    let client = ForecastClient::new()?;
    let scheduler = RefreshScheduler::new(
        client,
        config.location.clone(),
        RefreshConfig::default(),
    );
    let handle = scheduler.start();

    tracing::info!("Waiting for initial forecast data");
    let Some(snapshot) = handle.wait_for_initial_data().await else {
        anyhow::bail!("Refresh worker stopped before any data arrived");
    };

    let city = config.location.city.as_deref().unwrap_or("?");
    let state = config.location.state.as_deref().unwrap_or("?");
    if let Some(period) = snapshot.hourly.first_period() {
        let (_, glyph) = emoji_for(&period.short_forecast, period.is_daytime);
        println!(
            "{} {}°F, {} in {}, {}",
            glyph, period.temperature, period.short_forecast, city, state
        );
        if let Some(dewpoint) = period.dewpoint_fahrenheit() {
            println!("   Dew point {}°F, wind {} {}", dewpoint, period.wind_speed, period.wind_direction);
        }
    }

    let county = config.location.county.as_deref().unwrap_or_default();
    for alert in snapshot.alerts_for_county(county).values() {
        println!("!! {}: {}", alert.event, alert.description);
    }

    handle.stop();
    Ok(())
}

/// Resolve the command-line location and persist it. Returns false when
/// resolution failed and the error has already been shown.
async fn update_location(config: &mut Config, city: &str, state_or_code: &str) -> Result<bool> {
    let geo = GeoResolver::new()?;
    let grid = GridResolver::new()?;

    // An all-digit second argument is a postal code, anything else is a
    // state name or abbreviation.
    let resolved = if state_or_code.chars().all(|c| c.is_ascii_digit()) {
        resolve_postal_code(&geo, &grid, city, state_or_code).await
    } else {
        resolve_city_state(&geo, &grid, city, state_or_code).await
    };

    match resolved {
        Ok(location) => {
            config.location = location;
            config.save().context("Failed to save configuration")?;
            Ok(true)
        }
        Err(e) => {
            // Back to the location-input state, with the cause attached.
            eprintln!("{}", e.user_message());
            Ok(false)
        }
    }
}
