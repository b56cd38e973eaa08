//! Refresh-loop behavior against a mocked NWS service: initial fetch-all,
//! change-gated republish, and stop semantics.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gridcast_core::LocationConfig;
use gridcast_weather::{ForecastClient, RefreshConfig, RefreshScheduler, RetryPolicy};

fn orlando() -> LocationConfig {
    LocationConfig {
        city: Some("Orlando".to_string()),
        state: Some("FL".to_string()),
        postal_code: None,
        county: Some("Orange".to_string()),
        latitude: Some(28.5421),
        longitude: Some(-81.3790),
        office: Some("MLB".to_string()),
        grid_x: Some("72".to_string()),
        grid_y: Some("52".to_string()),
    }
}

fn fast_config() -> RefreshConfig {
    RefreshConfig {
        interval: Duration::from_millis(50),
        initial_data_poll: Duration::from_millis(5),
    }
}

fn forecast_body(temperature: i64, short_forecast: &str) -> serde_json::Value {
    serde_json::json!({
        "properties": {
            "periods": [{
                "name": "This Afternoon",
                "startTime": "2026-08-04T14:00:00-04:00",
                "endTime": "2026-08-04T15:00:00-04:00",
                "isDaytime": true,
                "temperature": temperature,
                "shortForecast": short_forecast,
                "detailedForecast": "Sunny, with a high near 92.",
                "windSpeed": "10 mph",
                "windDirection": "SE"
            }]
        }
    })
}

fn alerts_body(entries: &[(&str, &str)]) -> serde_json::Value {
    let features: Vec<serde_json::Value> = entries
        .iter()
        .map(|(event, area_desc)| {
            serde_json::json!({
                "properties": {
                    "areaDesc": area_desc,
                    "event": event,
                    "description": format!("{} in effect", event),
                    "instruction": "Take cover."
                }
            })
        })
        .collect();
    serde_json::json!({ "features": features })
}

async fn mount_forecasts(server: &MockServer, temperature: i64, short_forecast: &str) {
    Mock::given(method("GET"))
        .and(path("/gridpoints/MLB/72,52/forecast/hourly"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(forecast_body(temperature, short_forecast)),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gridpoints/MLB/72,52/forecast"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(forecast_body(temperature, short_forecast)),
        )
        .mount(server)
        .await;
}

async fn mount_alerts(server: &MockServer, entries: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .and(query_param("area", "FL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_body(entries)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_first_cycle_fetches_all_and_publishes() {
    let server = MockServer::start().await;
    mount_forecasts(&server, 92, "Sunny").await;
    mount_alerts(&server, &[("Heat Advisory", "Orange County")]).await;

    let client = ForecastClient::with_base_url(server.uri()).unwrap();
    let handle = RefreshScheduler::new(client, orlando(), fast_config()).start();

    let snapshot = tokio::time::timeout(Duration::from_secs(5), handle.wait_for_initial_data())
        .await
        .expect("initial data should arrive")
        .expect("worker should still be running");

    assert!(handle.initial_data_fetched());
    // The first publish is the baseline, not an update.
    assert!(!handle.updated());

    let period = snapshot.hourly.first_period().unwrap();
    assert_eq!(period.temperature, 92);
    assert_eq!(period.short_forecast, "Sunny");
    assert!(!snapshot.detailed.properties.periods.is_empty());

    let matches = snapshot.alerts_for_county("Orange");
    assert_eq!(matches.len(), 1);
    assert!(matches.contains_key("Heat Advisory"));

    handle.stop();
}

#[tokio::test]
async fn test_unchanged_payloads_do_not_republish() {
    let server = MockServer::start().await;
    mount_forecasts(&server, 92, "Sunny").await;
    mount_alerts(&server, &[]).await;

    let client = ForecastClient::with_base_url(server.uri()).unwrap();
    let mut handle = RefreshScheduler::new(client, orlando(), fast_config()).start();

    assert!(handle.wait_for_cycle().await);
    let first = handle.snapshot().expect("first cycle should publish");

    assert!(handle.wait_for_cycle().await);
    handle.stop();
    let second = handle.snapshot().expect("snapshot should remain published");

    // Identical payloads leave the published Arc untouched.
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!handle.updated());
}

#[tokio::test]
async fn test_temperature_change_republishes() {
    let server = MockServer::start().await;

    // First hourly poll sees 92; every later one sees 95.
    Mock::given(method("GET"))
        .and(path("/gridpoints/MLB/72,52/forecast/hourly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(92, "Sunny")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gridpoints/MLB/72,52/forecast/hourly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(95, "Sunny")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gridpoints/MLB/72,52/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(92, "Sunny")))
        .mount(&server)
        .await;
    mount_alerts(&server, &[]).await;

    let client = ForecastClient::with_base_url(server.uri()).unwrap();
    let mut handle = RefreshScheduler::new(client, orlando(), fast_config()).start();

    assert!(handle.wait_for_cycle().await);
    let first = handle.snapshot().unwrap();
    assert_eq!(first.hourly.first_period().unwrap().temperature, 92);

    assert!(handle.wait_for_cycle().await);
    handle.stop();

    assert!(handle.updated());
    let second = handle.snapshot().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.hourly.first_period().unwrap().temperature, 95);
}

#[tokio::test]
async fn test_new_alert_republishes() {
    let server = MockServer::start().await;
    mount_forecasts(&server, 92, "Sunny").await;

    // No alerts on the first poll, a county-matching one afterwards.
    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .and(query_param("area", "FL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_body(&[])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alerts/active"))
        .and(query_param("area", "FL"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(alerts_body(&[("Tornado Warning", "Orange County; Seminole")])),
        )
        .mount(&server)
        .await;

    let client = ForecastClient::with_base_url(server.uri()).unwrap();
    let mut handle = RefreshScheduler::new(client, orlando(), fast_config()).start();

    assert!(handle.wait_for_cycle().await);
    let first = handle.snapshot().unwrap();
    assert!(first.alerts_for_county("Orange").is_empty());

    assert!(handle.wait_for_cycle().await);
    handle.stop();

    assert!(handle.updated());
    let second = handle.snapshot().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.alerts_for_county("Orange").contains_key("Tornado Warning"));
}

#[tokio::test]
async fn test_stop_interrupts_an_in_flight_retry_wait() {
    let server = MockServer::start().await;

    // Every fetch fails, pushing the client into its retry wait.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ForecastClient::with_base_url(server.uri())
        .unwrap()
        .with_retry_policy(RetryPolicy {
            delay: Duration::from_secs(60),
            max_attempts: None,
        });
    let mut handle = RefreshScheduler::new(client, orlando(), fast_config()).start();

    // Let the first attempt fail and the worker settle into the wait.
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.stop();

    // The worker exits well before the 60-second delay elapses.
    let more_cycles = tokio::time::timeout(Duration::from_secs(5), handle.wait_for_cycle())
        .await
        .expect("worker should stop promptly");
    assert!(!more_cycles);
    assert!(handle.snapshot().is_none());
}

#[tokio::test]
async fn test_attempt_ceiling_stops_the_worker() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ForecastClient::with_base_url(server.uri())
        .unwrap()
        .with_retry_policy(RetryPolicy {
            delay: Duration::from_millis(5),
            max_attempts: Some(2),
        });
    let mut handle = RefreshScheduler::new(client, orlando(), fast_config()).start();

    let more_cycles = tokio::time::timeout(Duration::from_secs(5), handle.wait_for_cycle())
        .await
        .expect("worker should give up promptly");
    assert!(!more_cycles);
    assert!(handle.snapshot().is_none());
    assert!(!handle.initial_data_fetched());
}
