//! Change detection between the published snapshot and a fresh poll.

use crate::types::{filter_alerts, AlertsPayload, ForecastPayload, ForecastSnapshot};

/// Decide whether a fresh poll differs enough from the published snapshot
/// to warrant republishing.
///
/// Exactly three facets are compared: the first hourly period's
/// temperature, its short-forecast text, and the county-filtered alert set
/// (any addition, removal, or text edit counts). Everything else - later
/// periods, the detailed forecast, alerts outside the county - changes
/// constantly without being worth a redraw.
pub fn has_material_change(
    previous: &ForecastSnapshot,
    current_hourly: &ForecastPayload,
    current_alerts: &AlertsPayload,
    county: &str,
) -> bool {
    match (previous.hourly.first_period(), current_hourly.first_period()) {
        (Some(last), Some(current)) => {
            if last.temperature != current.temperature
                || last.short_forecast != current.short_forecast
            {
                return true;
            }
        }
        (None, None) => {}
        // A first period appearing or disappearing is itself a change.
        _ => return true,
    }

    filter_alerts(&previous.alerts, county) != filter_alerts(current_alerts, county)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlertFeature, AlertProperties, ForecastPeriod, ForecastProperties};

    fn hourly(temperature: i64, short_forecast: &str) -> ForecastPayload {
        ForecastPayload {
            properties: ForecastProperties {
                periods: vec![ForecastPeriod {
                    name: String::new(),
                    start_time: "2026-08-04T14:00:00-04:00".parse().unwrap(),
                    end_time: None,
                    temperature,
                    is_daytime: true,
                    short_forecast: short_forecast.to_string(),
                    detailed_forecast: String::new(),
                    relative_humidity: None,
                    wind_speed: "10 mph".to_string(),
                    wind_direction: "SE".to_string(),
                    probability_of_precipitation: None,
                    dewpoint: None,
                }],
            },
        }
    }

    fn alerts(entries: &[&str]) -> AlertsPayload {
        AlertsPayload {
            features: entries
                .iter()
                .map(|event| AlertFeature {
                    properties: AlertProperties {
                        area_desc: "Orange County".to_string(),
                        event: event.to_string(),
                        description: format!("{} in effect", event),
                        instruction: None,
                    },
                })
                .collect(),
        }
    }

    fn snapshot(temperature: i64, short_forecast: &str, alert_events: &[&str]) -> ForecastSnapshot {
        ForecastSnapshot {
            hourly: hourly(temperature, short_forecast),
            detailed: hourly(temperature, short_forecast),
            alerts: alerts(alert_events),
        }
    }

    #[test]
    fn test_identical_data_is_not_a_change() {
        let previous = snapshot(92, "Sunny", &["Heat Advisory"]);
        assert!(!has_material_change(
            &previous,
            &previous.hourly,
            &previous.alerts,
            "Orange"
        ));
    }

    #[test]
    fn test_temperature_change_alone_is_material() {
        let previous = snapshot(92, "Sunny", &[]);
        assert!(has_material_change(
            &previous,
            &hourly(93, "Sunny"),
            &alerts(&[]),
            "Orange"
        ));
    }

    #[test]
    fn test_short_forecast_change_alone_is_material() {
        let previous = snapshot(92, "Sunny", &[]);
        assert!(has_material_change(
            &previous,
            &hourly(92, "Mostly Sunny"),
            &alerts(&[]),
            "Orange"
        ));
    }

    #[test]
    fn test_new_alert_alone_is_material() {
        let previous = snapshot(92, "Sunny", &[]);
        assert!(has_material_change(
            &previous,
            &hourly(92, "Sunny"),
            &alerts(&["Tornado Warning"]),
            "Orange"
        ));
    }

    #[test]
    fn test_alert_text_edit_is_material() {
        let previous = snapshot(92, "Sunny", &["Flood Watch"]);
        let mut current = alerts(&["Flood Watch"]);
        current.features[0].properties.description = "Extended through Tuesday".to_string();
        assert!(has_material_change(
            &previous,
            &hourly(92, "Sunny"),
            &current,
            "Orange"
        ));
    }

    #[test]
    fn test_alert_outside_the_county_is_not_material() {
        let previous = snapshot(92, "Sunny", &[]);
        let mut current = alerts(&["Rip Current Statement"]);
        current.features[0].properties.area_desc = "Volusia County".to_string();
        assert!(!has_material_change(
            &previous,
            &hourly(92, "Sunny"),
            &current,
            "Orange"
        ));
    }
}
