//! NWS wire models and the published forecast snapshot.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A measured value with its WMO unit code, as NWS nests them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitValue {
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_code: Option<String>,
}

/// One forecast period. The hourly and detailed endpoints share this shape;
/// the detailed variant fills `name` and `detailed_forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    #[serde(default)]
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub end_time: Option<DateTime<FixedOffset>>,
    pub temperature: i64,
    pub is_daytime: bool,
    pub short_forecast: String,
    #[serde(default)]
    pub detailed_forecast: String,
    #[serde(default)]
    pub relative_humidity: Option<UnitValue>,
    #[serde(default)]
    pub wind_speed: String,
    #[serde(default)]
    pub wind_direction: String,
    #[serde(default)]
    pub probability_of_precipitation: Option<UnitValue>,
    #[serde(default)]
    pub dewpoint: Option<UnitValue>,
}

impl ForecastPeriod {
    /// NWS reports dewpoint in Celsius; the display unit is Fahrenheit.
    pub fn dewpoint_fahrenheit(&self) -> Option<i64> {
        let celsius = self.dewpoint.as_ref()?.value?;
        Some((celsius * 9.0 / 5.0 + 32.0).round() as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastProperties {
    pub periods: Vec<ForecastPeriod>,
}

/// A gridpoint forecast payload (`/forecast` or `/forecast/hourly`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub properties: ForecastProperties,
}

impl ForecastPayload {
    pub fn first_period(&self) -> Option<&ForecastPeriod> {
        self.properties.periods.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    pub area_desc: String,
    pub event: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertFeature {
    pub properties: AlertProperties,
}

/// The active-alerts payload (`/alerts/active?area={state}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertsPayload {
    pub features: Vec<AlertFeature>,
}

/// One alert that matched the configured county.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDetail {
    pub event: String,
    pub description: String,
    pub instruction: Option<String>,
}

/// Alerts keyed by event name. An ordered map so two filtered sets compare
/// with plain equality.
pub type AlertMatches = BTreeMap<String, AlertDetail>;

/// Keep only alerts whose area description mentions the county. Duplicate
/// event names collapse, last write wins.
pub fn filter_alerts(payload: &AlertsPayload, county: &str) -> AlertMatches {
    let mut matches = AlertMatches::new();
    if county.is_empty() {
        return matches;
    }

    for feature in &payload.features {
        let alert = &feature.properties;
        if alert.area_desc.contains(county) {
            matches.insert(
                alert.event.clone(),
                AlertDetail {
                    event: alert.event.clone(),
                    description: alert.description.clone(),
                    instruction: alert.instruction.clone(),
                },
            );
        }
    }
    matches
}

/// The complete data set the presentation layer renders from.
///
/// Published as a whole behind an `Arc`; a snapshot is either fully
/// populated or never published.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSnapshot {
    pub hourly: ForecastPayload,
    pub detailed: ForecastPayload,
    pub alerts: AlertsPayload,
}

impl ForecastSnapshot {
    pub fn into_shared(self) -> Arc<ForecastSnapshot> {
        Arc::new(self)
    }

    pub fn alerts_for_county(&self, county: &str) -> AlertMatches {
        filter_alerts(&self.alerts, county)
    }
}
