//! NWS grid-point resolution: coordinates to (office, gridX, gridY).

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::LocationError;

pub(crate) const NWS_URL: &str = "https://api.weather.gov";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "gridcast/0.1 (https://github.com/gridcast)";

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    grid_id: String,
    grid_x: i64,
    grid_y: i64,
}

/// The forecast-office-relative grid cell for a point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub office: String,
    pub grid_x: i64,
    pub grid_y: i64,
}

#[derive(Debug, Clone)]
pub struct GridResolver {
    client: Client,
    base_url: String,
}

impl GridResolver {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_base_url(NWS_URL)
    }

    /// Point the resolver at an alternate service (tests use this).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Look up the grid cell covering a coordinate pair.
    pub async fn resolve(&self, latitude: f64, longitude: f64) -> Result<GridCell, LocationError> {
        let url = format!("{}/points/{},{}", self.base_url, latitude, longitude);
        let response: PointsResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(
            "Point ({}, {}) maps to {} grid ({}, {})",
            latitude,
            longitude,
            response.properties.grid_id,
            response.properties.grid_x,
            response.properties.grid_y
        );

        Ok(GridCell {
            office: response.properties.grid_id,
            grid_x: response.properties.grid_x,
            grid_y: response.properties.grid_y,
        })
    }
}
