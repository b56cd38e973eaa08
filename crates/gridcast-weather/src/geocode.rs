//! Forward geocoding: convert a city/state pair or postal code into
//! coordinates, county, and state abbreviation.
//! Uses a Nominatim-style service - free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::LocationError;
use crate::states;

const GEOCODE_URL: &str = "https://geocode.maps.co";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "gridcast/0.1 (https://github.com/gridcast)";

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResult {
    display_name: String,
    address: ReverseAddress,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    county: Option<String>,
    state: Option<String>,
}

/// A successfully geocoded place, ready for grid resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    /// Rounded to 4 decimal places.
    pub latitude: f64,
    pub longitude: f64,
    /// " County" suffix already stripped.
    pub county: String,
    /// Canonical 2-letter abbreviation.
    pub state: String,
}

#[derive(Debug, Clone)]
pub struct GeoResolver {
    client: Client,
    base_url: String,
}

impl GeoResolver {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_base_url(GEOCODE_URL)
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

    /// Resolve a city plus state name or 2-letter code.
    ///
    /// The state is normalized through the reference table first; after the
    /// search, a reverse lookup at the returned coordinates must mention
    /// the state's full name, which rejects a city that merely shares its
    /// name with one in the claimed state.
    pub async fn resolve_city_state(
        &self,
        city: &str,
        state: &str,
    ) -> Result<ResolvedPlace, LocationError> {
        let abbr = states::normalize_state(state)?;

        let result = self
            .search(&[("city", city), ("state", abbr), ("country", "US")], city)
            .await?;

        let latitude = round4(parse_coordinate(&result.lat, "lat")?);
        let longitude = round4(parse_coordinate(&result.lon, "lon")?);

        let county = county_from_display_name(&result.display_name)
            .ok_or(LocationError::MissingField("display_name county segment"))?;
        let county = strip_county_suffix(county).to_string();

        // Cross-check that the coordinates actually fall in the claimed
        // state. full_name is total over normalized abbreviations.
        let reverse = self.reverse(latitude, longitude).await?;
        let state_name = states::full_name(abbr).unwrap_or(abbr);
        if !reverse.display_name.contains(state_name) {
            return Err(LocationError::CityStateMismatch {
                city: city.to_string(),
                state: abbr.to_string(),
            });
        }

        tracing::info!(
            "Geocoded {}, {} to ({}, {}) in {} county",
            city,
            abbr,
            latitude,
            longitude,
            county
        );

        Ok(ResolvedPlace {
            latitude,
            longitude,
            county,
            state: abbr.to_string(),
        })
    }

    /// Resolve a postal code. The state comes out of the reverse lookup,
    /// so an unknown or non-US state name still fails as invalid input.
    pub async fn resolve_postal_code(&self, code: &str) -> Result<ResolvedPlace, LocationError> {
        let result = self
            .search(&[("postalcode", code), ("country", "US")], code)
            .await?;

        let latitude = round4(parse_coordinate(&result.lat, "lat")?);
        let longitude = round4(parse_coordinate(&result.lon, "lon")?);

        let reverse = self.reverse(latitude, longitude).await?;
        let county = reverse
            .address
            .county
            .ok_or(LocationError::MissingField("address.county"))?;
        let county = strip_county_suffix(&county).to_string();

        let state_name = reverse
            .address
            .state
            .ok_or(LocationError::MissingField("address.state"))?;
        let abbr = states::normalize_state(&state_name)?;

        tracing::info!(
            "Geocoded postal code {} to ({}, {}) in {} county, {}",
            code,
            latitude,
            longitude,
            county,
            abbr
        );

        Ok(ResolvedPlace {
            latitude,
            longitude,
            county,
            state: abbr.to_string(),
        })
    }

    async fn search(
        &self,
        query: &[(&str, &str)],
        described_as: &str,
    ) -> Result<SearchResult, LocationError> {
        let url = format!("{}/search", self.base_url);
        let mut results: Vec<SearchResult> = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if results.is_empty() {
            return Err(LocationError::NoResults(described_as.to_string()));
        }
        Ok(results.swap_remove(0))
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Result<ReverseResult, LocationError> {
        let url = format!("{}/reverse", self.base_url);
        let result = self
            .client
            .get(&url)
            .query(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(result)
    }
}

/// Strip a trailing " County" from a county name; no-op when absent.
pub fn strip_county_suffix(county: &str) -> &str {
    county.strip_suffix(" County").unwrap_or(county)
}

/// The county lives in the second comma-separated segment of a search
/// result's display name ("Orlando, Orange County, Florida, United States").
fn county_from_display_name(display_name: &str) -> Option<&str> {
    let segment = display_name.split(',').nth(1)?.trim();
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

fn parse_coordinate(raw: &str, field: &'static str) -> Result<f64, LocationError> {
    raw.parse::<f64>()
        .map_err(|_| LocationError::MissingField(field))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_county_suffix() {
        assert_eq!(strip_county_suffix("Orange County"), "Orange");
        assert_eq!(strip_county_suffix("Orange"), "Orange");
        assert_eq!(strip_county_suffix("Miami-Dade"), "Miami-Dade");
    }

    #[test]
    fn test_county_from_display_name() {
        assert_eq!(
            county_from_display_name("Orlando, Orange County, Florida, United States"),
            Some("Orange County")
        );
        assert_eq!(county_from_display_name("Orlando"), None);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(28.542_111_9), 28.5421);
        assert_eq!(round4(-81.378_950_1), -81.379);
        assert_eq!(round4(10.0), 10.0);
    }

    #[test]
    fn test_parse_coordinate_rejects_garbage() {
        assert!(parse_coordinate("28.5421", "lat").is_ok());
        assert!(matches!(
            parse_coordinate("north-ish", "lat"),
            Err(LocationError::MissingField("lat"))
        ));
    }
}
