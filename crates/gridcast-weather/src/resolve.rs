//! End-to-end location resolution: free-text input to a complete record.
//!
//! Geocoding and grid lookup happen in sequence; the result is the full
//! `LocationConfig` the caller persists wholesale. Failures surface once -
//! this runs on a user action, and the user is the retry loop.

use gridcast_core::LocationConfig;

use crate::error::LocationError;
use crate::geocode::{GeoResolver, ResolvedPlace};
use crate::grid::{GridCell, GridResolver};

/// Resolve a city plus state (full name or 2-letter code) into a complete
/// location record.
pub async fn resolve_city_state(
    geo: &GeoResolver,
    grid: &GridResolver,
    city: &str,
    state: &str,
) -> Result<LocationConfig, LocationError> {
    let place = geo.resolve_city_state(city, state).await?;
    let cell = grid.resolve(place.latitude, place.longitude).await?;

    tracing::info!(
        "Resolved {}, {} to {} grid ({}, {})",
        city,
        place.state,
        cell.office,
        cell.grid_x,
        cell.grid_y
    );

    Ok(location_record(city, None, place, cell))
}

/// Resolve a postal code into a complete location record. The city is the
/// user's label for the record; resolution is keyed by the code alone.
pub async fn resolve_postal_code(
    geo: &GeoResolver,
    grid: &GridResolver,
    city: &str,
    code: &str,
) -> Result<LocationConfig, LocationError> {
    let place = geo.resolve_postal_code(code).await?;
    let cell = grid.resolve(place.latitude, place.longitude).await?;

    tracing::info!(
        "Resolved postal code {} to {} grid ({}, {})",
        code,
        cell.office,
        cell.grid_x,
        cell.grid_y
    );

    Ok(location_record(city, Some(code), place, cell))
}

fn location_record(
    city: &str,
    postal_code: Option<&str>,
    place: ResolvedPlace,
    cell: GridCell,
) -> LocationConfig {
    LocationConfig {
        city: Some(city.to_string()),
        state: Some(place.state),
        postal_code: postal_code.map(str::to_string),
        county: Some(place.county),
        latitude: Some(place.latitude),
        longitude: Some(place.longitude),
        office: Some(cell.office),
        // Grid coordinates stay strings: they only ever appear
        // interpolated into forecast URLs.
        grid_x: Some(cell.grid_x.to_string()),
        grid_y: Some(cell.grid_y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_record_is_complete() {
        let place = ResolvedPlace {
            latitude: 28.5421,
            longitude: -81.3790,
            county: "Orange".to_string(),
            state: "FL".to_string(),
        };
        let cell = GridCell {
            office: "MLB".to_string(),
            grid_x: 72,
            grid_y: 52,
        };

        let record = location_record("Orlando", None, place, cell);
        assert!(record.is_valid());
        assert_eq!(record.city.as_deref(), Some("Orlando"));
        assert_eq!(record.state.as_deref(), Some("FL"));
        assert_eq!(record.county.as_deref(), Some("Orange"));
        assert_eq!(record.grid_x.as_deref(), Some("72"));
        assert_eq!(record.grid_y.as_deref(), Some("52"));
        assert!(record.postal_code.is_none());
    }

    #[test]
    fn test_postal_variant_keeps_the_code() {
        let place = ResolvedPlace {
            latitude: 28.5421,
            longitude: -81.3790,
            county: "Orange".to_string(),
            state: "FL".to_string(),
        };
        let cell = GridCell {
            office: "MLB".to_string(),
            grid_x: 72,
            grid_y: 52,
        };

        let record = location_record("Orlando", Some("32801"), place, cell);
        assert_eq!(record.postal_code.as_deref(), Some("32801"));
        assert!(record.is_valid());
    }
}
