//! NWS weather data for Gridcast
//!
//! Resolves free-text locations to National Weather Service grid cells and
//! keeps a forecast snapshot fresh via a background polling loop.

pub mod client;
pub mod diff;
pub mod error;
pub mod geocode;
pub mod grid;
pub mod icons;
pub mod refresh;
pub mod resolve;
pub mod states;
pub mod types;

pub use client::{ForecastClient, RetryPolicy};
pub use diff::has_material_change;
pub use error::{FetchError, LocationError};
pub use geocode::GeoResolver;
pub use grid::GridResolver;
pub use refresh::{RefreshConfig, RefreshHandle, RefreshScheduler};
pub use resolve::{resolve_city_state, resolve_postal_code};
pub use types::{filter_alerts, AlertsPayload, ForecastPayload, ForecastSnapshot};
