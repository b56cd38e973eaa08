//! State-name reference table.
//!
//! NWS alert queries and the geocoding cross-check both need to move
//! between full state names and the 2-letter postal abbreviations, so the
//! table covers the 50 states, DC, and the territories NWS forecasts for.

use crate::error::LocationError;

/// (full name, postal abbreviation)
const STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
    ("District of Columbia", "DC"),
    ("Puerto Rico", "PR"),
    ("U.S. Virgin Islands", "VI"),
    ("Guam", "GU"),
    ("American Samoa", "AS"),
    ("Northern Mariana Islands", "MP"),
];

/// Normalize a state given either as a full name or a 2-letter code,
/// case-insensitively, to the canonical uppercase abbreviation.
pub fn normalize_state(input: &str) -> Result<&'static str, LocationError> {
    let trimmed = input.trim();

    if trimmed.len() == 2 {
        let upper = trimmed.to_ascii_uppercase();
        if let Some((_, abbr)) = STATES.iter().find(|(_, abbr)| *abbr == upper) {
            return Ok(abbr);
        }
    }

    STATES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(_, abbr)| *abbr)
        .ok_or_else(|| LocationError::UnknownState(input.to_string()))
}

/// Full name for a canonical abbreviation, for the geocoding cross-check.
pub fn full_name(abbr: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(_, a)| *a == abbr)
        .map(|(name, _)| *name)
}
