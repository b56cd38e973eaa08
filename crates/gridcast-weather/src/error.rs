//! Weather-domain error types.

use thiserror::Error;

/// Errors from interactive location resolution (geocoding + grid lookup).
///
/// These surface once to the caller and are never retried - resolution is a
/// user-initiated action, and the user is the retry loop.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("unknown state: {0:?}")]
    UnknownState(String),

    #[error("{city:?} does not appear to be in {state}")]
    CityStateMismatch { city: String, state: String },

    #[error("geocoding returned no results for {0:?}")]
    NoResults(String),

    #[error("response is missing {0}")]
    MissingField(&'static str),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl LocationError {
    /// True for errors caused by the user's input rather than the upstream
    /// service; these should send the user back to the location form.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            LocationError::UnknownState(_) | LocationError::CityStateMismatch { .. }
        )
    }

    /// Message shown in the error popup, keeping the underlying cause.
    pub fn user_message(&self) -> String {
        format!("Error updating location: {}", self)
    }
}

/// Errors from background forecast fetches.
///
/// Transient transport and payload-shape failures never appear here - the
/// client retries them internally. What remains is the retry loop being cut
/// short (cancellation or an attempt ceiling) and client construction.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch cancelled")]
    Cancelled,

    #[error("gave up after {0} attempts")]
    AttemptsExhausted(u32),

    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        assert!(LocationError::UnknownState("narnia".into()).is_invalid_input());
        assert!(LocationError::CityStateMismatch {
            city: "Orlando".into(),
            state: "WA".into(),
        }
        .is_invalid_input());
        assert!(!LocationError::NoResults("x".into()).is_invalid_input());
        assert!(!LocationError::MissingField("display_name").is_invalid_input());
    }

    #[test]
    fn test_user_message_includes_cause() {
        let err = LocationError::UnknownState("narnia".into());
        let msg = err.user_message();
        assert!(msg.starts_with("Error updating location:"));
        assert!(msg.contains("narnia"));
    }
}
