//! Error types for configuration persistence.

use thiserror::Error;

/// Errors raised while loading or saving the persisted config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to locate a config directory")]
    NoConfigDir,

    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file: {0}")]
    Write(#[source] std::io::Error),
}

impl ConfigError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NoConfigDir => "No config directory available on this system.",
            ConfigError::Read(_) => "Unable to read saved settings.",
            ConfigError::Parse(_) => "Saved settings are malformed. Reset your location.",
            ConfigError::Serialize(_) | ConfigError::Write(_) => {
                "Unable to save settings. Please try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        assert!(!ConfigError::NoConfigDir.user_message().is_empty());
        let err = ConfigError::Read(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!err.user_message().is_empty());
    }

    #[test]
    fn test_display_includes_source_text() {
        let err = ConfigError::Read(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().contains("gone"));
    }
}
