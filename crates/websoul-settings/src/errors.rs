//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Why settings could not be loaded.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Settings file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid JSON.
    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        /// Settings file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The merged settings do not fit the settings types.
    #[error("settings do not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    /// A value is well-typed but unusable.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted camelCase key, e.g. `smtp.inquiryTo`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_file() {
        let source = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err = SettingsError::Parse {
            path: PathBuf::from("/etc/websoul.json"),
            source,
        };
        assert!(err.to_string().starts_with("/etc/websoul.json is not valid JSON"));
    }

    #[test]
    fn invalid_names_the_field() {
        let err = SettingsError::invalid("relay.maxBodyBytes", "must be non-zero");
        assert_eq!(err.to_string(), "invalid relay.maxBodyBytes: must be non-zero");
    }

    #[test]
    fn read_error_keeps_source() {
        use std::error::Error as _;
        let err = SettingsError::Read {
            path: PathBuf::from("websoul.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }
}
