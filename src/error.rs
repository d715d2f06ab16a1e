use std::time::Duration;
use thiserror::Error;

/// Errors raised while refreshing the configuration document
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The page could not be reached
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// An expected element did not become visible within the bound
    #[error("Element '{locator}' was not ready after {timeout:?}")]
    ReadinessTimeout { locator: String, timeout: Duration },

    /// Page text did not match the documented pattern
    #[error("Unexpected page format: expected {expected}, got '{text}'")]
    UnexpectedPageFormat { expected: &'static str, text: String },

    /// A required path is absent from the loaded document
    #[error("Config field missing: {0}")]
    ConfigFieldMissing(String),

    /// The path resolves to a mapping, sequence or block scalar
    #[error("Config field '{0}' is not an editable scalar")]
    ConfigFieldNotScalar(String),

    /// The path resolves to a value of the wrong type
    #[error("Config field '{path}' is not a valid {expected}")]
    ConfigFieldType { path: String, expected: &'static str },

    /// A collection does not have the shape its entries are read as
    #[error("Config section '{path}' is invalid: {reason}")]
    ConfigSection { path: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    /// An edit produced a document that no longer parses or reads back differently
    #[error("Failed to update config field '{path}': {reason}")]
    ConfigWrite { path: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Click, fill, check or text read failed on a located element
    #[error("Action '{action}' failed on '{locator}': {reason}")]
    ActionFailed {
        action: &'static str,
        locator: String,
        reason: String,
    },

    #[error("Locator '{0}' cannot be expressed as a single query")]
    UnsupportedLocator(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RefreshError {
    /// Short, stable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            RefreshError::NavigationFailed(_) => "NavigationFailure",
            RefreshError::ReadinessTimeout { .. } => "ReadinessTimeout",
            RefreshError::UnexpectedPageFormat { .. } => "UnexpectedPageFormat",
            RefreshError::ConfigFieldMissing(_) => "ConfigFieldMissing",
            RefreshError::ConfigFieldNotScalar(_) => "ConfigFieldNotScalar",
            RefreshError::ConfigFieldType { .. } => "ConfigFieldType",
            RefreshError::ConfigSection { .. } => "ConfigSection",
            RefreshError::ConfigParse(_) => "ConfigParse",
            RefreshError::ConfigWrite { .. } => "ConfigWrite",
            RefreshError::ElementNotFound(_) => "ElementNotFound",
            RefreshError::ActionFailed { .. } => "ActionFailed",
            RefreshError::UnsupportedLocator(_) => "UnsupportedLocator",
            RefreshError::LaunchFailed(_) => "LaunchFailed",
            RefreshError::ConnectionFailed(_) => "ConnectionFailed",
            RefreshError::TabOperationFailed(_) => "TabOperationFailed",
            RefreshError::Io(_) => "Io",
        }
    }
}

pub type Result<T> = std::result::Result<T, RefreshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_taxonomy() {
        assert_eq!(RefreshError::NavigationFailed("x".into()).kind(), "NavigationFailure");
        assert_eq!(
            RefreshError::ReadinessTimeout { locator: "cell".into(), timeout: Duration::from_secs(3) }.kind(),
            "ReadinessTimeout"
        );
        assert_eq!(RefreshError::ConfigFieldMissing("countries".into()).kind(), "ConfigFieldMissing");
    }

    #[test]
    fn test_section_error_keeps_path_and_reason_apart() {
        let err = RefreshError::ConfigSection { path: "careers".into(), reason: "missing field `name`".into() };
        assert_eq!(err.to_string(), "Config section 'careers' is invalid: missing field `name`");
        assert_eq!(err.kind(), "ConfigSection");
    }

    #[test]
    fn test_display_includes_offending_text() {
        let err = RefreshError::UnexpectedPageFormat { expected: "a decimal", text: "n/a".into() };
        assert_eq!(err.to_string(), "Unexpected page format: expected a decimal, got 'n/a'");
    }
}
