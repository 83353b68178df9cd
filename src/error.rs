//! Error types for Culture Guide
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Culture Guide operations
///
/// Covers configuration loading, local input validation, remote API
/// failures, and the local key/value store that backs user preferences.
#[derive(Error, Debug)]
pub enum GuideError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local validation failure (no request was sent)
    #[error("{0}")]
    Validation(String),

    /// The remote service answered with a non-success status
    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        /// HTTP status code returned by the service
        status: u16,
        /// `detail` field of the error body, when the service sent one
        detail: Option<String>,
    },

    /// The request never produced a usable response (connect, timeout, decode)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local preference storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Culture Guide operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = GuideError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_validation_error_display_is_bare_message() {
        let error = GuideError::Validation("위치를 입력해 주세요".to_string());
        assert_eq!(error.to_string(), "위치를 입력해 주세요");
    }

    #[test]
    fn test_api_error_display() {
        let error = GuideError::Api {
            status: 400,
            detail: Some("위치를 찾을 수 없습니다.".to_string()),
        };
        assert!(error.to_string().contains("400"));
        assert!(error.to_string().contains("위치를 찾을 수 없습니다."));
    }

    #[test]
    fn test_api_error_display_without_detail() {
        let error = GuideError::Api {
            status: 500,
            detail: None,
        };
        assert_eq!(error.to_string(), "API error (500): no detail");
    }

    #[test]
    fn test_transport_error_display() {
        let error = GuideError::Transport("timed out".to_string());
        assert_eq!(error.to_string(), "Transport error: timed out");
    }

    #[test]
    fn test_storage_error_display() {
        let error = GuideError::Storage("read-only filesystem".to_string());
        assert_eq!(error.to_string(), "Storage error: read-only filesystem");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: GuideError = io_error.into();
        assert!(matches!(error, GuideError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: GuideError = json_error.into();
        assert!(matches!(error, GuideError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: GuideError = yaml_error.into();
        assert!(matches!(error, GuideError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GuideError>();
    }
}
