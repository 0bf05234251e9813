use thiserror::Error;

/// Failures surfaced by the automation layer.
///
/// Tool handlers never let these escape as protocol errors; the server turns
/// each one into an `{"error": ...}` reply.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid region: width={width}, height={height}")]
    InvalidRegion { width: i64, height: i64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "Appium driver not initialized. Call create_android_driver, create_ios_driver, or create_mac_driver first."
    )]
    NoSession,

    #[error("{0}")]
    Driver(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AutomationError {
    /// Stable name of the error class, reported next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ElementNotFound(_) => "ElementNotFound",
            Self::Timeout(_) => "Timeout",
            Self::InvalidRegion { .. } => "InvalidRegion",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::NoSession => "NoSession",
            Self::Driver(_) | Self::Http(_) | Self::Json(_) | Self::Io(_) => "DriverError",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, AutomationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_report_as_driver_errors() {
        let err: AutomationError =
            serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind(), "DriverError");
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_no_session_message_names_create_tools() {
        let msg = AutomationError::NoSession.to_string();
        assert!(msg.contains("create_android_driver"));
        assert!(msg.contains("create_mac_driver"));
    }

    #[test]
    fn test_invalid_region_message() {
        let err = AutomationError::InvalidRegion {
            width: 0,
            height: 120,
        };
        assert_eq!(err.kind(), "InvalidRegion");
        assert_eq!(err.to_string(), "Invalid region: width=0, height=120");
    }
}
