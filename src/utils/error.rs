use std::fmt;
use thiserror::Error;

/// 外部服務失敗的原因分類，協助操作人員判斷問題來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Unauthorized,
    Malformed,
    RateLimited,
    Unavailable,
    Unreachable,
    UnexpectedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::NotFound => "not found",
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::Malformed => "malformed request",
            FailureKind::RateLimited => "rate limited",
            FailureKind::Unavailable => "service unavailable",
            FailureKind::Unreachable => "unreachable",
            FailureKind::UnexpectedResponse => "unexpected response",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Record service error ({kind}): {message}")]
    RecordServiceError { kind: FailureKind, message: String },

    #[error("Calendar service error ({kind}): {message}")]
    CalendarServiceError { kind: FailureKind, message: String },

    #[error("Notification error ({kind}): {message}")]
    NotificationError { kind: FailureKind, message: String },

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Price table error: {0}")]
    PriceTableError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    ExternalService,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BookingError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        BookingError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BookingError::ValidationError { .. } => ErrorCategory::Input,
            BookingError::ConfigError { .. }
            | BookingError::MissingConfigError { .. }
            | BookingError::InvalidConfigValueError { .. }
            | BookingError::PriceTableError(_) => ErrorCategory::Configuration,
            BookingError::RecordServiceError { .. }
            | BookingError::CalendarServiceError { .. }
            | BookingError::NotificationError { .. }
            | BookingError::HttpClientError(_) => ErrorCategory::ExternalService,
            BookingError::IoError(_) | BookingError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 通知失敗只會記錄，不影響結果
            BookingError::NotificationError { .. } => ErrorSeverity::Low,
            BookingError::ValidationError { .. } | BookingError::CalendarServiceError { .. } => {
                ErrorSeverity::Medium
            }
            BookingError::RecordServiceError { kind, .. } => match kind {
                FailureKind::RateLimited | FailureKind::Unavailable | FailureKind::Unreachable => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::High,
            },
            BookingError::HttpClientError(_) => ErrorSeverity::High,
            BookingError::ConfigError { .. }
            | BookingError::MissingConfigError { .. }
            | BookingError::InvalidConfigValueError { .. }
            | BookingError::PriceTableError(_)
            | BookingError::IoError(_)
            | BookingError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// 操作人員可採取的下一步
    pub fn recovery_suggestion(&self) -> String {
        match self {
            BookingError::ValidationError { field, .. } => {
                format!("Check the '{}' field and submit again", field)
            }
            BookingError::ConfigError { .. } => {
                "Review the configuration file and environment variables".to_string()
            }
            BookingError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or its environment variable", field)
            }
            BookingError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            BookingError::RecordServiceError { kind, .. }
            | BookingError::CalendarServiceError { kind, .. }
            | BookingError::NotificationError { kind, .. } => match kind {
                FailureKind::NotFound => {
                    "Verify the database/calendar id and that the integration has access to it"
                        .to_string()
                }
                FailureKind::Unauthorized => "Refresh or replace the API credentials".to_string(),
                FailureKind::Malformed => {
                    "Check the property names and value formats sent to the service".to_string()
                }
                FailureKind::RateLimited => "Wait a moment before submitting again".to_string(),
                FailureKind::Unavailable | FailureKind::Unreachable => {
                    "Check network connectivity and the service status page".to_string()
                }
                FailureKind::UnexpectedResponse => {
                    "Inspect the service response in the logs".to_string()
                }
            },
            BookingError::HttpClientError(_) => {
                "Check TLS and network settings of the host".to_string()
            }
            BookingError::PriceTableError(_) => {
                "Fix the price table CSV (columns: panes,inside_outside,outside_only)".to_string()
            }
            BookingError::IoError(_) => "Check file paths and permissions".to_string(),
            BookingError::SerializationError(_) => "Check the JSON input".to_string(),
        }
    }

    /// 給提交者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            BookingError::ValidationError { field, message } => {
                format!("Invalid {}: {}", field, message)
            }
            BookingError::RecordServiceError { kind, .. } => {
                format!("Could not save the job ({})", kind)
            }
            BookingError::CalendarServiceError { kind, .. } => {
                format!("Could not create the calendar event ({})", kind)
            }
            BookingError::NotificationError { kind, .. } => {
                format!("Could not send the notification email ({})", kind)
            }
            BookingError::ConfigError { .. }
            | BookingError::MissingConfigError { .. }
            | BookingError::InvalidConfigValueError { .. }
            | BookingError::PriceTableError(_) => {
                format!("Service is misconfigured: {}", self)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_is_part_of_the_message() {
        let err = BookingError::RecordServiceError {
            kind: FailureKind::Unauthorized,
            message: "API token is invalid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Record service error (unauthorized): API token is invalid"
        );
        assert_eq!(err.category(), ErrorCategory::ExternalService);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_configuration_errors_are_critical() {
        let err = BookingError::MissingConfigError {
            field: "record_service.token".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("record_service.token"));
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = BookingError::validation("phone", "not a North-American phone number");
        assert_eq!(
            err.user_friendly_message(),
            "Invalid phone: not a North-American phone number"
        );
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}
