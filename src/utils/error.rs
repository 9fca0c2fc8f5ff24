use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Endpoint returned HTTP {status}: {body}")]
    EndpointStatus { status: u16, body: String },

    #[error("Response body is not valid JSON: {message}")]
    InvalidResponse { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Endpoint,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::ApiError(_) => ErrorCategory::Network,
            TrackerError::EndpointStatus { .. } => ErrorCategory::Endpoint,
            TrackerError::InvalidResponse { .. }
            | TrackerError::CsvError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::ValidationError { .. } => ErrorCategory::Data,
            TrackerError::ConfigValidationError { .. }
            | TrackerError::InvalidConfigValueError { .. }
            | TrackerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            TrackerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路與 5xx 錯誤通常可以重試
            TrackerError::ApiError(_) => ErrorSeverity::Medium,
            TrackerError::EndpointStatus { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            TrackerError::EndpointStatus { .. } => ErrorSeverity::High,
            TrackerError::InvalidResponse { .. }
            | TrackerError::CsvError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::ValidationError { .. } => ErrorSeverity::High,
            TrackerError::ConfigValidationError { .. }
            | TrackerError::InvalidConfigValueError { .. }
            | TrackerError::MissingConfigError { .. } => ErrorSeverity::High,
            TrackerError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 根據錯誤嚴重程度決定退出碼，失敗時永不為 0
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// Whether re-submitting the same range could succeed.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackerError::ApiError(e) if e.is_timeout() => {
                "The server did not answer in time".to_string()
            }
            TrackerError::ApiError(e) if e.is_connect() => {
                "Could not connect to the server".to_string()
            }
            TrackerError::ApiError(_) => "The request to the server failed".to_string(),
            TrackerError::EndpointStatus { status, .. } => {
                format!("The server rejected the request (HTTP {})", status)
            }
            TrackerError::InvalidResponse { .. } => {
                "The server answered with something that is not JSON".to_string()
            }
            TrackerError::ConfigValidationError { field, .. }
            | TrackerError::InvalidConfigValueError { field, .. }
            | TrackerError::MissingConfigError { field } => {
                format!("Configuration problem with '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the server is running and reachable, then submit again".to_string()
            }
            ErrorCategory::Endpoint => match self {
                TrackerError::EndpointStatus { status: 404, .. } => {
                    "Check the --endpoint path".to_string()
                }
                TrackerError::EndpointStatus { status, .. } if *status >= 500 => {
                    "The server failed; try again later".to_string()
                }
                _ => "Check the submitted date range".to_string(),
            },
            ErrorCategory::Data => {
                "Check that the endpoint returns the expected JSON document".to_string()
            }
            ErrorCategory::Configuration => {
                "Fix the command-line flags or the TOML config file".to_string()
            }
            ErrorCategory::System => "Check file permissions and paths".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_status_severity_depends_on_status() {
        let server_error = TrackerError::EndpointStatus {
            status: 503,
            body: String::new(),
        };
        let client_error = TrackerError::EndpointStatus {
            status: 422,
            body: String::new(),
        };

        assert_eq!(server_error.severity(), ErrorSeverity::Medium);
        assert!(server_error.is_retryable());
        assert_eq!(client_error.severity(), ErrorSeverity::High);
        assert!(!client_error.is_retryable());
    }

    #[test]
    fn test_config_errors_are_categorized() {
        let err = TrackerError::MissingConfigError {
            field: "server.base_url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().contains("server.base_url"));
    }

    #[test]
    fn test_failures_never_exit_zero() {
        let errors = vec![
            TrackerError::EndpointStatus {
                status: 503,
                body: String::new(),
            },
            TrackerError::EndpointStatus {
                status: 400,
                body: String::new(),
            },
            TrackerError::InvalidResponse {
                message: "eof".to_string(),
            },
            TrackerError::MissingConfigError {
                field: "base_url".to_string(),
            },
            TrackerError::IoError(std::io::Error::other("disk")),
        ];

        let codes: Vec<i32> = errors.iter().map(TrackerError::exit_code).collect();

        assert_eq!(codes, vec![2, 1, 1, 1, 3]);
    }

    #[test]
    fn test_not_found_suggests_endpoint_fix() {
        let err = TrackerError::EndpointStatus {
            status: 404,
            body: "not found".to_string(),
        };
        assert!(err.recovery_suggestion().contains("--endpoint"));
    }
}
