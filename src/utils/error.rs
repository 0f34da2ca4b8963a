use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    StatusError { url: String, status: u16 },

    #[error("Response from {url} exceeds {limit} bytes")]
    ResponseTooLarge { url: String, limit: usize },

    #[error("Upstream {service} reported an error: {message}")]
    UpstreamError { service: String, message: String },

    #[error("Deadline exceeded while fetching {url}")]
    DeadlineExceeded { url: String },

    #[error("Decode error: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl RiskError {
    /// True when the upstream answered 404, which some sources use for "no data here".
    pub fn is_not_found(&self) -> bool {
        matches!(self, RiskError::StatusError { status: 404, .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RiskError::HttpError(_)
            | RiskError::StatusError { .. }
            | RiskError::UpstreamError { .. } => {
                "An upstream data source could not be reached".to_string()
            }
            RiskError::DeadlineExceeded { .. } => {
                "The assessment ran out of time waiting for upstream data".to_string()
            }
            RiskError::ConfigError { .. } | RiskError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            RiskError::ValidationError { message } => format!("Invalid input: {}", message),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_only_matches_404() {
        let missing = RiskError::StatusError {
            url: "http://x/1234.json".to_string(),
            status: 404,
        };
        let broken = RiskError::StatusError {
            url: "http://x/1234.json".to_string(),
            status: 503,
        };

        assert!(missing.is_not_found());
        assert!(!broken.is_not_found());
        assert!(!RiskError::DeadlineExceeded {
            url: "http://x".to_string()
        }
        .is_not_found());
    }

    #[test]
    fn test_validation_message_is_user_facing() {
        let err = RiskError::ValidationError {
            message: "latitude out of range".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Invalid input: latitude out of range"
        );
    }
}
