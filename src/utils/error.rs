use thiserror::Error;

#[derive(Error, Debug)]
pub enum RacecardError {
    #[error("Missing {username_var} or {password_var} in environment variables. Create a .env with both set.")]
    MissingCredentials {
        username_var: String,
        password_var: String,
    },

    #[error("HTTP error: {status}")]
    HttpStatus { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類，決定畫面上的呈現方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Http,
    Network,
    Unexpected,
}

impl RacecardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RacecardError::MissingCredentials { .. }
            | RacecardError::ConfigError { .. }
            | RacecardError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            RacecardError::HttpStatus { .. } => ErrorCategory::Http,
            // reqwest 只會在連線層失敗時回傳錯誤，狀態碼由我們自行檢查
            RacecardError::Network(e) if !e.is_decode() && !e.is_builder() => {
                ErrorCategory::Network
            }
            _ => ErrorCategory::Unexpected,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set the credential variables (or fix the config file) and fetch again"
            }
            ErrorCategory::Http => "Check the response body below; the API rejected the request",
            ErrorCategory::Network => "Check your connection and try fetching again",
            ErrorCategory::Unexpected => "Try again; run with --verbose for details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Http | ErrorCategory::Network => {
                self.to_string()
            }
            ErrorCategory::Unexpected => format!("Unexpected error: {}", self),
        }
    }

    /// 單次模式的結束代碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Http => 3,
            ErrorCategory::Network => 4,
            ErrorCategory::Unexpected => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, RacecardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_is_configuration() {
        let err = RacecardError::MissingCredentials {
            username_var: "RACING_API_USERNAME".to_string(),
            password_var: "RACING_API_PASSWORD".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 2);
        assert!(err.user_friendly_message().contains("RACING_API_USERNAME"));
    }

    #[test]
    fn test_http_status_category() {
        let err = RacecardError::HttpStatus {
            status: 401,
            body: "{}".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Http);
        assert_eq!(err.to_string(), "HTTP error: 401");
    }

    #[test]
    fn test_decode_is_unexpected() {
        let err: RacecardError = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert_eq!(err.category(), ErrorCategory::Unexpected);
        assert!(err.user_friendly_message().starts_with("Unexpected error:"));
    }

    fn open_missing_file() -> Result<std::fs::File> {
        Ok(std::fs::File::open("/nonexistent/racecards/log.txt")?)
    }

    #[test]
    fn test_io_error_converts_and_is_unexpected() {
        let err = open_missing_file().unwrap_err();
        assert!(matches!(err, RacecardError::IoError(_)));
        assert_eq!(err.category(), ErrorCategory::Unexpected);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().starts_with("Unexpected error: IO error:"));
    }
}
