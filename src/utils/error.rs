use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to load asset '{asset}': {message}")]
    AssetError { asset: String, message: String },

    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("Unknown user: {user_id}")]
    UnknownUser { user_id: String },

    #[error("No book title contains '{query}'")]
    NotFound { query: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RecError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RecError::IoError(_) | RecError::ZipError(_) => ErrorCategory::Io,
            RecError::CsvError(_) | RecError::SerializationError(_) | RecError::AssetError { .. } => {
                ErrorCategory::Data
            }
            RecError::ConfigError { .. }
            | RecError::ConfigValidationError { .. }
            | RecError::InvalidConfigValueError { .. }
            | RecError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RecError::InvalidQuery { .. } | RecError::UnknownUser { .. } | RecError::NotFound { .. } => {
                ErrorCategory::Query
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 查無書名不是錯誤，只是空結果
            RecError::NotFound { .. } => ErrorSeverity::Low,
            RecError::InvalidQuery { .. } | RecError::UnknownUser { .. } => ErrorSeverity::Medium,
            RecError::ConfigError { .. }
            | RecError::ConfigValidationError { .. }
            | RecError::InvalidConfigValueError { .. }
            | RecError::MissingConfigError { .. }
            | RecError::CsvError(_)
            | RecError::SerializationError(_)
            | RecError::AssetError { .. } => ErrorSeverity::High,
            RecError::IoError(_) | RecError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RecError::NotFound { .. } => "Try a shorter or differently spelled part of the title".to_string(),
            RecError::UnknownUser { .. } => "Run `bookrec users` to list known user ids".to_string(),
            RecError::InvalidQuery { .. } => "Check the query arguments and try again".to_string(),
            RecError::AssetError { asset, .. } => {
                format!("Regenerate or re-export '{}' and check its format", asset)
            }
            RecError::CsvError(_) => "Check that the catalog CSV has the expected header row".to_string(),
            RecError::SerializationError(_) => "Check that the model files are valid JSON".to_string(),
            RecError::IoError(_) | RecError::ZipError(_) => {
                "Check that the assets path exists and is readable".to_string()
            }
            RecError::ConfigError { .. }
            | RecError::ConfigValidationError { .. }
            | RecError::InvalidConfigValueError { .. }
            | RecError::MissingConfigError { .. } => "Fix the configuration file or CLI flags".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RecError::NotFound { .. } => "Book not found".to_string(),
            RecError::UnknownUser { user_id } => format!("User '{}' does not exist in the catalog", user_id),
            RecError::InvalidQuery { reason } => format!("Invalid request: {}", reason),
            RecError::IoError(_) | RecError::ZipError(_) => {
                format!("Could not read recommendation assets ({})", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_low_severity() {
        let err = RecError::NotFound {
            query: "zzz".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Query);
        assert_eq!(err.user_friendly_message(), "Book not found");
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: RecError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.category(), ErrorCategory::Io);
    }
}
