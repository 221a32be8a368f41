use thiserror::Error;

/// Run-level failures. Row-level failures never surface here; they become
/// [`crate::domain::model::Sentinel`] values in the result table.
#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input file '{path}' contains no data rows")]
    EmptyInput { path: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Output,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl FinderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FinderError::ConfigValidationError { .. }
            | FinderError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            FinderError::CsvError(_)
            | FinderError::SpreadsheetError(_)
            | FinderError::EmptyInput { .. } => ErrorCategory::Input,
            FinderError::HttpError(_) => ErrorCategory::Network,
            FinderError::ZipError(_) | FinderError::IoError(_) => ErrorCategory::Output,
            FinderError::SerializationError(_) | FinderError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FinderError::EmptyInput { .. } => {
                "Add at least one row with a ticker in the first column"
            }
            FinderError::CsvError(_) => {
                "Check that the input is a valid CSV/TSV file and that --header matches its layout"
            }
            FinderError::SpreadsheetError(_) => {
                "Check that the workbook opens in a spreadsheet program and its first sheet holds the tickers"
            }
            FinderError::HttpError(_) => "Check network connectivity and the --base-url value",
            FinderError::IoError(_) => "Check that the input exists and the output path is writable",
            FinderError::ZipError(_) => "Check free disk space or disable --zip",
            FinderError::ConfigValidationError { .. }
            | FinderError::InvalidConfigValueError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            FinderError::SerializationError(_) | FinderError::ProcessingError { .. } => {
                "Re-run with --verbose for more detail"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FinderError::EmptyInput { path } => {
                format!("The file '{}' has no rows to process", path)
            }
            FinderError::CsvError(e) => format!("The input file could not be read as a table: {}", e),
            FinderError::SpreadsheetError(e) => {
                format!("The input workbook could not be read: {}", e)
            }
            FinderError::IoError(e) => format!("A file could not be read or written: {}", e),
            other => format!("An error occurred during processing: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = FinderError::InvalidConfigValueError {
            field: "input".to_string(),
            value: "report.pdf".to_string(),
            reason: "Unsupported file extension".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_empty_input_message_names_the_file() {
        let err = FinderError::EmptyInput {
            path: "tickers.csv".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err.user_friendly_message().contains("tickers.csv"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = FinderError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().exit_code(), 3);
    }
}
