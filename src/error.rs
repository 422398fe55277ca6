use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Nothing to merge: {0}")]
    EmptyMerge(String),

    #[error("Archive error: {0}")]
    Zip(String),

    #[error("Lock held: {0}")]
    Lock(String),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Errors that only disqualify the current symbol, never the whole run
    pub fn is_symbol_scoped(&self) -> bool {
        matches!(
            self,
            AppError::Schema(_) | AppError::EmptyMerge(_) | AppError::Lock(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Io(format!("CSV error: {}", err))
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Zip(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Alias for convenience
pub type Error = AppError;
