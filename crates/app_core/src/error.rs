//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Client errors (reported with a generic message) =====
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Path escapes served root: {0}")]
    PathEscape(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),

    // ===== Server errors (detail is logged, never returned) =====
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Is this caused by the request rather than the server?
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingParameter(_)
                | AppError::PathEscape(_)
                | AppError::NotFound(_)
                | AppError::UnsupportedType(_)
        )
    }

    /// Get a user-facing message
    ///
    /// Never contains file system paths or OS error text.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::MissingParameter(_) => "Missing filename",
            AppError::PathEscape(_) => "Invalid file path",
            AppError::NotFound(_) => "File not found",
            AppError::UnsupportedType(_) => "Only supported media files can be favorited",
            AppError::Unexpected(_) | AppError::Config(_) => "Internal server error",
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::NotFound(p) => AppError::NotFound(p),
            app_fs::FsError::PathEscape(p) => AppError::PathEscape(p),
            app_fs::FsError::UnsupportedType(p) => AppError::UnsupportedType(p),
            app_fs::FsError::InvalidRoot(p) => AppError::Config(format!("Invalid root: {}", p)),
            app_fs::FsError::Io(e) => AppError::Unexpected(e.to_string()),
        }
    }
}
