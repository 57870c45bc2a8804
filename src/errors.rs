use thiserror::Error;

use crate::api::ApiError;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Input rejected before anything is sent to the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Folder name is required")]
    Empty,

    #[error("Folder name can not contain '/'")]
    ContainsSlash,

    #[error("Folder name can not consist of spaces only")]
    Whitespace,
}
