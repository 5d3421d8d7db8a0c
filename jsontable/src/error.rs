use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonTableError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Table {table} already exists.")]
    AlreadyExists { table: String },

    #[error("Table {table} does not exist.")]
    NotFound { table: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JsonTableError>;
