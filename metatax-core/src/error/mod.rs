//! Core error types for metatax

use thiserror::Error;

/// Main error type for metatax operations
#[derive(Error, Debug)]
pub enum MetataxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for metatax operations
pub type MetataxResult<T> = Result<T, MetataxError>;

impl MetataxError {
    /// Parse error pinned to a line of an input file
    pub fn parse_at(path: &std::path::Path, line_no: usize, msg: impl std::fmt::Display) -> Self {
        MetataxError::Parse(format!("{}: line {}: {}", path.display(), line_no, msg))
    }

    /// Process exit code used by the command line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            MetataxError::Configuration(_) => 2,
            MetataxError::Io(_) => 3,
            MetataxError::Parse(_) => 4,
            MetataxError::Database(_) => 5,
            MetataxError::InvalidInput(_) => 6,
            _ => 1,
        }
    }
}

impl From<rusqlite::Error> for MetataxError {
    fn from(err: rusqlite::Error) -> Self {
        MetataxError::Database(err.to_string())
    }
}

impl From<toml::de::Error> for MetataxError {
    fn from(err: toml::de::Error) -> Self {
        MetataxError::Configuration(format!("Failed to parse config: {}", err))
    }
}
