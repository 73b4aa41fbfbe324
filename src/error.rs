use thiserror::Error;

/// Main error type for oiebench
#[derive(Error, Debug)]
pub enum BenchError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed extraction files
    #[error("Parse error: {0}")]
    Parse(String),

    /// The gold set contributed no extractions, so recall is undefined
    #[error("Empty gold set: no gold extractions to compare against")]
    EmptyGold,
}

/// Convenient Result type using BenchError
pub type Result<T> = std::result::Result<T, BenchError>;
