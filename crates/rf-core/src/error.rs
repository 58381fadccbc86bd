//! Error types for the wheel engine

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum RfError {
    #[error("Wheel has no partitions")]
    EmptyWheel,

    #[error("Invalid rotation: {0}")]
    InvalidRotation(f64),

    #[error("Wheel needs at least {min} partitions (has {count})")]
    BelowMinimum { min: usize, count: usize },

    #[error("Unknown partition: {0}")]
    UnknownPartition(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Name must not be blank")]
    InvalidName,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Audio error: {0}")]
    Audio(String),
}

impl From<serde_json::Error> for RfError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias
pub type RfResult<T> = Result<T, RfError>;
