use thiserror::Error;

/// Everything that can go wrong between reading favorites and writing a report
///
/// Classification itself never fails - these all come from construction,
/// config or I/O.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Record is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export failed: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
