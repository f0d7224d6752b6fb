use std::path::PathBuf;
use thiserror::Error;

/// Error type for invalid configuration and persistence failures.
///
/// Numerical degeneracy (NaN or infinite values produced while integrating)
/// is not represented here: it propagates through the series.
#[derive(Error, Debug)]
pub enum TwoBoxError {
    #[error("{0}")]
    Error(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Unknown CO2 scenario '{0}'. Expected one of: none, linear, exp")]
    UnknownScenario(String),
    #[error("Series length mismatch for '{name}': expected {expected}, got {actual}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read table '{path}': {source}", path = path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "Invalid value '{value}' in '{path}' at row {row}, column {column}",
        path = path.display()
    )]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: usize,
        value: String,
    },
}

/// Convenience type for `Result<T, TwoBoxError>`.
pub type TwoBoxResult<T> = Result<T, TwoBoxError>;
