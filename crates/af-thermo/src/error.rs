//! Thermochemical data errors.

use thiserror::Error;

/// Result type for thermochemical data operations.
pub type ThermoResult<T> = Result<T, ThermoError>;

/// Errors raised while loading or querying thermochemical data.
#[derive(Error, Debug)]
pub enum ThermoError {
    /// A value array disagrees with the temperature grid on length.
    #[error("Shape mismatch in {what}: expected {expected} samples, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Temperature grid is not strictly increasing (or has fewer than 2 samples).
    #[error("Invalid temperature grid: {what}")]
    BadGrid { what: &'static str },

    /// A value that must be finite is not.
    #[error("Non-finite value in {what}")]
    NonFinite { what: &'static str },

    /// Species id not present in the registry.
    #[error("Unknown species: {id}")]
    UnknownSpecies { id: String },

    /// A catalog compound has no rows in the data file.
    #[error("No data rows for compound {id}")]
    MissingData { id: &'static str },

    /// A cell failed to parse as the expected value.
    #[error("Cannot parse {what} value {value:?}")]
    Parse { what: &'static str, value: String },

    /// Malformed data file or unreadable path.
    #[error("Data file error: {0}")]
    Csv(#[from] csv::Error),
}
