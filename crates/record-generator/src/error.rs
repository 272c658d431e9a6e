//! Error types for the record generator.

use thiserror::Error;

/// Errors raised while validating generator configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// An alphabet has no characters to sample from.
    #[error("Alphabet '{0}' is empty")]
    EmptyAlphabet(String),

    /// An integer range is empty.
    #[error("Invalid range for {field}: min {min} must be less than max {max}")]
    InvalidIntRange { field: String, min: i64, max: i64 },

    /// A float range is empty, negative, or not finite.
    #[error("Invalid range for {field}: [{min}, {max}) must be finite, non-negative, and non-empty")]
    InvalidFloatRange { field: String, min: f64, max: f64 },

    /// The date window cannot be represented.
    #[error("Date window of {years} years before {today} is out of range")]
    InvalidDateWindow { today: chrono::NaiveDate, years: u32 },
}
