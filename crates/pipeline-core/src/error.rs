//! Error types for line parsing.

use std::fmt;
use thiserror::Error;

/// The five fields of a [`crate::Record`], in line order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Date,
    LatinText,
    LocalText,
    EvenValue,
    DecimalValue,
}

impl RecordField {
    /// Fields in the order they appear on a line.
    pub const ALL: [RecordField; 5] = [
        RecordField::Date,
        RecordField::LatinText,
        RecordField::LocalText,
        RecordField::EvenValue,
        RecordField::DecimalValue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RecordField::Date => "date",
            RecordField::LatinText => "latin_text",
            RecordField::LocalText => "local_text",
            RecordField::EvenValue => "even_value",
            RecordField::DecimalValue => "decimal_value",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur while parsing a data line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The line did not split into the expected number of fields.
    #[error("expected {expected} fields separated by '||', found {found}")]
    FieldCountMismatch { expected: usize, found: usize },

    /// A field could not be converted to its typed form.
    #[error("invalid {field} value '{value}': {message}")]
    TypeConversion {
        field: RecordField,
        value: String,
        message: String,
    },
}

impl ParseError {
    /// The field that failed conversion, if any.
    pub fn field(&self) -> Option<RecordField> {
        match self {
            ParseError::FieldCountMismatch { .. } => None,
            ParseError::TypeConversion { field, .. } => Some(*field),
        }
    }
}
