//! Line parser for `||`-delimited records.
//!
//! The parser never recovers on its own: any malformed line yields a
//! [`ParseError`] and the caller decides whether to skip or abort.

use crate::error::{ParseError, RecordField};
use crate::layout::{DATE_FORMAT, FIELD_SEPARATOR};
use crate::record::Record;
use chrono::NaiveDate;

const FIELD_COUNT: usize = RecordField::ALL.len();

/// Parse one data line (without its line terminator) into a [`Record`].
pub fn parse_line(line: &str) -> Result<Record, ParseError> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() != FIELD_COUNT {
        return Err(ParseError::FieldCountMismatch {
            expected: FIELD_COUNT,
            found: parts.len(),
        });
    }

    let date = NaiveDate::parse_from_str(parts[0], DATE_FORMAT)
        .map_err(|e| conversion_error(RecordField::Date, parts[0], e))?;

    let even_value = parts[3]
        .parse::<i64>()
        .map_err(|e| conversion_error(RecordField::EvenValue, parts[3], e))?;

    let decimal_value = parts[4]
        .parse::<f64>()
        .map_err(|e| conversion_error(RecordField::DecimalValue, parts[4], e))?;
    if !decimal_value.is_finite() {
        return Err(conversion_error(
            RecordField::DecimalValue,
            parts[4],
            "value is not a finite number",
        ));
    }

    Ok(Record {
        date,
        latin_text: parts[1].to_string(),
        local_text: parts[2].to_string(),
        even_value,
        decimal_value,
    })
}

fn conversion_error(field: RecordField, value: &str, err: impl ToString) -> ParseError {
    ParseError::TypeConversion {
        field,
        value: value.to_string(),
        message: err.to_string(),
    }
}
