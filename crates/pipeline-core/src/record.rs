//! The synthetic record and its line serialization.

use crate::layout::{DATE_FORMAT, DECIMAL_PLACES, FIELD_SEPARATOR};
use chrono::NaiveDate;
use std::fmt;

/// One synthetic data row.
///
/// `even_value` is always divisible by two and `decimal_value` carries at
/// most [`DECIMAL_PLACES`] fractional digits.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub latin_text: String,
    pub local_text: String,
    pub even_value: i64,
    pub decimal_value: f64,
}

impl Record {
    pub fn new(
        date: NaiveDate,
        latin_text: impl Into<String>,
        local_text: impl Into<String>,
        even_value: i64,
        decimal_value: f64,
    ) -> Self {
        Self {
            date,
            latin_text: latin_text.into(),
            local_text: local_text.into(),
            even_value,
            decimal_value,
        }
    }

    /// Serialize this record as one line, without the trailing newline.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

/// Writes the `||`-joined line form used by every data file.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{date}{sep}{latin}{sep}{local}{sep}{even}{sep}{decimal:.places$}",
            date = self.date.format(DATE_FORMAT),
            latin = self.latin_text,
            local = self.local_text,
            even = self.even_value,
            decimal = self.decimal_value,
            places = DECIMAL_PLACES,
            sep = FIELD_SEPARATOR,
        )
    }
}
