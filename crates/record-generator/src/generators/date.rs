//! Date generators.

use crate::error::GeneratorError;
use chrono::{Days, Months, NaiveDate};
use rand::Rng;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The window `[today - years, today]`.
    ///
    /// A leap day start clamps to the end of February.
    pub fn years_back(today: NaiveDate, years: u32) -> Result<Self, GeneratorError> {
        let start = years
            .checked_mul(12)
            .and_then(|months| today.checked_sub_months(Months::new(months)))
            .ok_or(GeneratorError::InvalidDateWindow { today, years })?;
        Ok(Self { start, end: today })
    }

    /// Number of days in the window, including both ends.
    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days().max(0) as u64 + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Generate a uniformly distributed day within the window.
pub fn generate_date<R: Rng>(rng: &mut R, window: &DateWindow) -> NaiveDate {
    let span = window.len_days() - 1;
    let offset = rng.gen_range(0..=span);
    window
        .start
        .checked_add_days(Days::new(offset))
        .unwrap_or(window.end)
}
