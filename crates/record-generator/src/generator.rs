//! Main generator for producing synthetic records.

use crate::alphabet::Alphabet;
use crate::error::GeneratorError;
use crate::generators::{generate_date, generate_decimal, generate_even_int, DateWindow};
use chrono::NaiveDate;
use pipeline_core::Record;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for record generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Alphabet of the first text field
    pub latin: Alphabet,
    /// Alphabet of the second text field
    pub local: Alphabet,
    /// Characters in the first text field
    pub latin_length: usize,
    /// Characters in the second text field
    pub local_length: usize,
    /// Lower bound of the even-integer draw (inclusive)
    pub even_min: i64,
    /// Upper bound of the even-integer draw (see [`generate_even_int`])
    pub even_max: i64,
    /// Lower bound of the decimal (inclusive)
    pub decimal_min: f64,
    /// Upper bound of the decimal (exclusive)
    pub decimal_max: f64,
    /// Last day of the date window
    pub today: NaiveDate,
    /// Length of the date window in years
    pub years_back: u32,
}

impl GeneratorConfig {
    /// Default configuration anchored at `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            latin: Alphabet::latin(),
            local: Alphabet::cyrillic(),
            latin_length: 10,
            local_length: 10,
            even_min: 1,
            even_max: 100_000_000,
            decimal_min: 1.0,
            decimal_max: 20.0,
            today,
            years_back: 5,
        }
    }

    pub fn with_text_lengths(mut self, latin_length: usize, local_length: usize) -> Self {
        self.latin_length = latin_length;
        self.local_length = local_length;
        self
    }

    pub fn with_even_range(mut self, min: i64, max: i64) -> Self {
        self.even_min = min;
        self.even_max = max;
        self
    }

    pub fn with_decimal_range(mut self, min: f64, max: f64) -> Self {
        self.decimal_min = min;
        self.decimal_max = max;
        self
    }

    pub fn with_alphabets(mut self, latin: Alphabet, local: Alphabet) -> Self {
        self.latin = latin;
        self.local = local;
        self
    }

    fn validate(&self) -> Result<DateWindow, GeneratorError> {
        for alphabet in [&self.latin, &self.local] {
            if alphabet.is_empty() {
                return Err(GeneratorError::EmptyAlphabet(alphabet.name().to_string()));
            }
        }

        if self.even_min >= self.even_max {
            return Err(GeneratorError::InvalidIntRange {
                field: "even_value".to_string(),
                min: self.even_min,
                max: self.even_max,
            });
        }

        let (min, max) = (self.decimal_min, self.decimal_max);
        if !(min.is_finite() && max.is_finite() && min >= 0.0 && min < max) {
            return Err(GeneratorError::InvalidFloatRange {
                field: "decimal_value".to_string(),
                min,
                max,
            });
        }

        DateWindow::years_back(self.today, self.years_back)
    }
}

/// Derive the rng for one unit of work (one file) from the base seed.
///
/// This allows any file to be regenerated on its own while keeping the
/// whole set deterministic, regardless of the order files are produced in.
pub fn rng_for_index(seed: u64, index: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(index.wrapping_mul(0x9E3779B97F4A7C15)))
}

/// Record generator driven by a caller-supplied rng.
///
/// The generator itself holds no mutable state, so one instance can be
/// shared across threads with each worker passing its own rng.
#[derive(Debug, Clone)]
pub struct RecordGenerator {
    config: GeneratorConfig,
    window: DateWindow,
}

impl RecordGenerator {
    /// Create a generator, validating the configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        let window = config.validate()?;
        Ok(Self { config, window })
    }

    /// Generate the next record from `rng`.
    pub fn next<R: Rng>(&self, rng: &mut R) -> Record {
        let date = generate_date(rng, &self.window);
        let latin_text = self.config.latin.sample(rng, self.config.latin_length);
        let local_text = self.config.local.sample(rng, self.config.local_length);
        let even_value = generate_even_int(rng, self.config.even_min, self.config.even_max);
        let decimal_value =
            generate_decimal(rng, self.config.decimal_min, self.config.decimal_max);

        Record {
            date,
            latin_text,
            local_text,
            even_value,
            decimal_value,
        }
    }

    /// Lazily generate `count` records from `rng`.
    pub fn records<'a, R: Rng>(&'a self, rng: &'a mut R, count: u64) -> RecordIterator<'a, R> {
        RecordIterator {
            generator: self,
            rng,
            remaining: count,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The inclusive date window records are drawn from.
    pub fn date_window(&self) -> DateWindow {
        self.window
    }
}

/// Iterator that lazily generates records.
pub struct RecordIterator<'a, R: Rng> {
    generator: &'a RecordGenerator,
    rng: &'a mut R,
    remaining: u64,
}

impl<R: Rng> Iterator for RecordIterator<'_, R> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.next(self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for RecordIterator<'_, R> {}
