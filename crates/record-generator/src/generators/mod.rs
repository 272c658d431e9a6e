//! Individual field generators.
//!
//! Each function draws exactly the random values it needs from the caller's
//! rng, so the call order inside [`crate::RecordGenerator::next`] fixes the
//! output for a given seed.

pub mod date;
pub mod numeric;

pub use date::{generate_date, DateWindow};
pub use numeric::{generate_decimal, generate_even_int};
