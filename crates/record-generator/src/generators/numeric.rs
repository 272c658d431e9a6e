//! Numeric value generators.

use rand::Rng;

/// `10^DECIMAL_PLACES`.
const DECIMAL_SCALE: f64 = 100_000_000.0;

/// Generate a random even integer from a draw in `[min, max)`.
///
/// Odd draws are bumped up by one, so a draw of `max - 1` (when odd) yields
/// `max` itself. The upper bound is therefore inclusive for even `max`.
pub fn generate_even_int<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    let number = rng.gen_range(min..max);
    if number % 2 == 0 {
        number
    } else {
        number + 1
    }
}

/// Generate a random decimal in `[min, max)` with 8 fractional digits.
///
/// The raw draw is truncated toward `min` so the result never reaches `max`.
pub fn generate_decimal<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    let raw = rng.gen::<f64>() * (max - min) + min;
    let truncated = (raw * DECIMAL_SCALE).floor() / DECIMAL_SCALE;
    if truncated >= max {
        ((max * DECIMAL_SCALE).ceil() - 1.0) / DECIMAL_SCALE
    } else {
        truncated.max(min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_even_int_is_even_and_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let value = generate_even_int(&mut rng, 1, 100_000_000);
            assert_eq!(value % 2, 0);
            assert!((2..=100_000_000).contains(&value));
        }
    }

    #[test]
    fn test_generate_even_int_boundary_reaches_max() {
        // The only possible draw is 3, which is odd and becomes 4 == max.
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(generate_even_int(&mut rng, 3, 4), 4);
    }

    #[test]
    fn test_generate_even_int_negative_range() {
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..200 {
            let value = generate_even_int(&mut rng, -11, -1);
            assert_eq!(value % 2, 0);
            assert!((-10..=-2).contains(&value));
        }
    }

    #[test]
    fn test_generate_decimal_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let value = generate_decimal(&mut rng, 1.0, 20.0);
            assert!((1.0..20.0).contains(&value), "{value} out of range");
        }
    }

    #[test]
    fn test_generate_decimal_has_eight_places() {
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let value = generate_decimal(&mut rng, 1.0, 20.0);
            let printed = format!("{value:.8}");
            let reparsed: f64 = printed.parse().unwrap();
            assert_eq!(reparsed, value);
        }
    }

    #[test]
    fn test_generate_decimal_narrow_range() {
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let value = generate_decimal(&mut rng, 2.0, 2.00000002);
            assert!((2.0..2.00000002).contains(&value));
        }
    }
}
