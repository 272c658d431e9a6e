//! Character sets the text generators sample from.

use crate::error::GeneratorError;
use rand::Rng;

const LATIN: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const CYRILLIC: &str = "АБВГДЕЖЗИКЛМНОПРСТУФХЦЧШЩЫЭЮЯабвгдежзиклмнопрстуфхцчшщыэюя";

/// An immutable, non-empty set of characters.
///
/// Alphabets are plain values so generators with different alphabets can
/// run side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    name: String,
    chars: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from the characters of `chars`.
    pub fn new(name: impl Into<String>, chars: &str) -> Result<Self, GeneratorError> {
        let name = name.into();
        let chars: Vec<char> = chars.chars().collect();
        if chars.is_empty() {
            return Err(GeneratorError::EmptyAlphabet(name));
        }
        Ok(Self { name, chars })
    }

    /// Upper- and lower-case ASCII letters (52 characters).
    pub fn latin() -> Self {
        Self {
            name: "latin".to_string(),
            chars: LATIN.chars().collect(),
        }
    }

    /// Upper- and lower-case Cyrillic letters without Ё, Й, Ъ, Ь (58 characters).
    pub fn cyrillic() -> Self {
        Self {
            name: "cyrillic".to_string(),
            chars: CYRILLIC.chars().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Draw `length` characters uniformly, with replacement.
    pub fn sample<R: Rng>(&self, rng: &mut R, length: usize) -> String {
        (0..length)
            .map(|_| self.chars[rng.gen_range(0..self.chars.len())])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_alphabet_sizes() {
        assert_eq!(Alphabet::latin().len(), 52);
        assert_eq!(Alphabet::cyrillic().len(), 58);
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        let err = Alphabet::new("nothing", "").unwrap_err();
        assert_eq!(err, GeneratorError::EmptyAlphabet("nothing".into()));
    }

    #[test]
    fn test_sample_length_counts_chars_not_bytes() {
        let mut rng = StdRng::seed_from_u64(7);
        let text = Alphabet::cyrillic().sample(&mut rng, 10);
        assert_eq!(text.chars().count(), 10);
        assert!(text.len() > 10);
    }

    #[test]
    fn test_sample_stays_in_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let alphabet = Alphabet::new("binary", "01").unwrap();
        let text = alphabet.sample(&mut rng, 200);
        assert!(text.chars().all(|c| alphabet.contains(c)));
    }

    #[test]
    fn test_sample_zero_length() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(Alphabet::latin().sample(&mut rng, 0), "");
    }
}
