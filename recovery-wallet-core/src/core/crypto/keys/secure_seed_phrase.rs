use crate::shared::constants::MNEMONIC_WORD_COUNTS;
use crate::shared::error::RecoveryError;
use zeroize::Zeroize;

/// Secure seed phrase wrapper
///
/// Holds a normalized BIP-39 phrase: lower-case words separated by single
/// spaces. The phrase is wiped on drop.
pub struct SecureSeedPhrase {
    phrase: String,
}

impl SecureSeedPhrase {
    /// Create a new secure seed phrase, normalizing whitespace and case
    pub fn new(phrase: &str) -> Result<Self, RecoveryError> {
        let normalized = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        Self::checked(normalized)
    }

    /// Build a phrase from individual words as entered one per field
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self, RecoveryError> {
        let normalized = words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self::checked(normalized)
    }

    fn checked(phrase: String) -> Result<Self, RecoveryError> {
        let seed_phrase = Self { phrase };
        let count = seed_phrase.word_count();
        if !MNEMONIC_WORD_COUNTS.contains(&count) {
            return Err(RecoveryError::secret_parse(format!(
                "Seed phrase must have 12, 15, 18, 21 or 24 words, got {}",
                count
            )));
        }
        Ok(seed_phrase)
    }

    /// Get the seed phrase as a &str
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }
}

impl Drop for SecureSeedPhrase {
    fn drop(&mut self) {
        // Clear the seed phrase when dropped
        self.phrase.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_secure_seed_phrase_normalization() {
        let messy = "  Abandon abandon ABANDON abandon abandon abandon\nabandon abandon abandon abandon abandon   about ";
        let seed_phrase = SecureSeedPhrase::new(messy).unwrap();
        assert_eq!(seed_phrase.as_str(), PHRASE);
        assert_eq!(seed_phrase.word_count(), 12);
    }

    #[test]
    fn test_from_words() {
        let words: Vec<String> = PHRASE.split(' ').map(String::from).collect();
        let seed_phrase = SecureSeedPhrase::from_words(&words).unwrap();
        assert_eq!(seed_phrase.as_str(), PHRASE);
    }

    #[test]
    fn test_rejects_wrong_word_count() {
        let result = SecureSeedPhrase::new("abandon abandon about");
        assert!(matches!(result, Err(RecoveryError::SecretParse(_))));
    }
}
