use crate::core::crypto::keys::{KeyManager, SecurePrivateKey, SecureSeedPhrase};
use crate::shared::error::RecoveryError;
use crate::shared::types::Address;
use serde::Deserialize;
use std::fmt;
use zeroize::Zeroize;

/// Secret material as it arrives over the request boundary
///
/// Either a single string (hex private key or space-separated phrase) or the
/// phrase as a list of words. Wiped on drop and never printed.
#[derive(Deserialize, Clone)]
#[serde(untagged)]
pub enum SecretInput {
    Words(Vec<String>),
    Text(String),
}

impl fmt::Debug for SecretInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretInput(<redacted>)")
    }
}

impl Drop for SecretInput {
    fn drop(&mut self) {
        match self {
            SecretInput::Words(words) => words.iter_mut().for_each(|w| w.zeroize()),
            SecretInput::Text(text) => text.zeroize(),
        }
    }
}

impl From<&str> for SecretInput {
    fn from(value: &str) -> Self {
        SecretInput::Text(value.to_string())
    }
}

/// A parsed secret
pub enum Secret {
    PrivateKey(SecurePrivateKey),
    Mnemonic(SecureSeedPhrase),
}

impl Secret {
    /// Parse a single-string secret
    ///
    /// Anything containing whitespace is treated as a seed phrase, everything
    /// else as a hex private key.
    pub fn parse(input: &str) -> Result<Self, RecoveryError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RecoveryError::secret_parse("Secret is empty"));
        }

        if trimmed.split_whitespace().nth(1).is_some() {
            Ok(Secret::Mnemonic(SecureSeedPhrase::new(trimmed)?))
        } else {
            Ok(Secret::PrivateKey(SecurePrivateKey::from_hex(trimmed)?))
        }
    }

    pub fn from_input(input: &SecretInput) -> Result<Self, RecoveryError> {
        match input {
            SecretInput::Words(words) => Ok(Secret::Mnemonic(SecureSeedPhrase::from_words(words)?)),
            SecretInput::Text(text) => Self::parse(text),
        }
    }

    /// Resolve to the private key of the first Ethereum account
    pub fn into_private_key(self, key_manager: &KeyManager) -> Result<SecurePrivateKey, RecoveryError> {
        match self {
            Secret::PrivateKey(key) => Ok(key),
            Secret::Mnemonic(phrase) => key_manager.derive_private_key_from_seed(&phrase),
        }
    }
}

/// Parse any secret input straight to its signing key and EOA
pub fn resolve_signer(input: &SecretInput, key_manager: &KeyManager) -> Result<(SecurePrivateKey, Address), RecoveryError> {
    let private_key = Secret::from_input(input)?.into_private_key(key_manager)?;
    let eoa = key_manager.derive_address(&private_key)?;
    Ok((private_key, eoa))
}
