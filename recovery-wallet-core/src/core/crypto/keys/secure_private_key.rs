use crate::shared::constants::*;
use crate::shared::error::RecoveryError;
use zeroize::Zeroizing;

/// Ephemeral private key held in zeroizing memory
///
/// The key only lives for the request that parsed or derived it and is wiped
/// when dropped. It is never written to disk and never returned to callers.
pub struct SecurePrivateKey {
    bytes: Zeroizing<[u8; PRIVATE_KEY_SIZE]>,
}

impl SecurePrivateKey {
    /// Create a SecurePrivateKey from raw key bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecoveryError> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(RecoveryError::secret_parse("Invalid private key length"));
        }

        let mut key_bytes = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        key_bytes.copy_from_slice(bytes);

        // Validate the key is a valid secp256k1 private key
        secp256k1::SecretKey::from_byte_array(*key_bytes)
            .map_err(|_| RecoveryError::secret_parse("Private key is not a valid secp256k1 scalar"))?;

        Ok(Self { bytes: key_bytes })
    }

    /// Parse a hex private key, with or without the 0x prefix
    pub fn from_hex(key: &str) -> Result<Self, RecoveryError> {
        let trimmed = key.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if hex_part.len() != PRIVATE_KEY_SIZE * 2 {
            return Err(RecoveryError::secret_parse("Private key must be 32 bytes of hex"));
        }

        let decoded = Zeroizing::new(
            hex::decode(hex_part).map_err(|_| RecoveryError::secret_parse("Private key contains invalid hex characters"))?,
        );
        Self::from_bytes(&decoded)
    }

    /// Perform an operation with the key bytes without handing out a copy
    pub fn with_key<F, T>(&self, f: F) -> Result<T, RecoveryError>
    where
        F: FnOnce(&[u8; PRIVATE_KEY_SIZE]) -> Result<T, RecoveryError>,
    {
        f(&self.bytes)
    }
}

// No Debug implementation to prevent key exposure in logs
// No Clone implementation to prevent accidental key duplication

#[cfg(test)]
mod tests {
    use super::*;

    const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_from_hex_with_and_without_prefix() {
        let with_prefix = SecurePrivateKey::from_hex(HARDHAT_KEY).unwrap();
        let without_prefix = SecurePrivateKey::from_hex(&HARDHAT_KEY[2..]).unwrap();

        let a = with_prefix.with_key(|k| Ok(*k)).unwrap();
        let b = without_prefix.with_key(|k| Ok(*k)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert!(matches!(SecurePrivateKey::from_hex("0x1234"), Err(RecoveryError::SecretParse(_))));
        let non_hex = format!("0x{}", "zz".repeat(32));
        assert!(matches!(SecurePrivateKey::from_hex(&non_hex), Err(RecoveryError::SecretParse(_))));
    }

    #[test]
    fn test_rejects_zero_scalar() {
        let zero = [0u8; PRIVATE_KEY_SIZE];
        assert!(matches!(SecurePrivateKey::from_bytes(&zero), Err(RecoveryError::SecretParse(_))));
    }
}
