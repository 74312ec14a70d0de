//! Key derivation and address computation
//!
//! Turns a seed phrase or a raw private key into the externally-owned account
//! that pays gas for every relayed recovery transfer.

use crate::shared::constants::{ADDRESS_SIZE, ETHEREUM_DERIVATION_PATH, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
use crate::shared::error::RecoveryError;
use crate::shared::types::Address;
use super::{SecurePrivateKey, SecureSeedPhrase};
use bip32::{DerivationPath, XPrv};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::str::FromStr;
use zeroize::Zeroizing;

/// Key manager for key derivation and EOA computation
pub struct KeyManager {
    secp256k1: Secp256k1<secp256k1::All>,
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyManager {
    pub fn new() -> Self {
        Self {
            secp256k1: Secp256k1::new(),
        }
    }

    /// Derive the first Ethereum account key from a seed phrase
    pub fn derive_private_key_from_seed(&self, seed_phrase: &SecureSeedPhrase) -> Result<SecurePrivateKey, RecoveryError> {
        use bip39::Mnemonic;

        let mnemonic = Mnemonic::parse_in_normalized(bip39::Language::English, seed_phrase.as_str())?;

        // No passphrase
        let seed = bip32::Seed::new(mnemonic.to_seed_normalized(""));

        let xprv = XPrv::new(seed.as_bytes())?;

        // Standard Ethereum path: m/44'/60'/0'/0/0
        let derivation_path = DerivationPath::from_str(ETHEREUM_DERIVATION_PATH)
            .map_err(|e| RecoveryError::crypto(format!("Invalid derivation path: {}", e)))?;

        let mut child_xprv = xprv;
        for child_number in derivation_path.into_iter() {
            child_xprv = child_xprv.derive_child(child_number)?;
        }

        let mut private_key_bytes = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        private_key_bytes.copy_from_slice(&child_xprv.private_key().to_bytes());
        SecurePrivateKey::from_bytes(private_key_bytes.as_slice())
    }

    /// Uncompressed public key (65 bytes, 0x04 prefix) as hex
    pub fn get_public_key(&self, private_key: &SecurePrivateKey) -> Result<String, RecoveryError> {
        private_key.with_key(|key_bytes| {
            let secret_key = SecretKey::from_byte_array(*key_bytes)
                .map_err(|e| RecoveryError::crypto(format!("Invalid private key: {}", e)))?;

            let public_key = PublicKey::from_secret_key(&self.secp256k1, &secret_key);
            Ok(hex::encode(public_key.serialize_uncompressed()))
        })
    }

    /// Generate an Ethereum address from a hex public key
    pub fn get_address(&self, public_key: &str) -> Result<Address, RecoveryError> {
        let public_key_bytes = hex::decode(public_key)?;

        let public_key = PublicKey::from_slice(&public_key_bytes)
            .map_err(|e| RecoveryError::crypto(format!("Invalid public key: {}", e)))?;

        // Remove the 0x04 prefix
        let public_key_bytes = public_key.serialize_uncompressed();
        debug_assert_eq!(public_key_bytes.len(), PUBLIC_KEY_SIZE);
        let keccak_hash = Self::keccak256(&public_key_bytes[1..]);

        // Take the last 20 bytes for the address
        Ok(Address::from_slice(&keccak_hash[keccak_hash.len() - ADDRESS_SIZE..]))
    }

    /// EOA address controlled by a private key
    pub fn derive_address(&self, private_key: &SecurePrivateKey) -> Result<Address, RecoveryError> {
        let public_key = self.get_public_key(private_key)?;
        self.get_address(&public_key)
    }

    /// Keccak256 hash function
    fn keccak256(data: &[u8]) -> [u8; 32] {
        use sha3::{Digest, Keccak256};
        let mut hasher = Keccak256::new();
        hasher.update(data);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}
