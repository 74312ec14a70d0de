//! Recovery Wallet Core
//!
//! Key material and identity handling for recovering legacy Etherspot V1 and
//! Archanova smart-contract wallets.
//!
//! ## Architecture
//!
//! - **Core**: key derivation (BIP-39 / BIP-32 / secp256k1), secret parsing,
//!   the offline Archanova account directory
//! - **Shared**: the chain enum, error type, constants and amount utilities
//!
//! ## Security
//!
//! - Private keys and phrases live in zeroizing wrappers for one request
//! - Nothing is persisted and no secret type implements `Debug` in clear
//!
//! ## Usage
//!
//! ```rust
//! use recovery_wallet_core::{KeyManager, Secret};
//!
//! let key_manager = KeyManager::new();
//! let secret = Secret::parse(
//!     "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
//! )?;
//! let private_key = secret.into_private_key(&key_manager)?;
//! let eoa = key_manager.derive_address(&private_key)?;
//! assert_eq!(format!("{:?}", eoa), "0x9858effd232b4033e47d90003d41ec34ecaeda94");
//! # Ok::<(), recovery_wallet_core::RecoveryError>(())
//! ```

pub mod core;
pub mod shared;

// Re-export specific components
pub use crate::core::crypto::keys::{KeyManager, SecurePrivateKey, SecureSeedPhrase};
pub use crate::core::identity::{resolve_signer, ArchanovaDirectory, ArchanovaRecord, Secret, SecretInput};

// Re-export shared types
pub use shared::error::{ErrorKind, RecoveryError};
pub use shared::types::{Address, Chain, NativeCurrency};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
