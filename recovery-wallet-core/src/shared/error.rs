//! Error handling for the recovery core
//!
//! One error type is shared by the key layer and the relay engine. Every
//! variant maps onto a coarse [`ErrorKind`] that the request boundary reports.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error classification reported across the operation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    SecretParse,
    Validation,
    Rpc,
    ContractRevert,
    Insufficient,
    NotFound,
    /// Submitted but the outcome was never observed; resubmitting may double-spend
    ConfirmationUnknown,
    Internal,
}

/// Recovery error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid secret: {0}")]
    SecretParse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract call reverted: {0}")]
    ContractRevert(String),

    #[error("Insufficient gas funds: estimated cost {required} exceeds native balance {available}")]
    InsufficientGasFunds { required: String, available: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transaction {tx_hash} was submitted but its confirmation could not be observed: {reason}")]
    ConfirmationUnknown { tx_hash: String, reason: String },

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecoveryError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a secret parse error
    pub fn secret_parse(message: impl Into<String>) -> Self {
        Self::SecretParse(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an RPC error
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc(message.into())
    }

    /// Create a contract revert error
    pub fn contract_revert(message: impl Into<String>) -> Self {
        Self::ContractRevert(message.into())
    }

    pub fn insufficient_gas_funds(required: impl Into<String>, available: impl Into<String>) -> Self {
        Self::InsufficientGasFunds {
            required: required.into(),
            available: available.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn confirmation_unknown(tx_hash: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfirmationUnknown {
            tx_hash: tx_hash.into(),
            reason: reason.into(),
        }
    }

    /// Create a cryptographic error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classification used at the request boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::SecretParse(_) => ErrorKind::SecretParse,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Rpc(_) => ErrorKind::Rpc,
            Self::ConfirmationUnknown { .. } => ErrorKind::ConfirmationUnknown,
            Self::ContractRevert(_) => ErrorKind::ContractRevert,
            Self::InsufficientGasFunds { .. } => ErrorKind::Insufficient,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Crypto(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Hash of the transaction an error refers to, when one was broadcast
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            Self::ConfirmationUnknown { tx_hash, .. } => Some(tx_hash.as_str()),
            _ => None,
        }
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, Self::ContractRevert(_))
    }
}

impl From<hex::FromHexError> for RecoveryError {
    fn from(err: hex::FromHexError) -> Self {
        Self::validation(format!("Hex decoding error: {}", err))
    }
}

impl From<serde_json::Error> for RecoveryError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for RecoveryError {
    fn from(err: std::io::Error) -> Self {
        Self::configuration(format!("IO error: {}", err))
    }
}

impl From<secp256k1::Error> for RecoveryError {
    fn from(err: secp256k1::Error) -> Self {
        Self::crypto(format!("Secp256k1 error: {}", err))
    }
}

impl From<bip39::Error> for RecoveryError {
    fn from(err: bip39::Error) -> Self {
        Self::secret_parse(format!("Invalid BIP39 seed phrase: {}", err))
    }
}

impl From<bip32::Error> for RecoveryError {
    fn from(err: bip32::Error) -> Self {
        Self::crypto(format!("BIP32 derivation error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_error_creation() {
        let config_error = RecoveryError::configuration("Unsupported chain: fantom");
        let secret_error = RecoveryError::secret_parse("bad phrase");
        let rpc_error = RecoveryError::rpc("connection refused");

        assert!(matches!(config_error, RecoveryError::Configuration(_)));
        assert!(matches!(secret_error, RecoveryError::SecretParse(_)));
        assert!(matches!(rpc_error, RecoveryError::Rpc(_)));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(RecoveryError::contract_revert("x").kind(), ErrorKind::ContractRevert);
        assert_eq!(RecoveryError::insufficient_gas_funds("0.002", "0.001").kind(), ErrorKind::Insufficient);
        assert_eq!(
            RecoveryError::confirmation_unknown("0xabc", "timeout").kind(),
            ErrorKind::ConfirmationUnknown
        );
        assert_eq!(RecoveryError::confirmation_unknown("0xabc", "timeout").tx_hash(), Some("0xabc"));
        assert_eq!(RecoveryError::rpc("x").tx_hash(), None);
        assert_eq!(RecoveryError::crypto("x").kind(), ErrorKind::Internal);
        assert!(RecoveryError::contract_revert("x").is_revert());
        assert!(!RecoveryError::rpc("x").is_revert());
    }

    #[test]
    fn test_error_conversions() {
        let hex_error = hex::decode("zz").unwrap_err();
        let error: RecoveryError = hex_error.into();
        assert!(matches!(error, RecoveryError::Validation(_)));

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: RecoveryError = io_error.into();
        assert!(matches!(error, RecoveryError::Configuration(_)));
    }

    #[test]
    fn test_error_display() {
        let error = RecoveryError::insufficient_gas_funds("0.002", "0.001");
        let display = format!("{}", error);

        assert!(display.contains("Insufficient gas funds"));
        assert!(display.contains("0.002"));
        assert!(display.contains("0.001"));
    }
}
