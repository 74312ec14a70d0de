//! Constants for the recovery core
//!
//! This module contains all constants used throughout the recovery core.

// Key constants
pub const PRIVATE_KEY_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 65;
pub const ADDRESS_SIZE: usize = 20;
pub const ETHEREUM_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";
pub const MNEMONIC_WORD_COUNTS: &[usize] = &[12, 15, 18, 21, 24];

// Unit constants
pub const NATIVE_DECIMALS: u8 = 18;
pub const MAX_DECIMALS: u8 = 77; // largest power of ten that fits in a U256

// Etherspot V1 contracts, deployed at the same address on every supported chain
pub const ETHERSPOT_V1_PERSONAL_ACCOUNT_REGISTRY: &str = "0x7EB3A038F25B9F32f8e19A7F0De83D4916030eFa";
pub const ETHERSPOT_V1_BALANCES_HELPER_V2: &str = "0xe5A160F89f330cc933816E896a3F36376DE0a835";

// Archanova
pub const DEFAULT_ARCHANOVA_MAPPING_PATH: &str = "data/mapped_archanova_accounts.json";

// Transfer constants
pub const ERC1155_TRANSFER_QUANTITY: u64 = 1;

// Performance constants
pub const MAX_RETRY_ATTEMPTS: u32 = 3;
pub const RPC_TIMEOUT: u64 = 30000; // milliseconds
pub const TRANSACTION_CONFIRMATION_TIMEOUT: u64 = 180000; // milliseconds
pub const RETRY_BACKOFF_BASE: u64 = 0; // milliseconds, immediate retry
pub const RETRY_JITTER: u64 = 0; // milliseconds
