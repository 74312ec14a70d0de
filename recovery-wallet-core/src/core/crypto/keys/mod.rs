//! Key management for the recovery core
//!
//! This module handles parsing, derivation and short-lived in-memory handling
//! of private keys and seed phrases.

pub mod secure_private_key;
pub mod key_manager;
pub mod secure_seed_phrase;

// Re-export all public items from submodules
pub use secure_private_key::*;
pub use key_manager::*;
pub use secure_seed_phrase::*;
