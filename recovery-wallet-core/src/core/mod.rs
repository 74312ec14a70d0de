//! Core recovery functionality
//!
//! Key derivation and identity lookup.

pub mod crypto;
pub mod identity;

pub use crypto::*;
pub use identity::*;
