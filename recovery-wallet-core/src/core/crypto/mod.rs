//! Cryptographic primitives for the recovery core
//!
//! Only key derivation lives here: the engine never encrypts or stores key
//! material, it derives a signer for the duration of one request.

pub mod keys;

pub use keys::*;
