//! Identity inputs
//!
//! Secret parsing for the EOA and the offline Archanova account directory.

pub mod secret;
pub mod archanova_directory;

pub use secret::*;
pub use archanova_directory::*;
