pub mod contracts;
pub mod ethereum;
pub mod gateway;
